use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::types::{CacheCluster, DescribeCacheClustersOutput, DescribeInstancesOutput, Instance};
use super::{Ec2Api, ElastiCacheApi};
use crate::export::error::{ExportError, ExportResult};
use crate::traits::CommandExecutor;

/// Markers in aws CLI stderr that indicate a credential problem
const AUTH_FAILURE_MARKERS: &[&str] = &[
    "Unable to locate credentials",
    "InvalidClientTokenId",
    "ExpiredToken",
    "AuthFailure",
    "UnrecognizedClientException",
    "SignatureDoesNotMatch",
];

/// How to invoke the aws CLI
#[derive(Debug, Clone, PartialEq)]
pub struct AwsCliSettings {
    /// Executable name or path
    pub cli_path: String,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Default for AwsCliSettings {
    fn default() -> Self {
        Self {
            cli_path: "aws".to_string(),
            profile: None,
            region: None,
        }
    }
}

/// Provider client backed by the aws command line tool
pub struct AwsCliClient {
    executor: Arc<dyn CommandExecutor>,
    settings: AwsCliSettings,
}

impl AwsCliClient {
    pub fn new(executor: Arc<dyn CommandExecutor>, settings: AwsCliSettings) -> Self {
        Self { executor, settings }
    }

    /// Build the full argument list for one API call
    fn build_args<'a>(&'a self, service: &'a str, operation: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec![service, operation];
        args.extend_from_slice(extra);
        args.extend_from_slice(&["--output", "json"]);

        if let Some(profile) = &self.settings.profile {
            args.extend_from_slice(&["--profile", profile.as_str()]);
        }

        if let Some(region) = &self.settings.region {
            args.extend_from_slice(&["--region", region.as_str()]);
        }

        args
    }

    /// Run one describe call and decode its JSON output
    fn invoke<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        extra: &[&str],
    ) -> ExportResult<T> {
        let args = self.build_args(service, operation, extra);
        let label = format!("{} {}", service, operation);

        let output = self
            .executor
            .execute(&self.settings.cli_path, &args)
            .map_err(|e| {
                ExportError::ProviderApi(format!(
                    "failed to run '{}': {:#}",
                    self.settings.cli_path, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if AUTH_FAILURE_MARKERS.iter().any(|m| stderr.contains(m)) {
                return Err(ExportError::Authentication(stderr));
            }

            return Err(ExportError::ProviderApi(format!(
                "'{}' exited with {}: {}",
                label, output.status, stderr
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ExportError::MalformedResponse {
            operation: label,
            message: e.to_string(),
        })
    }
}

impl Ec2Api for AwsCliClient {
    fn describe_instances(&self) -> ExportResult<Vec<Instance>> {
        let response: DescribeInstancesOutput = self.invoke("ec2", "describe-instances", &[])?;
        Ok(response.into_instances())
    }
}

impl ElastiCacheApi for AwsCliClient {
    fn describe_cache_clusters(
        &self,
        show_cache_node_info: bool,
    ) -> ExportResult<Vec<CacheCluster>> {
        let extra: &[&str] = if show_cache_node_info {
            &["--show-cache-node-info"]
        } else {
            &[]
        };

        let response: DescribeCacheClustersOutput =
            self.invoke("elasticache", "describe-cache-clusters", extra)?;
        Ok(response.cache_clusters)
    }
}
