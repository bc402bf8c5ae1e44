use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;

use super::types::{CacheCluster, DescribeCacheClustersOutput, DescribeInstancesOutput, Instance};
use super::{Ec2Api, ElastiCacheApi};
use crate::export::error::{ExportError, ExportResult};
use crate::traits::FileSystem;

/// Provider client that replays a saved describe response
///
/// The file holds exactly what `aws <service> describe-... --output json`
/// printed, so a capture from one machine can be exported on another.
pub struct SnapshotClient {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl SnapshotClient {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    fn load<T: DeserializeOwned>(&self) -> ExportResult<T> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| ExportError::ProviderApi(format!("{:#}", e)))?;

        serde_json::from_str(&content).map_err(|e| ExportError::MalformedResponse {
            operation: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl Ec2Api for SnapshotClient {
    fn describe_instances(&self) -> ExportResult<Vec<Instance>> {
        let response: DescribeInstancesOutput = self.load()?;
        Ok(response.into_instances())
    }
}

impl ElastiCacheApi for SnapshotClient {
    fn describe_cache_clusters(
        &self,
        _show_cache_node_info: bool,
    ) -> ExportResult<Vec<CacheCluster>> {
        let response: DescribeCacheClustersOutput = self.load()?;
        Ok(response.cache_clusters)
    }
}
