//! User configuration
//!
//! Read from `<config_dir>/tfexport/config.yaml` unless `--config` names
//! another file. Every field is optional; command line flags and environment
//! variables take precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::error::{ExportError, ExportResult};
use crate::provider::AwsCliSettings;
use crate::traits::FileSystem;

const CONFIG_DIR: &str = "tfexport";
const CONFIG_FILE: &str = "config.yaml";

/// Kinds exported at once by `tfexport all` when not configured
pub const DEFAULT_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsConfig,

    /// Directory holding `<template>.tf.hbs` overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Path of the aws executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<String>,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. The default file is optional.
    pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>) -> ExportResult<Self> {
        match explicit {
            Some(path) => {
                if !fs.exists(path) {
                    return Err(ExportError::InvalidInput(format!(
                        "Configuration file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from_path(fs, path)
            }
            None => match Self::default_path() {
                Some(path) if fs.exists(&path) => Self::load_from_path(fs, &path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> ExportResult<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| ExportError::ConfigParse(format!("{:#}", e)))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| {
            ExportError::ConfigParse(format!("{}: {}", path.display(), e))
        })
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism.unwrap_or(DEFAULT_PARALLELISM)
    }

    /// aws settings with flag/env values layered over the file
    pub fn aws_settings(&self, profile: Option<String>, region: Option<String>) -> AwsCliSettings {
        let defaults = AwsCliSettings::default();

        AwsCliSettings {
            cli_path: self.aws.cli_path.clone().unwrap_or(defaults.cli_path),
            profile: profile.or_else(|| self.aws.profile.clone()),
            region: region.or_else(|| self.aws.region.clone()),
        }
    }
}
