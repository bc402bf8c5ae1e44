//! Provider API collaborators
//!
//! The export core only sees the `Ec2Api` and `ElastiCacheApi` traits. Two
//! implementations exist:
//!
//! - [`AwsCliClient`] runs the `aws` command line tool and decodes its JSON
//!   output. The tool handles credentials, retries and pagination.
//! - [`SnapshotClient`] decodes a describe response previously saved to disk.

pub mod aws_cli;
pub mod snapshot;
pub mod types;

pub use aws_cli::{AwsCliClient, AwsCliSettings};
pub use snapshot::SnapshotClient;
pub use types::{CacheCluster, Instance};

use crate::export::error::ExportResult;

/// Compute instance discovery
pub trait Ec2Api: Send + Sync {
    /// Describe every instance visible to the caller, reservations flattened
    fn describe_instances(&self) -> ExportResult<Vec<Instance>>;
}

/// Cache cluster discovery
pub trait ElastiCacheApi: Send + Sync {
    /// Describe every cache cluster, optionally including per-node details
    fn describe_cache_clusters(&self, show_cache_node_info: bool)
    -> ExportResult<Vec<CacheCluster>>;
}
