//! Supported resource kinds
//!
//! Ties each kind to its Terraform resource type, its built-in template and
//! its snapshot file.

use std::fmt;

use super::projector::{AWS_ELASTICACHE_CLUSTER, AWS_INSTANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Ec2Instance,
    CacheCluster,
}

/// Static description of a resource kind
#[derive(Debug, Clone)]
pub struct KindInfo {
    /// Command line name (e.g. "ec2")
    pub command: &'static str,
    /// Terraform resource type (e.g. "aws_instance")
    pub tf_type: &'static str,
    /// Name of the built-in template, also its override file stem
    pub template: &'static str,
    /// Key under which raw records are exposed to the template
    pub collection: &'static str,
    /// File name read from `--snapshot-dir`
    pub snapshot_file: &'static str,
    pub description: &'static str,
}

impl KindInfo {
    const fn new(
        command: &'static str,
        tf_type: &'static str,
        template: &'static str,
        collection: &'static str,
        snapshot_file: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            command,
            tf_type,
            template,
            collection,
            snapshot_file,
            description,
        }
    }
}

const EC2_INSTANCE: KindInfo = KindInfo::new(
    "ec2",
    AWS_INSTANCE,
    "ec2",
    "instances",
    "ec2.json",
    "EC2 instances",
);

const CACHE_CLUSTER: KindInfo = KindInfo::new(
    "ecc",
    AWS_ELASTICACHE_CLUSTER,
    "elasticache_cluster",
    "cache_clusters",
    "ecc.json",
    "ElastiCache clusters",
);

impl ResourceKind {
    /// Every supported kind, in output order
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Ec2Instance, ResourceKind::CacheCluster];

    pub fn info(&self) -> &'static KindInfo {
        match self {
            ResourceKind::Ec2Instance => &EC2_INSTANCE,
            ResourceKind::CacheCluster => &CACHE_CLUSTER,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().command)
    }
}
