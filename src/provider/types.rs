//! Typed provider records
//!
//! These mirror the JSON documents returned by the EC2 and ElastiCache
//! describe APIs. Field names follow the provider's PascalCase so the same
//! structures decode responses and feed templates unchanged. Fields the
//! provider may leave out are `Option`; list fields default to empty.

use serde::{Deserialize, Serialize};

/// Key/value tag attached to a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Response of `ec2 describe-instances`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesOutput {
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl DescribeInstancesOutput {
    /// Flatten all reservations into a single ordered instance list
    pub fn into_instances(self) -> Vec<Instance> {
        self.reservations
            .into_iter()
            .flat_map(|reservation| reservation.instances)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// An EC2 compute instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub instance_id: String,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub private_dns_name: Option<String>,
    #[serde(default)]
    pub private_ip_address: Option<String>,
    #[serde(default)]
    pub public_dns_name: Option<String>,
    #[serde(default)]
    pub public_ip_address: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub ebs_optimized: Option<bool>,
    #[serde(default)]
    pub source_dest_check: Option<bool>,
    #[serde(default)]
    pub root_device_name: Option<String>,
    #[serde(default)]
    pub block_device_mappings: Vec<InstanceBlockDeviceMapping>,
    #[serde(default)]
    pub security_groups: Vec<GroupIdentifier>,
    #[serde(default)]
    pub monitoring: Option<Monitoring>,
    #[serde(default)]
    pub state: Option<InstanceState>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub tenancy: Option<String>,
}

/// Security group reference as attached to an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupIdentifier {
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceBlockDeviceMapping {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub ebs: Option<EbsInstanceBlockDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EbsInstanceBlockDevice {
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub delete_on_termination: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Monitoring {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `elasticache describe-cache-clusters`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCacheClustersOutput {
    #[serde(default)]
    pub cache_clusters: Vec<CacheCluster>,
}

/// An ElastiCache cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheCluster {
    pub cache_cluster_id: String,
    #[serde(default)]
    pub configuration_endpoint: Option<Endpoint>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub cache_node_type: Option<String>,
    #[serde(default)]
    pub num_cache_nodes: Option<u32>,
    #[serde(default)]
    pub cache_cluster_status: Option<String>,
    #[serde(default)]
    pub preferred_availability_zone: Option<String>,
    #[serde(default)]
    pub cache_parameter_group: Option<CacheParameterGroupStatus>,
    #[serde(default)]
    pub cache_subnet_group_name: Option<String>,
    #[serde(default)]
    pub cache_nodes: Vec<CacheNode>,
    #[serde(default)]
    pub cache_security_groups: Vec<CacheSecurityGroupMembership>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupMembership>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheNode {
    #[serde(default)]
    pub cache_node_id: Option<String>,
    #[serde(default)]
    pub cache_node_status: Option<String>,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheParameterGroupStatus {
    #[serde(default)]
    pub cache_parameter_group_name: Option<String>,
    #[serde(default)]
    pub parameter_apply_status: Option<String>,
}

/// Classic (non-VPC) cache security group membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheSecurityGroupMembership {
    #[serde(default)]
    pub cache_security_group_name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// VPC security group membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupMembership {
    #[serde(default)]
    pub security_group_id: String,
    #[serde(default)]
    pub status: Option<String>,
}
