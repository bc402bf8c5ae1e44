//! Attribute projection
//!
//! A projector turns one provider record into the exact attribute set the
//! Terraform state schema expects for its resource type. Projection never
//! performs I/O; a record missing a field the schema cannot do without is an
//! error rather than a silently degraded entry.

use serde::Serialize;
use std::collections::BTreeMap;

use super::attributes::AttributeMap;
use super::classifier::{Ec2VpcClassifier, NetworkClassifier};
use super::error::{ExportError, ExportResult};
use super::identifier::{self, Identifier};
use super::state::{PrimaryState, StateEntry};
use crate::provider::types::{CacheCluster, Instance};

/// Resource type written for EC2 instances
pub const AWS_INSTANCE: &str = "aws_instance";

/// Resource type written for ElastiCache clusters
pub const AWS_ELASTICACHE_CLUSTER: &str = "aws_elasticache_cluster";

/// Schema version recorded in the meta block of instance entries
const AWS_INSTANCE_SCHEMA_VERSION: &str = "1";

/// Maps provider records of one resource type into state entries
pub trait AttributeProjector: Send + Sync {
    /// Provider record this projector understands
    type Record: Serialize + Send + Sync;

    /// Terraform resource type, e.g. `aws_instance`
    fn resource_type(&self) -> &'static str;

    /// Provider-assigned identifier of the record
    fn provider_id<'a>(&self, record: &'a Self::Record) -> &'a str;

    /// Human label the resource name is derived from
    fn label<'a>(&self, record: &'a Self::Record) -> &'a str {
        self.provider_id(record)
    }

    /// Flat attribute set for the record
    fn project(&self, record: &Self::Record) -> ExportResult<AttributeMap>;

    /// Schema metadata attached to every entry of this type
    fn meta(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    fn identifier(&self, record: &Self::Record) -> Identifier {
        identifier::normalize(self.label(record))
    }

    /// `<resource_type>.<identifier>`
    fn composite_key(&self, record: &Self::Record) -> String {
        format!("{}.{}", self.resource_type(), self.identifier(record))
    }

    /// Project a record into its keyed state entry
    fn entry(&self, record: &Self::Record) -> ExportResult<(String, StateEntry)> {
        let entry = StateEntry {
            resource_type: self.resource_type().to_string(),
            primary: PrimaryState {
                id: self.provider_id(record).to_string(),
                attributes: self.project(record)?,
                meta: self.meta(),
            },
        };

        Ok((self.composite_key(record), entry))
    }
}

/// Return a present, non-empty value or a projection error naming `field`
fn required<'a>(
    resource_type: &str,
    resource_id: &str,
    field: &str,
    value: Option<&'a str>,
) -> ExportResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ExportError::missing_field(resource_type, resource_id, field)),
    }
}

/// `aws_instance` projector, generic over the VPC membership rule
#[derive(Debug, Clone, Default)]
pub struct Ec2Projector<C = Ec2VpcClassifier> {
    classifier: C,
}

impl<C> Ec2Projector<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }
}

impl Ec2Projector {
    pub fn new() -> Self {
        Self::with_classifier(Ec2VpcClassifier)
    }
}

impl<C> AttributeProjector for Ec2Projector<C>
where
    C: NetworkClassifier<Instance> + Send + Sync,
{
    type Record = Instance;

    fn resource_type(&self) -> &'static str {
        AWS_INSTANCE
    }

    fn provider_id<'a>(&self, instance: &'a Instance) -> &'a str {
        &instance.instance_id
    }

    fn label<'a>(&self, instance: &'a Instance) -> &'a str {
        identifier::name_from_tags(&instance.tags, &instance.instance_id)
    }

    fn project(&self, instance: &Instance) -> ExportResult<AttributeMap> {
        let id = instance.instance_id.as_str();
        let need = |field: &str, value: Option<&'_ str>| {
            required(AWS_INSTANCE, id, field, value).map(str::to_string)
        };

        let placement = instance
            .placement
            .as_ref()
            .ok_or_else(|| ExportError::missing_field(AWS_INSTANCE, id, "Placement"))?;

        let in_vpc = self.classifier.is_private_network_member(instance);
        let group_count = instance.security_groups.len();

        let mut attrs = AttributeMap::new();
        attrs
            .set("ami", need("ImageId", instance.image_id.as_deref())?)
            .set("associate_public_ip_address", "true")
            .set(
                "availability_zone",
                need("Placement.AvailabilityZone", placement.availability_zone.as_deref())?,
            )
            .set_count("ebs_block_device", instance.block_device_mappings.len())
            .set_optional_bool("ebs_optimized", instance.ebs_optimized)
            .set_count("ephemeral_block_device", 0)
            .set("id", id)
            .set("instance_type", need("InstanceType", instance.instance_type.as_deref())?)
            .set_optional("private_dns", instance.private_dns_name.as_deref())
            .set_optional("private_ip", instance.private_ip_address.as_deref())
            .set_optional("public_dns", instance.public_dns_name.as_deref())
            .set_optional("public_ip", instance.public_ip_address.as_deref())
            .set_count(
                "root_block_device",
                usize::from(instance.root_device_name.is_some()),
            )
            .set_count("security_groups", if in_vpc { 0 } else { group_count })
            .set_optional_bool("source_dest_check", instance.source_dest_check)
            .set("tenancy", need("Placement.Tenancy", placement.tenancy.as_deref())?)
            .set_count("vpc_security_group_ids", if in_vpc { group_count } else { 0 });

        if let Some(subnet) = instance.subnet_id.as_deref().filter(|s| in_vpc && !s.is_empty()) {
            attrs.set("subnet_id", subnet);
        }

        Ok(attrs)
    }

    fn meta(&self) -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            "schema_version".to_string(),
            AWS_INSTANCE_SCHEMA_VERSION.to_string(),
        )]))
    }
}

/// `aws_elasticache_cluster` projector
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheClusterProjector;

impl CacheClusterProjector {
    pub fn new() -> Self {
        Self
    }

    /// Listening port: configuration endpoint, first node, then engine default
    pub fn resolve_port(cluster: &CacheCluster) -> Option<u16> {
        let configured = cluster.configuration_endpoint.as_ref().and_then(|e| e.port);

        let first_node = cluster
            .cache_nodes
            .first()
            .and_then(|node| node.endpoint.as_ref())
            .and_then(|e| e.port);

        configured
            .or(first_node)
            .or_else(|| cluster.engine.as_deref().and_then(default_engine_port))
    }
}

fn default_engine_port(engine: &str) -> Option<u16> {
    match engine {
        "memcached" => Some(11211),
        "redis" | "valkey" => Some(6379),
        _ => None,
    }
}

impl AttributeProjector for CacheClusterProjector {
    type Record = CacheCluster;

    fn resource_type(&self) -> &'static str {
        AWS_ELASTICACHE_CLUSTER
    }

    fn provider_id<'a>(&self, cluster: &'a CacheCluster) -> &'a str {
        &cluster.cache_cluster_id
    }

    fn project(&self, cluster: &CacheCluster) -> ExportResult<AttributeMap> {
        let id = cluster.cache_cluster_id.as_str();
        let need = |field: &str, value: Option<&'_ str>| {
            required(AWS_ELASTICACHE_CLUSTER, id, field, value).map(str::to_string)
        };

        let parameter_group = cluster
            .cache_parameter_group
            .as_ref()
            .and_then(|group| group.cache_parameter_group_name.as_deref());

        let num_cache_nodes = cluster.num_cache_nodes.ok_or_else(|| {
            ExportError::missing_field(AWS_ELASTICACHE_CLUSTER, id, "NumCacheNodes")
        })?;

        let port = Self::resolve_port(cluster)
            .ok_or_else(|| ExportError::missing_field(AWS_ELASTICACHE_CLUSTER, id, "Port"))?;

        let mut attrs = AttributeMap::new();
        attrs
            .set_count("cache_nodes", cluster.cache_nodes.len())
            .set("cluster_id", id)
            .set("engine", need("Engine", cluster.engine.as_deref())?)
            .set("engine_version", need("EngineVersion", cluster.engine_version.as_deref())?)
            .set("id", id)
            .set("node_type", need("CacheNodeType", cluster.cache_node_type.as_deref())?)
            .set("num_cache_nodes", num_cache_nodes.to_string())
            .set(
                "parameter_group_name",
                need("CacheParameterGroup.CacheParameterGroupName", parameter_group)?,
            )
            .set("port", port.to_string())
            .set_count("security_group_ids", cluster.security_groups.len())
            .set_count("security_group_names", cluster.cache_security_groups.len())
            .set_optional("subnet_group_name", cluster.cache_subnet_group_name.as_deref())
            .set_count("tags", 0);

        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::{
        CacheNode, CacheParameterGroupStatus, CacheSecurityGroupMembership, Endpoint,
        GroupIdentifier, InstanceBlockDeviceMapping, Placement, SecurityGroupMembership, Tag,
    };

    const INSTANCE_KEYS: &[&str] = &[
        "ami",
        "associate_public_ip_address",
        "availability_zone",
        "ebs_block_device.#",
        "ebs_optimized",
        "ephemeral_block_device.#",
        "id",
        "instance_type",
        "private_dns",
        "private_ip",
        "public_dns",
        "public_ip",
        "root_block_device.#",
        "security_groups.#",
        "source_dest_check",
        "tenancy",
        "vpc_security_group_ids.#",
    ];

    const CLUSTER_KEYS: &[&str] = &[
        "cache_nodes.#",
        "cluster_id",
        "engine",
        "engine_version",
        "id",
        "node_type",
        "num_cache_nodes",
        "parameter_group_name",
        "port",
        "security_group_ids.#",
        "security_group_names.#",
        "subnet_group_name",
        "tags.#",
    ];

    fn base_instance() -> Instance {
        Instance {
            instance_id: "i-0abc".to_string(),
            image_id: Some("ami-1234".to_string()),
            instance_type: Some("t3.micro".to_string()),
            placement: Some(Placement {
                availability_zone: Some("us-east-1a".to_string()),
                group_name: None,
                tenancy: Some("default".to_string()),
            }),
            private_dns_name: Some("ip-10-0-0-1.ec2.internal".to_string()),
            private_ip_address: Some("10.0.0.1".to_string()),
            ebs_optimized: Some(false),
            source_dest_check: Some(true),
            ..Default::default()
        }
    }

    fn group(id: &str) -> GroupIdentifier {
        GroupIdentifier {
            group_name: format!("group-{}", id),
            group_id: id.to_string(),
        }
    }

    fn base_cluster() -> CacheCluster {
        CacheCluster {
            cache_cluster_id: "sessions".to_string(),
            engine: Some("memcached".to_string()),
            engine_version: Some("1.6.17".to_string()),
            cache_node_type: Some("cache.t3.micro".to_string()),
            num_cache_nodes: Some(3),
            cache_parameter_group: Some(CacheParameterGroupStatus {
                cache_parameter_group_name: Some("default.memcached1.6".to_string()),
                parameter_apply_status: None,
            }),
            cache_subnet_group_name: Some("private".to_string()),
            ..Default::default()
        }
    }

    fn node(port: Option<u16>) -> CacheNode {
        CacheNode {
            cache_node_id: Some("0001".to_string()),
            cache_node_status: Some("available".to_string()),
            endpoint: port.map(|p| Endpoint {
                address: Some("node.cache.amazonaws.com".to_string()),
                port: Some(p),
            }),
        }
    }

    fn sorted_keys(attrs: &AttributeMap) -> Vec<&str> {
        attrs.keys().collect()
    }

    #[test]
    fn test_instance_subnet_without_groups() {
        let mut instance = base_instance();
        instance.subnet_id = Some("subnet-1".to_string());

        let attrs = Ec2Projector::new().project(&instance).unwrap();

        assert_eq!(attrs.get("vpc_security_group_ids.#"), Some("0"));
        assert_eq!(attrs.get("security_groups.#"), Some("0"));
        assert_eq!(attrs.get("subnet_id"), Some("subnet-1"));
    }

    #[test]
    fn test_instance_vpc_group_without_subnet() {
        let mut instance = base_instance();
        instance.security_groups = vec![group("sg-1")];

        let attrs = Ec2Projector::new().project(&instance).unwrap();

        assert_eq!(attrs.get("vpc_security_group_ids.#"), Some("1"));
        assert_eq!(attrs.get("security_groups.#"), Some("0"));
        assert!(!attrs.contains_key("subnet_id"));
    }

    #[test]
    fn test_instance_classic_groups() {
        let mut instance = base_instance();
        instance.security_groups = vec![group("default"), group("web")];

        let attrs = Ec2Projector::new().project(&instance).unwrap();

        assert_eq!(attrs.get("security_groups.#"), Some("2"));
        assert_eq!(attrs.get("vpc_security_group_ids.#"), Some("0"));
        assert!(!attrs.contains_key("subnet_id"));
    }

    #[test]
    fn test_instance_exact_key_set() {
        let attrs = Ec2Projector::new().project(&base_instance()).unwrap();
        assert_eq!(sorted_keys(&attrs), INSTANCE_KEYS);

        let mut in_vpc = base_instance();
        in_vpc.subnet_id = Some("subnet-1".to_string());
        let attrs = Ec2Projector::new().project(&in_vpc).unwrap();

        let mut expected: Vec<&str> = INSTANCE_KEYS.to_vec();
        expected.push("subnet_id");
        expected.sort();
        assert_eq!(sorted_keys(&attrs), expected);
    }

    #[test]
    fn test_instance_network_pair_always_present() {
        let variants = [
            (None, vec![]),
            (Some("subnet-1"), vec![]),
            (None, vec![group("sg-1"), group("sg-2")]),
            (None, vec![group("default")]),
            (Some("subnet-1"), vec![group("sg-1"), group("legacy")]),
        ];

        for (subnet, groups) in variants {
            let mut instance = base_instance();
            instance.subnet_id = subnet.map(str::to_string);
            instance.security_groups = groups.clone();

            let attrs = Ec2Projector::new().project(&instance).unwrap();
            let vpc = attrs.count("vpc_security_group_ids").unwrap();
            let classic = attrs.count("security_groups").unwrap();

            assert!(vpc == 0 || classic == 0, "both sides non-zero for {:?}", groups);
            assert_eq!(vpc + classic, groups.len());
        }
    }

    #[test]
    fn test_instance_scalar_encoding() {
        let mut instance = base_instance();
        instance.ebs_optimized = Some(true);
        instance.source_dest_check = Some(false);
        instance.root_device_name = Some("/dev/xvda".to_string());
        instance.block_device_mappings = vec![
            InstanceBlockDeviceMapping {
                device_name: Some("/dev/xvda".to_string()),
                ebs: None,
            },
            InstanceBlockDeviceMapping {
                device_name: Some("/dev/xvdb".to_string()),
                ebs: None,
            },
        ];

        let attrs = Ec2Projector::new().project(&instance).unwrap();

        assert_eq!(attrs.get("ebs_optimized"), Some("true"));
        assert_eq!(attrs.get("source_dest_check"), Some("false"));
        assert_eq!(attrs.get("root_block_device.#"), Some("1"));
        assert_eq!(attrs.get("ebs_block_device.#"), Some("2"));
        assert_eq!(attrs.get("ephemeral_block_device.#"), Some("0"));
        assert_eq!(attrs.get("associate_public_ip_address"), Some("true"));
        assert_eq!(attrs.get("public_ip"), Some(""));
        assert_eq!(attrs.get("tenancy"), Some("default"));
    }

    #[test]
    fn test_instance_absent_booleans_are_empty() {
        let mut instance = base_instance();
        instance.ebs_optimized = None;
        instance.source_dest_check = None;

        let attrs = Ec2Projector::new().project(&instance).unwrap();

        assert_eq!(attrs.get("ebs_optimized"), Some(""));
        assert_eq!(attrs.get("source_dest_check"), Some(""));
    }

    #[test]
    fn test_instance_without_root_device() {
        let attrs = Ec2Projector::new().project(&base_instance()).unwrap();

        assert_eq!(attrs.get("root_block_device.#"), Some("0"));
        assert_eq!(attrs.get("ebs_block_device.#"), Some("0"));
    }

    #[test]
    fn test_instance_projection_is_deterministic() {
        let mut instance = base_instance();
        instance.security_groups = vec![group("sg-1")];
        let projector = Ec2Projector::new();

        let first = projector.project(&instance).unwrap();
        let second = projector.project(&instance).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_instance_missing_image_is_projection_error() {
        let mut instance = base_instance();
        instance.image_id = None;

        let err = Ec2Projector::new().project(&instance).unwrap_err();

        match err {
            ExportError::Projection { field, resource_id, .. } => {
                assert_eq!(field, "ImageId");
                assert_eq!(resource_id, "i-0abc");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_instance_missing_placement_is_projection_error() {
        let mut instance = base_instance();
        instance.placement = None;

        assert!(matches!(
            Ec2Projector::new().project(&instance),
            Err(ExportError::Projection { .. })
        ));
    }

    #[test]
    fn test_injected_classifier_decides_network_side() {
        struct AlwaysClassic;
        impl NetworkClassifier<Instance> for AlwaysClassic {
            fn is_private_network_member(&self, _: &Instance) -> bool {
                false
            }
        }

        let mut instance = base_instance();
        instance.security_groups = vec![group("sg-1")];
        instance.subnet_id = Some("subnet-1".to_string());

        let attrs = Ec2Projector::with_classifier(AlwaysClassic)
            .project(&instance)
            .unwrap();

        assert_eq!(attrs.get("security_groups.#"), Some("1"));
        assert_eq!(attrs.get("vpc_security_group_ids.#"), Some("0"));
        assert!(!attrs.contains_key("subnet_id"));
    }

    #[test]
    fn test_instance_entry_uses_name_tag() {
        let mut instance = base_instance();
        instance.tags = vec![Tag {
            key: "Name".to_string(),
            value: "web server".to_string(),
        }];

        let (key, entry) = Ec2Projector::new().entry(&instance).unwrap();

        assert_eq!(key, "aws_instance.web-server");
        assert_eq!(entry.resource_type, "aws_instance");
        assert_eq!(entry.primary.id, "i-0abc");
        assert_eq!(
            entry.primary.meta.unwrap().get("schema_version").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_instance_entry_falls_back_to_instance_id() {
        let (key, _) = Ec2Projector::new().entry(&base_instance()).unwrap();
        assert_eq!(key, "aws_instance.i-0abc");
    }

    #[test]
    fn test_cluster_counts() {
        let mut cluster = base_cluster();
        cluster.cache_nodes = vec![node(Some(11211)), node(Some(11211)), node(Some(11211))];
        cluster.security_groups = vec![
            SecurityGroupMembership {
                security_group_id: "sg-1".to_string(),
                status: Some("active".to_string()),
            },
            SecurityGroupMembership {
                security_group_id: "sg-2".to_string(),
                status: Some("active".to_string()),
            },
        ];

        let attrs = CacheClusterProjector::new().project(&cluster).unwrap();

        assert_eq!(attrs.get("cache_nodes.#"), Some("3"));
        assert_eq!(attrs.get("security_group_ids.#"), Some("2"));
        assert_eq!(attrs.get("security_group_names.#"), Some("0"));
        assert_eq!(attrs.get("tags.#"), Some("0"));
    }

    #[test]
    fn test_cluster_exact_key_set() {
        let attrs = CacheClusterProjector::new().project(&base_cluster()).unwrap();
        assert_eq!(sorted_keys(&attrs), CLUSTER_KEYS);
    }

    #[test]
    fn test_cluster_empty_lists_emit_zero_counts() {
        let attrs = CacheClusterProjector::new().project(&base_cluster()).unwrap();

        for key in ["cache_nodes.#", "security_group_ids.#", "security_group_names.#"] {
            assert_eq!(attrs.get(key), Some("0"), "{}", key);
        }
    }

    #[test]
    fn test_cluster_classic_security_groups() {
        let mut cluster = base_cluster();
        cluster.cache_security_groups = vec![CacheSecurityGroupMembership {
            cache_security_group_name: "default".to_string(),
            status: None,
        }];

        let attrs = CacheClusterProjector::new().project(&cluster).unwrap();

        assert_eq!(attrs.get("security_group_names.#"), Some("1"));
    }

    #[test]
    fn test_cluster_scalars() {
        let attrs = CacheClusterProjector::new().project(&base_cluster()).unwrap();

        assert_eq!(attrs.get("cluster_id"), Some("sessions"));
        assert_eq!(attrs.get("id"), Some("sessions"));
        assert_eq!(attrs.get("num_cache_nodes"), Some("3"));
        assert_eq!(attrs.get("parameter_group_name"), Some("default.memcached1.6"));
        assert_eq!(attrs.get("subnet_group_name"), Some("private"));
    }

    #[test]
    fn test_cluster_port_resolution() {
        let mut cluster = base_cluster();
        cluster.engine = Some("redis".to_string());
        assert_eq!(
            CacheClusterProjector::new().project(&cluster).unwrap().get("port"),
            Some("6379")
        );

        cluster.cache_nodes = vec![node(Some(6380))];
        assert_eq!(
            CacheClusterProjector::new().project(&cluster).unwrap().get("port"),
            Some("6380")
        );

        cluster.configuration_endpoint = Some(Endpoint {
            address: Some("cfg".to_string()),
            port: Some(7000),
        });
        assert_eq!(
            CacheClusterProjector::new().project(&cluster).unwrap().get("port"),
            Some("7000")
        );
    }

    #[test]
    fn test_cluster_unknown_engine_without_endpoint_fails() {
        let mut cluster = base_cluster();
        cluster.engine = Some("mystery".to_string());

        let err = CacheClusterProjector::new().project(&cluster).unwrap_err();
        assert!(err.to_string().contains("Port"));
    }

    #[test]
    fn test_cluster_missing_parameter_group_fails() {
        let mut cluster = base_cluster();
        cluster.cache_parameter_group = None;

        assert!(matches!(
            CacheClusterProjector::new().project(&cluster),
            Err(ExportError::Projection { .. })
        ));
    }

    #[test]
    fn test_cluster_entry_has_no_meta() {
        let (key, entry) = CacheClusterProjector::new().entry(&base_cluster()).unwrap();

        assert_eq!(key, "aws_elasticache_cluster.sessions");
        assert!(entry.primary.meta.is_none());
    }
}
