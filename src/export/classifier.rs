//! Network membership heuristics
//!
//! No single field of a described instance reliably says whether it lives in
//! a VPC, so the decision combines several signals. The rule mirrors the one
//! Terraform's AWS provider applies when it reads an instance back.

use crate::provider::types::Instance;

/// Group id prefix used by VPC security groups
const VPC_SECURITY_GROUP_PREFIX: &str = "sg-";

/// Decides whether a record belongs to a private network
///
/// Implementations must be pure: projectors may call them more than once
/// per record and rely on identical answers.
pub trait NetworkClassifier<R> {
    fn is_private_network_member(&self, record: &R) -> bool;
}

/// VPC membership rule for EC2 instances
#[derive(Debug, Clone, Copy, Default)]
pub struct Ec2VpcClassifier;

impl Ec2VpcClassifier {
    /// Security groups referenced by VPC-style group ids
    pub fn vpc_security_group_count(instance: &Instance) -> usize {
        instance
            .security_groups
            .iter()
            .filter(|sg| sg.group_id.starts_with(VPC_SECURITY_GROUP_PREFIX))
            .count()
    }
}

impl NetworkClassifier<Instance> for Ec2VpcClassifier {
    fn is_private_network_member(&self, instance: &Instance) -> bool {
        let has_subnet = instance
            .subnet_id
            .as_deref()
            .is_some_and(|subnet| !subnet.is_empty());

        Self::vpc_security_group_count(instance) > 0
            || (has_subnet && instance.security_groups.is_empty())
    }
}
