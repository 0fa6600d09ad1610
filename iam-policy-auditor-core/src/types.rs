//! Document shapes shared across the auditor.
//!
//! The source JSON tolerates both scalar and list forms for `Statement`,
//! `Action` and `Resource`. That ambiguity is modeled once, as [`OneOrMany`],
//! and coerced to a canonical list at each component boundary. `Resource` is
//! coerced during normalization; `Action` deliberately keeps its source shape
//! until detection (see [`crate::normalize`]).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON field that is either a bare scalar or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Canonicalize to a list, wrapping a scalar into a singleton.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.clone().into_vec()
    }
}

/// One statement as it appears in a policy document. Keys other than
/// `Action` and `Resource` (Effect, Sid, Condition, NotResource, ...) play
/// no role in the audit and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatement {
    #[serde(rename = "Action")]
    pub action: Option<OneOrMany<String>>,
    #[serde(rename = "Resource")]
    pub resource: Option<OneOrMany<String>>,
}

/// A statement after normalization: `resource` is always list-shaped,
/// `action` still carries its source shape.
#[derive(Debug, Clone)]
pub struct NormalizedStatement {
    pub action: Option<OneOrMany<String>>,
    pub resource: Option<Vec<String>>,
}

/// A policy document: `{"Statement": <object or array>}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Statement")]
    pub statement: OneOrMany<RawStatement>,
}

/// The shape of `aws iam get-account-authorization-details` output that the
/// auditor consumes. Both top-level lists are required; a document without
/// them is structurally invalid.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountAuthorizationDetails {
    #[serde(rename = "RoleDetailList")]
    pub role_detail_list: Vec<RoleDetail>,
    #[serde(rename = "Policies")]
    pub policies: Vec<ManagedPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleDetail {
    #[serde(rename = "RoleName")]
    pub role_name: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "RolePolicyList")]
    pub role_policy_list: Vec<InlinePolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlinePolicy {
    #[serde(rename = "PolicyDocument")]
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagedPolicy {
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "PolicyVersionList")]
    pub policy_version_list: Vec<PolicyVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyVersion {
    #[serde(rename = "IsDefaultVersion")]
    pub is_default_version: bool,
    #[serde(rename = "Document")]
    pub document: PolicyDocument,
}

/// One service entry of the service-capability reference document.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(rename = "servicePrefix")]
    pub service_prefix: String,
    #[serde(rename = "resourceTypes")]
    pub resource_types: Vec<ResourceTypeDescriptor>,
    pub actions: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTypeDescriptor {
    pub name: String,
    #[serde(rename = "arnPattern")]
    pub arn_pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    #[serde(rename = "resourceTypes")]
    pub resource_types: Vec<ResourceTypeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTypeRef {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
}

/// A policy under audit: its authoritative identity (the `arn` used in
/// output) and its normalized statements.
#[derive(Debug, Clone)]
pub struct Policy {
    pub arn: String,
    pub statements: Vec<NormalizedStatement>,
}

/// Policies keyed by role-name+index, policy name, or the caller-supplied
/// identity in single-policy mode. Insertion-ordered: detection traverses
/// policies in the order normalization registered them, which fixes the
/// within-arn concatenation order of findings.
pub type PolicyMap = IndexMap<String, Policy>;

/// Finding messages for one policy arn, serialized as `{"errors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyFindings {
    pub errors: Vec<String>,
}

/// Output contract: policy arn -> its finding messages.
pub type Findings = BTreeMap<String, PolicyFindings>;
