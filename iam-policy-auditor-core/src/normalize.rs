//! Policy document normalization.
//!
//! Produces the flat [`PolicyMap`] that detection consumes, from either a
//! single inline policy or a full `get-account-authorization-details`
//! export. Normalization coerces the `Statement` list and every statement's
//! `Resource` field into canonical list shape. The `Action` field keeps its
//! scalar-or-list source shape here; detection coerces it lazily. That
//! asymmetry is a deliberate two-stage design, not an oversight.

use log::debug;

use crate::error::PolicyAuditResult;
use crate::types::{
    AccountAuthorizationDetails, NormalizedStatement, OneOrMany, Policy, PolicyDocument, PolicyMap,
};

/// Parse a raw policy document (single-policy mode input).
pub fn parse_policy_document(json: &str) -> PolicyAuditResult<PolicyDocument> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a raw account-authorization-details export.
pub fn parse_account_export(json: &str) -> PolicyAuditResult<AccountAuthorizationDetails> {
    Ok(serde_json::from_str(json)?)
}

fn coerce_statements(doc: PolicyDocument) -> Vec<NormalizedStatement> {
    doc.statement
        .into_vec()
        .into_iter()
        .map(|statement| NormalizedStatement {
            action: statement.action,
            resource: statement.resource.map(OneOrMany::into_vec),
        })
        .collect()
}

/// Normalize a lone policy document under a caller-supplied identity. The
/// identity doubles as the output arn.
pub fn normalize_single(doc: PolicyDocument, identity: &str) -> PolicyMap {
    let mut policies = PolicyMap::new();
    policies.insert(
        identity.to_string(),
        Policy {
            arn: identity.to_string(),
            statements: coerce_statements(doc),
        },
    );
    policies
}

/// Normalize a full account export: inline role policies keyed
/// `"{RoleName}-{index}"` under the role's arn, plus the default version of
/// every managed policy keyed by policy name under the policy's arn.
pub fn normalize_account_export(doc: AccountAuthorizationDetails) -> PolicyMap {
    let mut policies = PolicyMap::new();

    for role in doc.role_detail_list {
        for (i, inline) in role.role_policy_list.into_iter().enumerate() {
            policies.insert(
                format!("{}-{i}", role.role_name),
                Policy {
                    arn: role.arn.clone(),
                    statements: coerce_statements(inline.policy_document),
                },
            );
        }
    }

    for policy in doc.policies {
        for version in policy.policy_version_list {
            // Non-default versions are ignored. Exports can transiently mark
            // several versions default; the later one overwrites.
            if version.is_default_version {
                policies.insert(
                    policy.policy_name.clone(),
                    Policy {
                        arn: policy.arn.clone(),
                        statements: coerce_statements(version.document),
                    },
                );
            }
        }
    }

    debug!("normalized {} policies", policies.len());
    policies
}
