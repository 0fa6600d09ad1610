//! Service-capability reference compilation.
//!
//! Folds a sequence of service descriptors into a [`ServiceActionIndex`]:
//! for every (service, action) pair, the ARN-pattern templates the action
//! legitimately applies to. The index is built once per run and read-only
//! afterwards.

use std::collections::BTreeMap;

use log::debug;

use crate::error::PolicyAuditResult;
use crate::types::ServiceDescriptor;

/// Lowercase service prefix -> lowercase action name -> ordered ARN-pattern
/// templates. The template list is kept duplication-free only by the source
/// document; duplicates are harmless and order is stable. An action with an
/// empty template list accepts nothing but the `*` resource.
///
/// `BTreeMap` keeps iteration deterministic, which makes compilation
/// idempotent and wildcard-action expansion order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceActionIndex(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl ServiceActionIndex {
    /// Action map for a service prefix, if the reference knows the service.
    pub fn service(&self, prefix: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.0.get(prefix)
    }

    /// Templates for one (service, action) pair.
    pub fn patterns(&self, service: &str, action: &str) -> Option<&[String]> {
        self.0
            .get(service)
            .and_then(|actions| actions.get(action))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a raw service-capability reference document.
pub fn parse_services(json: &str) -> PolicyAuditResult<Vec<ServiceDescriptor>> {
    Ok(serde_json::from_str(json)?)
}

/// Compile service descriptors into the action index.
///
/// A service prefix appearing more than once accumulates: later entries
/// union into the existing action map, overwriting only the actions they
/// themselves define. Resource-type references with no matching definition
/// are skipped; reference documents do contain dangling names.
pub fn compile(services: &[ServiceDescriptor]) -> ServiceActionIndex {
    let mut index: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

    for service in services {
        let mut actions: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for action in &service.actions {
            let mut templates = Vec::new();
            for reference in &action.resource_types {
                for resource_type in &service.resource_types {
                    if resource_type.name == reference.resource_type {
                        templates.push(canonicalize_arn_pattern(&resource_type.arn_pattern));
                    }
                }
            }
            actions.insert(action.name.to_lowercase(), templates);
        }

        debug!(
            "compiled {} actions for service {}",
            actions.len(),
            service.service_prefix
        );
        index
            .entry(service.service_prefix.to_lowercase())
            .or_default()
            .extend(actions);
    }

    ServiceActionIndex(index)
}

/// Canonicalize an ARN pattern into its templated form: the service code at
/// segment 2 is kept verbatim, partition/region/account become placeholders,
/// and the resource part (segments 5 onward) is untouched.
fn canonicalize_arn_pattern(arn: &str) -> String {
    let segments: Vec<&str> = arn.split(':').collect();
    let service = segments.get(2).copied().unwrap_or_default();
    let resource = if segments.len() > 5 {
        segments[5..].join(":")
    } else {
        String::new()
    };
    format!("arn:${{Partition}}:{service}:${{Region}}:${{Account}}:{resource}")
}
