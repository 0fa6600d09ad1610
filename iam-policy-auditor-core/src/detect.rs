//! Bug detection: statements that grant an action on a resource type the
//! action does not support, per the compiled [`ServiceActionIndex`].
//!
//! Detection never fails. Unknown services surface as findings; unknown
//! exact actions and malformed action tokens are skipped silently. The
//! asymmetry (unknown service -> finding, unknown exact action -> skip) is
//! preserved on purpose for behavioral compatibility with the reference
//! data gaps it tolerates.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::reference::ServiceActionIndex;
use crate::types::{Findings, PolicyMap};

/// Evaluate every statement of every policy against the index.
///
/// Findings accumulate under the policy's arn: the entry is created on the
/// first finding and appended to afterwards, including across policy keys
/// that share an arn (a role's inline policies all report under the role).
pub fn detect(policies: &PolicyMap, index: &ServiceActionIndex) -> Findings {
    let mut findings = Findings::new();

    for policy in policies.values() {
        for statement in &policy.statements {
            // NotResource-only statements are out of scope.
            let Some(resources) = statement.resource.as_deref() else {
                continue;
            };
            // A * resource satisfies every action; nothing to flag.
            if resources.iter().any(|resource| resource == "*") {
                continue;
            }
            let Some(action) = &statement.action else {
                continue;
            };

            for token in action.to_vec() {
                let messages = action_findings(&token, resources, index);
                if !messages.is_empty() {
                    findings
                        .entry(policy.arn.clone())
                        .or_default()
                        .errors
                        .extend(messages);
                }
            }
        }
    }

    findings
}

/// Findings for one action token of a statement.
///
/// Tokens with fewer than two `:` segments are malformed and skipped. A
/// wildcard in the action part expands prefix-anchored over every action the
/// service defines, collecting the per-action messages.
fn action_findings(token: &str, resources: &[String], index: &ServiceActionIndex) -> Vec<String> {
    let segments: Vec<&str> = token.split(':').collect();
    if segments.len() < 2 {
        debug!("skipping malformed action token {token}");
        return Vec::new();
    }
    let service = segments[0].to_lowercase();
    let action = segments[1].to_lowercase();

    let Some(actions) = index.service(&service) else {
        return vec![format!("{token} is not found in aws reference list")];
    };

    if action.contains('*') {
        let Ok(matcher) = Regex::new(&format!("^{}", action.replace('*', ".*"))) else {
            debug!("unable to compile expansion pattern for {token}");
            return Vec::new();
        };
        let mut messages = Vec::new();
        for (candidate, templates) in actions {
            if matcher.is_match(candidate) {
                if let Some(message) =
                    resource_type_finding(token, candidate, templates, resources)
                {
                    messages.push(message);
                }
            }
        }
        messages
    } else if let Some(templates) = actions.get(&action) {
        resource_type_finding(token, &action, templates, resources)
            .into_iter()
            .collect()
    } else {
        // Exact actions missing from the reference are accepted silently to
        // keep false positives down when the reference document has gaps.
        debug!("action {token} not in reference for known service {service}");
        Vec::new()
    }
}

/// Check declared resources against the templates one action supports.
/// Returns the finding message, or `None` when compliant.
fn resource_type_finding(
    token: &str,
    action: &str,
    templates: &[String],
    resources: &[String],
) -> Option<String> {
    if templates.is_empty() {
        // The action only accepts the * resource, and wildcard resources
        // were already excluded upstream.
        return Some(if token.contains('*') {
            format!("{token} ({action}) requires * resource")
        } else {
            format!("{token} requires * resource")
        });
    }

    for resource in resources {
        for template in templates {
            if arn_matches(template, resource) {
                return None;
            }
        }
    }

    Some(if token.contains('*') {
        format!(
            "Resource type may not be support for {token} ({action}) with resource: {}. Intended format: {}",
            render_list(resources),
            render_list(templates)
        )
    } else {
        format!(
            "Resource type may not be support for {token} with resource: {}. Intended format: {}",
            render_list(resources),
            render_list(templates)
        )
    })
}

/// Prefix-anchored match of a declared resource ARN against one template:
/// the template is lowercased and every `${...}` placeholder becomes `.*`;
/// the resource is matched as written. A resource whose own type segment is
/// literally `*` matches any template.
fn arn_matches(template: &str, resource: &str) -> bool {
    let lowered = template.to_lowercase();
    let candidate = placeholder_pattern().replace_all(&lowered, ".*");
    if let Ok(matcher) = Regex::new(&format!("^{candidate}")) {
        if matcher.is_match(resource) {
            return true;
        }
    }
    resource_type_segment(resource).to_lowercase() == "*"
}

/// The resource-type segment of an ARN (position 5, 0-indexed), empty when
/// the ARN is too short.
fn resource_type_segment(arn: &str) -> &str {
    arn.split(':').nth(5).unwrap_or_default()
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{[^}]*\}").expect("placeholder pattern is a valid regex")
    })
}

/// Render a string list the way findings spell them out:
/// `['first', 'second']`.
fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();
    format!("[{}]", quoted.join(", "))
}
