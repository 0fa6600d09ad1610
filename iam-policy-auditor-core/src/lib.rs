//! This crate provides the core business logic for the IAM policy auditor:
//! - service-capability reference compilation into an action index
//! - policy normalization (single policies and account-wide exports)
//! - detection of actions granted on unsupported resource types
//! - findings report rendering (JSON and CSV)
//!
//! Everything here is a pure, synchronous transformation over in-memory
//! structures; file I/O lives in the CLI crate.

mod detect;
mod error;
mod normalize;
mod reference;
mod report;
mod types;

// Re-exports for a small, focused public API
pub use detect::detect;
pub use error::{PolicyAuditError, PolicyAuditResult};
pub use normalize::{
    normalize_account_export, normalize_single, parse_account_export, parse_policy_document,
};
pub use reference::{compile, parse_services, ServiceActionIndex};
pub use report::{render_json, write_csv};
pub use types::{
    AccountAuthorizationDetails, Findings, NormalizedStatement, OneOrMany, Policy,
    PolicyDocument, PolicyFindings, PolicyMap, RawStatement, ServiceDescriptor,
};
