//! Error types for the IAM policy auditor.
//!
//! Only structural problems are errors: a reference or policy document that
//! is missing required keys, or a report that cannot be written. Everything
//! the auditor discovers about policy *content* is a finding, never an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyAuditError {
    #[error("structural error in input document: {0}")]
    Structure(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV report error: {0}")]
    Csv(#[from] csv::Error),
}

pub type PolicyAuditResult<T> = Result<T, PolicyAuditError>;
