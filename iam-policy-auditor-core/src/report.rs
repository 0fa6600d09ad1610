//! Findings report rendering.
//!
//! Two shapes: the findings map verbatim as JSON, or a flat CSV table with
//! one row per (entity, message) pair.

use std::io::Write;

use crate::error::PolicyAuditResult;
use crate::types::Findings;

/// Render the findings map as its JSON output contract:
/// `{arn: {"errors": [...]}}`.
pub fn render_json(findings: &Findings) -> PolicyAuditResult<String> {
    Ok(serde_json::to_string(findings)?)
}

/// Write the findings as CSV: header `IAM Entity, Error`, then one row per
/// individual finding message.
pub fn write_csv<W: Write>(findings: &Findings, writer: W) -> PolicyAuditResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["IAM Entity", "Error"])?;
    for (arn, policy_findings) in findings {
        for error in &policy_findings.errors {
            writer.write_record([arn.as_str(), error.as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}
