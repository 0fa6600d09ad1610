//! Command-line entry point for the IAM policy auditor.
//!
//! Reads a policy document (or a full account-authorization-details export),
//! audits it against the service-capability reference, and writes the
//! findings report. Exits 1 when findings exist, 0 when the policies are
//! clean, 2 on fatal errors (malformed input, unwritable output).

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use iam_policy_auditor_core::{
    compile, detect, normalize_account_export, normalize_single, parse_account_export,
    parse_policy_document, parse_services, render_json, write_csv, Findings,
};

/// Fixed location of the service-capability reference document.
const SERVICE_AUTH_PATH: &str = "service-auth.json";

#[derive(Parser, Debug)]
#[command(
    name = "iam-policy-auditor",
    version,
    about = "Audits IAM policies for actions granted on resource types they do not support"
)]
struct Cli {
    /// Filepath of the input file. Default behaviour processes the output of
    /// `aws iam get-account-authorization-details`.
    #[arg(short, long)]
    input: PathBuf,

    /// Save output in csv format. Default output format is json.
    #[arg(short, long)]
    csv: bool,

    /// Name of the output file without file extension.
    #[arg(short, long, default_value = "results")]
    output: String,

    /// Audit a single IAM policy supplied in json format via --input.
    #[arg(short, long)]
    single: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(findings) if findings.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Findings> {
    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    // In single mode the output base name doubles as the policy identity.
    let policies = if cli.single {
        normalize_single(parse_policy_document(&input)?, &cli.output)
    } else {
        normalize_account_export(parse_account_export(&input)?)
    };
    debug!("auditing {} policies", policies.len());

    let reference = fs::read_to_string(SERVICE_AUTH_PATH)
        .with_context(|| format!("failed to read {SERVICE_AUTH_PATH}"))?;
    let index = compile(&parse_services(&reference)?);
    debug!("reference covers {} services", index.len());

    let findings = detect(&policies, &index);
    info!(
        "{} of {} policies have findings",
        findings.len(),
        policies.len()
    );

    let path = format!("{}.{}", cli.output, if cli.csv { "csv" } else { "json" });
    if cli.csv {
        let file =
            fs::File::create(&path).with_context(|| format!("failed to create {path}"))?;
        write_csv(&findings, file)?;
    } else {
        fs::write(&path, render_json(&findings)?)
            .with_context(|| format!("failed to write {path}"))?;
    }
    println!("Output saved in {path}");

    Ok(findings)
}
