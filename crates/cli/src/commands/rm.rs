//! rm command - Remove objects, incomplete multipart uploads, or buckets
//!
//! The target and flags are validated before any alias is looked up, so a
//! bad invocation never touches the network.

use clap::Args;
use serde::Serialize;

use ossadm_core::removal::resolve;
use ossadm_core::{
    Alias, AliasManager, Config, ConfirmationGate, DeletionTally, RemovalFlags, RemovalReport,
    RemovalRequest, Remover, RetryBuilder, RetryConfig, StepStatus,
};
use ossadm_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, RemovalProgress};

/// Remove objects, incomplete multipart uploads, or buckets
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Target to remove (ALIAS/BUCKET[/KEY])
    pub target: String,

    /// Remove everything under the key prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Remove the bucket itself; with --recursive, empty it first
    #[arg(short, long)]
    pub bucket: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Abort incomplete multipart uploads instead of removing objects
    #[arg(short, long)]
    pub multipart: bool,

    /// Remove objects and incomplete multipart uploads
    #[arg(short, long)]
    pub all_type: bool,

    /// Attempts per remote call, including the first
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub retry_times: Option<u32>,
}

impl RmArgs {
    fn flags(&self) -> RemovalFlags {
        RemovalFlags {
            recursive: self.recursive,
            to_bucket: self.bucket,
            force: self.force,
            multipart: self.multipart,
            all_type: self.all_type,
        }
    }
}

#[derive(Debug, Serialize)]
struct StepOutput {
    status: &'static str,
    scanned: u64,
    removed: u64,
}

impl StepOutput {
    fn new(status: StepStatus, tally: &DeletionTally) -> Self {
        Self {
            status: status.as_str(),
            scanned: tally.scanned(),
            removed: tally.removed(),
        }
    }
}

/// JSON output for rm
#[derive(Debug, Serialize)]
struct RmOutput {
    target: String,
    plan: &'static str,
    status: &'static str,
    objects: StepOutput,
    multipart_uploads: StepOutput,
    bucket: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RmOutput {
    fn new(
        request: &RemovalRequest,
        report: &RemovalReport,
        error: Option<&ossadm_core::Error>,
    ) -> Self {
        let status = if error.is_some() {
            "failed"
        } else if report.any_cancelled() {
            "cancelled"
        } else {
            "success"
        };

        Self {
            target: request.target.to_string(),
            plan: report.plan.name(),
            status,
            objects: StepOutput::new(report.objects_status, &report.objects),
            multipart_uploads: StepOutput::new(report.fragments_status, &report.fragments),
            bucket: report.bucket_status.as_str(),
            error: error.map(|e| e.to_string()),
        }
    }
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig, config: &Config) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let request = match resolve(&args.target, args.flags()) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let alias = match AliasManager::new().and_then(|m| m.get(&request.target.alias)) {
        Ok(a) => a,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let client = match S3Client::new(&alias).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::NetworkError;
        }
    };

    let retry = retry_config(args.retry_times, &alias, config);
    tracing::debug!(
        path = %request.target,
        plan = request.plan.name(),
        max_attempts = retry.max_attempts,
        "Resolved removal"
    );

    let progress = RemovalProgress::new(formatter.config());
    let mut remover = Remover::new(&client, retry, ConfirmationGate::stdio(args.force))
        .with_observer(Box::new(progress));

    match remover.run(&request).await {
        Ok(report) => {
            print_report(&formatter, &request, &report, None);
            ExitCode::Success
        }
        Err(failure) => {
            print_report(&formatter, &request, &failure.report, Some(&failure.error));
            formatter.error(&failure.error.to_string());
            ExitCode::from_error(&failure.error)
        }
    }
}

/// Retry budget: `--retry-times`, then the alias, then the config file
fn retry_config(retry_times: Option<u32>, alias: &Alias, config: &Config) -> RetryConfig {
    let base = alias.retry.unwrap_or(config.retry);
    match retry_times {
        Some(n) => RetryBuilder::from(base).max_attempts(n).build(),
        None => base,
    }
}

fn print_report(
    formatter: &Formatter,
    request: &RemovalRequest,
    report: &RemovalReport,
    error: Option<&ossadm_core::Error>,
) {
    if formatter.is_json() {
        formatter.json(&RmOutput::new(request, report, error));
        return;
    }

    let location = request.target.to_string();
    print_step(formatter, "objects", &location, report.objects_status, &report.objects);
    print_step(
        formatter,
        "multipart uploads",
        &location,
        report.fragments_status,
        &report.fragments,
    );

    let bucket = formatter.style_name(request.bucket());
    match report.bucket_status {
        StepStatus::Completed => formatter.success(&format!("Removed bucket '{bucket}'.")),
        StepStatus::Cancelled => formatter.warning(&format!("Bucket '{bucket}' was kept.")),
        StepStatus::Skipped | StepStatus::Failed => {}
    }
}

fn print_step(
    formatter: &Formatter,
    noun: &str,
    location: &str,
    status: StepStatus,
    tally: &DeletionTally,
) {
    let removed = formatter.style_count(tally.removed());
    match status {
        StepStatus::Skipped => {}
        StepStatus::Cancelled => formatter.warning(&format!("Removal of {noun} cancelled.")),
        StepStatus::Completed => formatter.success(&format!(
            "Removed {removed} {noun} from '{location}' ({} scanned).",
            tally.scanned()
        )),
        StepStatus::Failed => formatter.println(&format!(
            "Removed {removed} of {} {noun} from '{location}' before failing.",
            tally.scanned()
        )),
    }
}
