use std::path::PathBuf;

use anyhow::anyhow;
use rendersort_api_models::OutcomeCounts;
use rendersort_core::{AovMapper, PlacementMode, RunReport};
use rendersort_fsops::{
    JobOutcome, JobRequest, JobSource, Materialize, ReorganizeJob, StepRecord,
};
use rendersort_telemetry::Metrics;
use serde::Serialize;
use uuid::Uuid;

use crate::cli::{OutputFormat, RunArgs};
use crate::client::{CliError, CliResult};
use crate::commands::write_archive;
use crate::output::render_run;

/// Result of a local run as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) job_id: Uuid,
    pub(crate) mode: PlacementMode,
    pub(crate) dry_run: bool,
    pub(crate) counts: OutcomeCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) archive: Option<PathBuf>,
    pub(crate) report: RunReport,
    pub(crate) steps: Vec<StepRecord>,
}

pub(crate) async fn handle_run(args: RunArgs, format: OutputFormat) -> CliResult<()> {
    let summary = execute_run(args).await?;
    render_run(&summary, format)
}

pub(crate) async fn execute_run(args: RunArgs) -> CliResult<RunSummary> {
    let request = build_request(&args)?;
    if !args.dir.is_dir() {
        return Err(CliError::validation(format!(
            "not a directory: {}",
            args.dir.display()
        )));
    }
    let outcome = tokio::task::spawn_blocking(move || run_job(request))
        .await
        .map_err(|err| CliError::failure(anyhow!("reorganize task failed: {err}")))??;

    if let (Some(path), Some(bytes)) = (args.zip.as_deref(), outcome.archive.as_deref()) {
        write_archive(path, bytes)?;
    }

    Ok(RunSummary {
        job_id: outcome.job_id,
        mode: outcome.report.mode,
        dry_run: args.dry_run,
        counts: OutcomeCounts::from(&outcome.report),
        archive: args.zip,
        report: outcome.report,
        steps: outcome.steps,
    })
}

fn run_job(request: JobRequest) -> CliResult<JobOutcome> {
    let mapper = AovMapper::new()
        .map_err(|err| CliError::failure(anyhow!("failed to prepare filename mapper: {err}")))?;
    let metrics = Metrics::new()
        .map_err(|err| CliError::failure(anyhow!("failed to initialise metrics: {err}")))?;
    Ok(ReorganizeJob::new(&mapper, metrics).run(request)?)
}

/// Translate flags into a job request, rejecting combinations that would silently do nothing.
pub(crate) fn build_request(args: &RunArgs) -> CliResult<JobRequest> {
    let mode = PlacementMode::from(args.mode);
    let materialize = if args.dry_run {
        Materialize::Skip
    } else {
        match (mode, args.dest.as_ref()) {
            (PlacementMode::InPlace, None) => Materialize::InPlace,
            (PlacementMode::InPlace, Some(_)) => {
                return Err(CliError::validation(
                    "--dest only applies to --mode clean",
                ));
            }
            (PlacementMode::Clean, Some(dest)) => Materialize::Into(dest.clone()),
            (PlacementMode::Clean, None) if args.zip.is_some() => Materialize::Skip,
            (PlacementMode::Clean, None) => {
                return Err(CliError::validation(
                    "--mode clean needs --dest, --zip or --dry-run",
                ));
            }
        }
    };

    Ok(JobRequest {
        source: JobSource::Directory(args.dir.clone()),
        mode,
        materialize,
        package: args.zip.is_some(),
    })
}
