//! Step pipeline that runs one reorganization end to end.
//!
//! # Design
//! - Steps run in a fixed order: ingest, reorganize, materialize, package.
//! - Every step transition is recorded, counted in metrics and logged; a failed step stops the job.
//! - State flows between steps through [`JobState`]; a missing field is a pipeline bug, not a panic.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rendersort_core::{
    AovMapper, OutcomeKind, PlacementMode, Reorganized, Reorganizer, RunReport, TracingSink,
};
use rendersort_telemetry::Metrics;
use serde::Serialize;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::error::{FsOpsError, FsOpsResult};
use crate::sink::{DirectorySink, ZipSink};
use crate::source::{DirectorySource, ZipSource};

/// Pipeline stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Open the input and list its items.
    Ingest,
    /// Map and place every item.
    Reorganize,
    /// Write results to disk.
    Materialize,
    /// Build the result archive.
    Package,
}

impl StepKind {
    /// Stable identifier used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Reorganize => "reorganize",
            Self::Materialize => "materialize",
            Self::Package => "package",
        }
    }
}

/// Lifecycle state of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step began.
    Started,
    /// The step finished its work.
    Completed,
    /// The step returned an error.
    Failed,
    /// The step had nothing to do for this request.
    Skipped,
}

impl StepStatus {
    /// Stable identifier used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One recorded step transition.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step the record belongs to.
    pub step: StepKind,
    /// Status reached.
    pub status: StepStatus,
    /// Short human-readable detail.
    pub detail: Option<String>,
    /// When the status was reached.
    pub at: DateTime<Utc>,
}

enum StepOutcome {
    Completed(Option<String>),
    Skipped(Option<String>),
}

impl StepOutcome {
    const fn status(&self) -> StepStatus {
        match self {
            Self::Completed(_) => StepStatus::Completed,
            Self::Skipped(_) => StepStatus::Skipped,
        }
    }

    fn into_detail(self) -> Option<String> {
        match self {
            Self::Completed(detail) | Self::Skipped(detail) => detail,
        }
    }
}

/// Where the job reads its items from.
#[derive(Debug, Clone)]
pub enum JobSource {
    /// A local directory, walked recursively.
    Directory(PathBuf),
    /// A zip archive held in memory.
    Archive(Vec<u8>),
}

impl JobSource {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::Archive(_) => "archive",
        }
    }
}

/// How results are written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialize {
    /// Leave the filesystem untouched.
    Skip,
    /// Rename files inside the source directory.
    InPlace,
    /// Write mapped files into a fresh directory.
    Into(PathBuf),
}

/// Parameters for one job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Input items.
    pub source: JobSource,
    /// Placement policy for the run.
    pub mode: PlacementMode,
    /// Disk output.
    pub materialize: Materialize,
    /// Whether to build a zip of the final tree.
    pub package: bool,
}

/// Result of a finished job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Identifier used in logs.
    pub job_id: Uuid,
    /// Per-item outcomes.
    pub report: RunReport,
    /// Packaged tree when requested.
    pub archive: Option<Vec<u8>>,
    /// Step transitions in order.
    pub steps: Vec<StepRecord>,
}

impl JobOutcome {
    /// Final status recorded for `step`.
    #[must_use]
    pub fn step_status(&self, step: StepKind) -> Option<StepStatus> {
        self.steps
            .iter()
            .rev()
            .find(|record| record.step == step)
            .map(|record| record.status)
    }
}

enum Items {
    Directory(DirectorySource),
    Archive(ZipSource),
}

#[derive(Default)]
struct JobState {
    items: Option<Items>,
    reorganized: Option<Reorganized>,
    archive: Option<Vec<u8>>,
}

/// Runs [`JobRequest`]s against a shared mapper, recording metrics for every step.
#[derive(Debug, Clone)]
pub struct ReorganizeJob<'m> {
    mapper: &'m AovMapper,
    metrics: Metrics,
}

impl<'m> ReorganizeJob<'m> {
    /// Job runner bound to `mapper` and `metrics`.
    #[must_use]
    pub const fn new(mapper: &'m AovMapper, metrics: Metrics) -> Self {
        Self { mapper, metrics }
    }

    /// Execute every step of `request`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step; later steps do not run.
    pub fn run(&self, request: JobRequest) -> FsOpsResult<JobOutcome> {
        let job_id = Uuid::new_v4();
        let span = info_span!(
            "reorganize_job",
            %job_id,
            source = request.source.kind(),
            mode = request.mode.as_str()
        );
        let _entered = span.enter();

        let JobRequest {
            source,
            mode,
            materialize,
            package,
        } = request;
        let source_root = match &source {
            JobSource::Directory(root) => Some(root.clone()),
            JobSource::Archive(_) => None,
        };
        let mut state = JobState::default();
        let mut steps = Vec::new();

        self.execute_step(&mut steps, &mut state, StepKind::Ingest, |state| {
            let (items, count) = match source {
                JobSource::Directory(root) => {
                    let listing = DirectorySource::scan(&root)?;
                    let count = listing.len();
                    (Items::Directory(listing), count)
                }
                JobSource::Archive(bytes) => {
                    let archive = ZipSource::new(bytes)?;
                    let count = archive.len();
                    (Items::Archive(archive), count)
                }
            };
            state.items = Some(items);
            Ok(StepOutcome::Completed(Some(format!("{count} files"))))
        })?;

        self.execute_step(&mut steps, &mut state, StepKind::Reorganize, |state| {
            let items = state
                .items
                .take()
                .ok_or(FsOpsError::MissingState { field: "items" })?;
            let reorganizer = Reorganizer::new(self.mapper, mode);
            let reorganized = match items {
                Items::Directory(listing) => {
                    reorganizer.try_reorganize_with_sink(listing.into_items(), &mut TracingSink)?
                }
                Items::Archive(archive) => {
                    reorganizer.try_reorganize_with_sink(archive.into_items(), &mut TracingSink)?
                }
            };
            self.record_run(&reorganized.report);
            let detail = summary(&reorganized.report);
            state.reorganized = Some(reorganized);
            Ok(StepOutcome::Completed(Some(detail)))
        })?;

        self.execute_step(&mut steps, &mut state, StepKind::Materialize, |state| {
            let reorganized = state
                .reorganized
                .as_ref()
                .ok_or(FsOpsError::MissingState {
                    field: "reorganized",
                })?;
            match &materialize {
                Materialize::Skip => Ok(StepOutcome::Skipped(None)),
                Materialize::InPlace => {
                    let root = source_root.as_ref().ok_or(FsOpsError::Unsupported {
                        operation: "materialize_in_place",
                        value: Some("archive".to_string()),
                    })?;
                    if mode != PlacementMode::InPlace {
                        return Err(FsOpsError::Unsupported {
                            operation: "materialize_in_place",
                            value: Some(mode.as_str().to_string()),
                        });
                    }
                    let moved = DirectorySink::new(root).apply_in_place(&reorganized.outputs)?;
                    Ok(StepOutcome::Completed(Some(format!("{moved} renamed"))))
                }
                Materialize::Into(destination) => {
                    let written =
                        DirectorySink::new(destination).write_clean(&reorganized.outputs)?;
                    Ok(StepOutcome::Completed(Some(format!("{written} written"))))
                }
            }
        })?;

        self.execute_step(&mut steps, &mut state, StepKind::Package, |state| {
            if !package {
                return Ok(StepOutcome::Skipped(None));
            }
            let reorganized = state
                .reorganized
                .clone()
                .ok_or(FsOpsError::MissingState {
                    field: "reorganized",
                })?;
            let tree = reorganized.into_tree();
            let archive = ZipSink::new().package(&tree)?;
            let detail = format!("{} entries, {} bytes", tree.len(), archive.len());
            state.archive = Some(archive);
            Ok(StepOutcome::Completed(Some(detail)))
        })?;

        let report = state
            .reorganized
            .map(|reorganized| reorganized.report)
            .ok_or(FsOpsError::MissingState {
                field: "reorganized",
            })?;
        info!(
            renamed = report.count(OutcomeKind::Renamed),
            skipped_unparsable = report.count(OutcomeKind::SkippedUnparsable),
            skipped_duplicate = report.count(OutcomeKind::SkippedDuplicate),
            ignored = report.ignored,
            "reorganize job finished"
        );

        Ok(JobOutcome {
            job_id,
            report,
            archive: state.archive,
            steps,
        })
    }

    fn execute_step<F>(
        &self,
        steps: &mut Vec<StepRecord>,
        state: &mut JobState,
        step: StepKind,
        op: F,
    ) -> FsOpsResult<()>
    where
        F: FnOnce(&mut JobState) -> FsOpsResult<StepOutcome>,
    {
        self.record_step(steps, step, StepStatus::Started, None);
        match op(state) {
            Ok(outcome) => {
                let status = outcome.status();
                self.record_step(steps, step, status, outcome.into_detail());
                Ok(())
            }
            Err(err) => {
                error!(error = %err, error_debug = ?err, step = step.as_str(), "job step failed");
                self.record_step(steps, step, StepStatus::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    fn record_step(
        &self,
        steps: &mut Vec<StepRecord>,
        step: StepKind,
        status: StepStatus,
        detail: Option<String>,
    ) {
        info!(
            step = step.as_str(),
            status = status.as_str(),
            detail = detail.as_deref().unwrap_or_default(),
            "job step"
        );
        self.metrics.inc_job_step(step.as_str(), status.as_str());
        steps.push(StepRecord {
            step,
            status,
            detail,
            at: Utc::now(),
        });
    }

    fn record_run(&self, report: &RunReport) {
        self.metrics.inc_reorganize_run(report.mode.as_str());
        for kind in [
            OutcomeKind::Renamed,
            OutcomeKind::SkippedUnparsable,
            OutcomeKind::SkippedDuplicate,
        ] {
            let count = u64::try_from(report.count(kind)).unwrap_or(u64::MAX);
            self.metrics.add_reorganize_items(kind.as_str(), count);
        }
    }
}

fn summary(report: &RunReport) -> String {
    format!(
        "{} renamed, {} unparsable, {} duplicate, {} ignored",
        report.count(OutcomeKind::Renamed),
        report.count(OutcomeKind::SkippedUnparsable),
        report.count(OutcomeKind::SkippedDuplicate),
        report.ignored
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rendersort_test_support::archive::{read_zip, zip_bytes};
    use rendersort_test_support::assert::assert_tree;
    use rendersort_test_support::fixtures::{
        expected_output, pass_name, sample_batch, temp_dir, write_tree,
    };

    fn has_sample(rendered: &str, step: &str, status: &str) -> bool {
        rendered.lines().any(|line| {
            line.starts_with("job_steps_total{")
                && line.contains(step)
                && line.contains(status)
                && line.ends_with(" 1")
        })
    }

    fn job(mapper: &AovMapper) -> Result<ReorganizeJob<'_>> {
        Ok(ReorganizeJob::new(mapper, Metrics::new()?))
    }

    #[test]
    fn directory_job_renames_in_place_and_packages_everything() -> Result<()> {
        let mapper = AovMapper::new()?;
        let dir = temp_dir("rendersort-job-")?;
        write_tree(dir.path(), &sample_batch())?;

        let outcome = job(&mapper)?.run(JobRequest {
            source: JobSource::Directory(dir.path().to_path_buf()),
            mode: PlacementMode::InPlace,
            materialize: Materialize::InPlace,
            package: true,
        })?;

        let expected = [
            pass_name(3, 71),
            expected_output("WGR", "TB"),
            expected_output("WGR", "WB"),
            "notes.txt".to_string(),
            "randomfile.png".to_string(),
        ];
        assert_tree(dir.path(), &expected)?;
        let archive = outcome
            .archive
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("expected archive"))?;
        let mut names: Vec<String> = read_zip(archive)?.into_keys().collect();
        names.sort();
        let mut expected_sorted = expected.to_vec();
        expected_sorted.sort();
        assert_eq!(names, expected_sorted);

        assert_eq!(outcome.report.count(OutcomeKind::Renamed), 2);
        assert_eq!(outcome.report.count(OutcomeKind::SkippedDuplicate), 1);
        assert_eq!(outcome.report.count(OutcomeKind::SkippedUnparsable), 1);
        assert_eq!(outcome.report.ignored, 1);
        assert_eq!(
            outcome.step_status(StepKind::Materialize),
            Some(StepStatus::Completed)
        );
        Ok(())
    }

    #[test]
    fn archive_job_in_clean_mode_keeps_only_mapped_items() -> Result<()> {
        let mapper = AovMapper::new()?;
        let bytes = zip_bytes(&sample_batch())?;
        let outcome = job(&mapper)?.run(JobRequest {
            source: JobSource::Archive(bytes),
            mode: PlacementMode::Clean,
            materialize: Materialize::Skip,
            package: true,
        })?;

        let archive = outcome
            .archive
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("expected archive"))?;
        let files = read_zip(archive)?;
        let names: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            [expected_output("WGR", "TB"), expected_output("WGR", "WB")]
        );
        assert_eq!(
            files.get(&expected_output("WGR", "WB")).map(Vec::as_slice),
            Some(&b"pass-3"[..])
        );
        assert_eq!(
            outcome.step_status(StepKind::Materialize),
            Some(StepStatus::Skipped)
        );
        Ok(())
    }

    #[test]
    fn clean_job_writes_into_destination() -> Result<()> {
        let mapper = AovMapper::new()?;
        let input = temp_dir("rendersort-job-")?;
        let output = temp_dir("rendersort-job-out-")?;
        write_tree(input.path(), &sample_batch())?;

        let outcome = job(&mapper)?.run(JobRequest {
            source: JobSource::Directory(input.path().to_path_buf()),
            mode: PlacementMode::Clean,
            materialize: Materialize::Into(output.path().join("sorted")),
            package: false,
        })?;

        assert!(outcome.archive.is_none());
        assert_eq!(
            outcome.step_status(StepKind::Package),
            Some(StepStatus::Skipped)
        );
        assert_tree(
            &output.path().join("sorted"),
            &[expected_output("WGR", "TB"), expected_output("WGR", "WB")],
        )?;
        assert_eq!(
            rendersort_test_support::assert::list_tree(input.path())?.len(),
            5,
            "clean runs leave the input untouched"
        );
        Ok(())
    }

    #[test]
    fn in_place_materialisation_needs_a_directory_source() -> Result<()> {
        let mapper = AovMapper::new()?;
        let metrics = Metrics::new()?;
        let runner = ReorganizeJob::new(&mapper, metrics.clone());
        let result = runner.run(JobRequest {
            source: JobSource::Archive(zip_bytes(&sample_batch())?),
            mode: PlacementMode::InPlace,
            materialize: Materialize::InPlace,
            package: false,
        });
        assert!(matches!(result, Err(FsOpsError::Unsupported { .. })));
        let rendered = metrics.render()?;
        assert!(has_sample(&rendered, "step=\"materialize\"", "status=\"failed\""));
        Ok(())
    }

    #[test]
    fn ingest_failure_stops_the_pipeline() -> Result<()> {
        let mapper = AovMapper::new()?;
        let metrics = Metrics::new()?;
        let runner = ReorganizeJob::new(&mapper, metrics.clone());
        let result = runner.run(JobRequest {
            source: JobSource::Archive(b"definitely not a zip".to_vec()),
            mode: PlacementMode::Clean,
            materialize: Materialize::Skip,
            package: true,
        });
        assert!(matches!(result, Err(FsOpsError::Zip { .. })));
        let rendered = metrics.render()?;
        assert!(has_sample(&rendered, "step=\"ingest\"", "status=\"failed\""));
        assert!(!rendered.contains("step=\"reorganize\""));
        Ok(())
    }

    #[test]
    fn run_metrics_count_outcomes() -> Result<()> {
        let mapper = AovMapper::new()?;
        let metrics = Metrics::new()?;
        let runner = ReorganizeJob::new(&mapper, metrics.clone());
        let outcome = runner.run(JobRequest {
            source: JobSource::Archive(zip_bytes(&sample_batch())?),
            mode: PlacementMode::Clean,
            materialize: Materialize::Skip,
            package: false,
        })?;
        assert_eq!(outcome.report.count(OutcomeKind::Renamed), 2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.reorganize_runs_total, 1);
        assert_eq!(snapshot.items_renamed_total, 2);
        assert_eq!(snapshot.items_skipped_total, 2);
        assert_eq!(outcome.steps.len(), 8);
        Ok(())
    }
}
