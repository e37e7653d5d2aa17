#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the rendersort API.
//!
//! The server emits these and the CLI decodes them, so both sides agree on the
//! problem document and the processing report without the CLI linking the server.

use rendersort_core::{OutcomeKind, PlacementMode, RunReport};
use rendersort_fsops::StepRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RFC 9457 problem document returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
}

/// Outcome counters for one run, also sent as response headers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Items mapped and placed.
    pub renamed: usize,
    /// PNG items whose name did not follow the render structure.
    pub skipped_unparsable: usize,
    /// Items whose destination was already taken.
    pub skipped_duplicate: usize,
    /// Items passed over by the `.png` filter.
    pub ignored: usize,
}

impl From<&RunReport> for OutcomeCounts {
    fn from(report: &RunReport) -> Self {
        Self {
            renamed: report.count(OutcomeKind::Renamed),
            skipped_unparsable: report.count(OutcomeKind::SkippedUnparsable),
            skipped_duplicate: report.count(OutcomeKind::SkippedDuplicate),
            ignored: report.ignored,
        }
    }
}

/// JSON body returned when a run is requested with `?report=json`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    /// Job identifier, also present in the service logs.
    pub job_id: Uuid,
    /// Placement mode the run used.
    pub mode: PlacementMode,
    /// Outcome counters.
    pub counts: OutcomeCounts,
    /// Full per-item report.
    pub report: RunReport,
    /// Recorded pipeline steps.
    pub steps: Vec<StepRecord>,
}
