//! Run report and diagnostic sinks.
//!
//! # Design
//! - The report is the queryable record of every decision, in processing order.
//! - Sinks observe entries as they are recorded and cannot change the outcome.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::PlacementMode;

/// Per-item outcome recorded by the reorganizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Item was mapped and placed.
    Renamed,
    /// Item name did not follow the render naming structure.
    SkippedUnparsable,
    /// Item mapped onto a path that was already taken.
    SkippedDuplicate,
}

impl OutcomeKind {
    /// Stable identifier used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Renamed => "renamed",
            Self::SkippedUnparsable => "skipped_unparsable",
            Self::SkippedDuplicate => "skipped_duplicate",
        }
    }
}

/// One line of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Outcome for the item.
    pub kind: OutcomeKind,
    /// Input name as received.
    pub source: String,
    /// Destination path, absent for unparsable items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.target.as_deref()) {
            (OutcomeKind::Renamed, Some(target)) => {
                write!(formatter, "RENAMED: {} -> {target}", self.source)
            }
            (OutcomeKind::SkippedDuplicate, Some(target)) => {
                write!(formatter, "SKIPPED (exists): {} -> {target}", self.source)
            }
            (kind, _) => write!(formatter, "SKIPPED ({}): {}", kind.as_str(), self.source),
        }
    }
}

/// Ordered record of one reorganization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Placement mode the run used.
    pub mode: PlacementMode,
    /// Outcomes in processing order.
    pub entries: Vec<ReportEntry>,
    /// Items passed over by the `.png` filter.
    pub ignored: usize,
}

impl RunReport {
    /// Empty report for a run in `mode`.
    #[must_use]
    pub const fn new(mode: PlacementMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            ignored: 0,
        }
    }

    /// Number of entries with the given outcome.
    #[must_use]
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    /// Entries with the given outcome, in order.
    pub fn entries_of(&self, kind: OutcomeKind) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Whether the run placed no items at all.
    #[must_use]
    pub fn is_empty_run(&self) -> bool {
        self.count(OutcomeKind::Renamed) == 0
    }

    pub(crate) fn push(&mut self, entry: ReportEntry, sink: &mut (impl DiagnosticSink + ?Sized)) {
        sink.record(&entry);
        self.entries.push(entry);
    }
}

/// Receives report entries as they are recorded.
pub trait DiagnosticSink {
    /// Observe one entry.
    fn record(&mut self, entry: &ReportEntry);
}

/// Emits every entry as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, entry: &ReportEntry) {
        let destination = entry.target.as_deref().unwrap_or_default();
        match entry.kind {
            OutcomeKind::Renamed => {
                info!(outcome = entry.kind.as_str(), source = %entry.source, destination, "item renamed");
            }
            OutcomeKind::SkippedUnparsable => {
                warn!(outcome = entry.kind.as_str(), source = %entry.source, "filename did not match render pattern");
            }
            OutcomeKind::SkippedDuplicate => {
                warn!(outcome = entry.kind.as_str(), source = %entry.source, destination, "destination already taken");
            }
        }
    }
}

impl DiagnosticSink for Vec<String> {
    fn record(&mut self, entry: &ReportEntry) {
        self.push(entry.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: OutcomeKind, target: Option<&str>) -> ReportEntry {
        ReportEntry {
            kind,
            source: "in/a.png".to_string(),
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn entries_render_as_log_lines() {
        assert_eq!(
            entry(OutcomeKind::Renamed, Some("G-1/x.png")).to_string(),
            "RENAMED: in/a.png -> G-1/x.png"
        );
        assert_eq!(
            entry(OutcomeKind::SkippedDuplicate, Some("G-1/x.png")).to_string(),
            "SKIPPED (exists): in/a.png -> G-1/x.png"
        );
        assert_eq!(
            entry(OutcomeKind::SkippedUnparsable, None).to_string(),
            "SKIPPED (skipped_unparsable): in/a.png"
        );
    }

    #[test]
    fn report_counts_and_sink_see_every_entry() {
        let mut report = RunReport::new(PlacementMode::Clean);
        let mut lines: Vec<String> = Vec::new();
        report.push(entry(OutcomeKind::Renamed, Some("G-1/x.png")), &mut lines);
        report.push(entry(OutcomeKind::SkippedUnparsable, None), &mut lines);
        report.push(entry(OutcomeKind::SkippedUnparsable, None), &mut lines);

        assert_eq!(report.count(OutcomeKind::Renamed), 1);
        assert_eq!(report.count(OutcomeKind::SkippedUnparsable), 2);
        assert_eq!(report.count(OutcomeKind::SkippedDuplicate), 0);
        assert_eq!(report.entries_of(OutcomeKind::SkippedUnparsable).count(), 2);
        assert_eq!(lines.len(), 3);
        assert!(!report.is_empty_run());
    }

    #[test]
    fn report_serializes_with_snake_case_kinds() -> anyhow::Result<()> {
        let mut report = RunReport::new(PlacementMode::InPlace);
        report.push(entry(OutcomeKind::SkippedUnparsable, None), &mut TracingSink);
        let value = serde_json::to_value(&report)?;
        assert_eq!(value["mode"], "in_place");
        assert_eq!(value["entries"][0]["kind"], "skipped_unparsable");
        assert!(value["entries"][0].get("target").is_none());
        assert_eq!(value["ignored"], 0);
        Ok(())
    }
}
