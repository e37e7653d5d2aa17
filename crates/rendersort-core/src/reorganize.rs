//! Batch placement of mapped render passes.
//!
//! # Design
//! - Items are processed strictly in the order supplied; the first occurrence of a path wins.
//! - In-place runs treat every input path as occupied, so an existing file is never replaced.
//! - Per-item problems land in the report; only provider errors abort a run.

use std::collections::HashSet;
use std::convert::Infallible;

use crate::model::{OutputItem, PlacementMode, RawItem, TreeEntry, has_png_extension};
use crate::naming::{AovMapper, MappingResult};
use crate::report::{DiagnosticSink, OutcomeKind, ReportEntry, RunReport, TracingSink};

/// Applies a mapper to a batch of items under one placement mode.
#[derive(Debug, Clone, Copy)]
pub struct Reorganizer<'m> {
    mapper: &'m AovMapper,
    mode: PlacementMode,
}

/// Result of one reorganization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reorganized {
    /// Mapped items with their destination paths, in processing order.
    pub outputs: Vec<OutputItem>,
    /// Items left at their original paths. Always empty in clean mode.
    pub retained: Vec<RawItem>,
    /// Ordered outcome record.
    pub report: RunReport,
}

impl Reorganized {
    /// Final `(path, bytes)` set for the run, sorted by path.
    #[must_use]
    pub fn into_tree(self) -> Vec<TreeEntry> {
        let mut tree: Vec<TreeEntry> = self
            .retained
            .into_iter()
            .map(|item| {
                let (path, bytes) = item.into_parts();
                TreeEntry { path, bytes }
            })
            .chain(self.outputs.into_iter().map(|output| TreeEntry {
                path: output.relative_path,
                bytes: output.bytes,
            }))
            .collect();
        tree.sort_by(|left, right| left.path.cmp(&right.path));
        tree
    }
}

impl<'m> Reorganizer<'m> {
    /// Bind a mapper to a placement mode.
    #[must_use]
    pub const fn new(mapper: &'m AovMapper, mode: PlacementMode) -> Self {
        Self { mapper, mode }
    }

    /// Placement mode for this reorganizer.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Reorganize items, logging each outcome through [`TracingSink`].
    pub fn reorganize(&self, items: impl IntoIterator<Item = RawItem>) -> Reorganized {
        self.reorganize_with_sink(items, &mut TracingSink)
    }

    /// Reorganize items, forwarding each outcome to `sink`.
    pub fn reorganize_with_sink(
        &self,
        items: impl IntoIterator<Item = RawItem>,
        sink: &mut (impl DiagnosticSink + ?Sized),
    ) -> Reorganized {
        match self.try_reorganize_with_sink(items.into_iter().map(Ok::<_, Infallible>), sink) {
            Ok(reorganized) => reorganized,
            Err(never) => match never {},
        }
    }

    /// Reorganize items from a fallible provider.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `items`; no output is produced in that case.
    pub fn try_reorganize<E>(
        &self,
        items: impl IntoIterator<Item = Result<RawItem, E>>,
    ) -> Result<Reorganized, E> {
        self.try_reorganize_with_sink(items, &mut TracingSink)
    }

    /// Reorganize items from a fallible provider, forwarding each outcome to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `items`; the sink sees nothing in that case.
    pub fn try_reorganize_with_sink<E>(
        &self,
        items: impl IntoIterator<Item = Result<RawItem, E>>,
        sink: &mut (impl DiagnosticSink + ?Sized),
    ) -> Result<Reorganized, E> {
        let items = items.into_iter().collect::<Result<Vec<_>, E>>()?;
        Ok(self.run(items, sink))
    }

    fn run(&self, items: Vec<RawItem>, sink: &mut (impl DiagnosticSink + ?Sized)) -> Reorganized {
        let mut occupied: HashSet<String> = match self.mode {
            PlacementMode::InPlace => items.iter().map(|item| item.name().to_string()).collect(),
            PlacementMode::Clean => HashSet::new(),
        };
        let mut report = RunReport::new(self.mode);
        let mut outputs = Vec::new();
        let mut retained = Vec::new();

        for item in items {
            if !has_png_extension(item.file_name()) {
                report.ignored += 1;
                self.retain(item, &mut retained);
                continue;
            }

            let MappingResult::Mapped {
                output_name,
                group_id,
            } = self.mapper.map(item.file_name())
            else {
                report.push(
                    ReportEntry {
                        kind: OutcomeKind::SkippedUnparsable,
                        source: item.name().to_string(),
                        target: None,
                    },
                    sink,
                );
                self.retain(item, &mut retained);
                continue;
            };

            let relative_path = self.mode.place(&item, &group_id, &output_name);
            if !occupied.insert(relative_path.clone()) {
                report.push(
                    ReportEntry {
                        kind: OutcomeKind::SkippedDuplicate,
                        source: item.name().to_string(),
                        target: Some(relative_path),
                    },
                    sink,
                );
                self.retain(item, &mut retained);
                continue;
            }

            report.push(
                ReportEntry {
                    kind: OutcomeKind::Renamed,
                    source: item.name().to_string(),
                    target: Some(relative_path.clone()),
                },
                sink,
            );
            let (source_name, bytes) = item.into_parts();
            outputs.push(OutputItem {
                relative_path,
                source_name,
                bytes,
            });
        }

        Reorganized {
            outputs,
            retained,
            report,
        }
    }

    fn retain(&self, item: RawItem, retained: &mut Vec<RawItem>) {
        if self.mode == PlacementMode::InPlace {
            retained.push(item);
        }
    }
}
