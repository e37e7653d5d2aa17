#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

//! Filename mapping and batch reorganization for rendered AOV passes.
//!
//! Layout: `naming.rs` (filename parser and semantic code derivation),
//! `model.rs` (input/output items and placement modes), `report.rs` (run report
//! and diagnostic sinks), `reorganize.rs` (batch placement policy).

pub mod error;
pub mod model;
pub mod naming;
pub mod reorganize;
pub mod report;

pub use error::{CoreError, CoreResult};
pub use model::{OutputItem, PlacementMode, RawItem, TreeEntry, has_png_extension};
pub use naming::{AovMapper, Lighting, MappingResult, ParsedName, SEMANTIC_CODES};
pub use reorganize::{Reorganized, Reorganizer};
pub use report::{DiagnosticSink, OutcomeKind, ReportEntry, RunReport, TracingSink};
