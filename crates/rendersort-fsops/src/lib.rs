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

//! Filesystem and archive collaborators for the reorganization core.
//!
//! Layout: `paths.rs` (relative path sanitising), `source.rs` (directory and zip
//! providers), `sink.rs` (directory and zip consumers), `scratch.rs` (per-run
//! scratch space), `job.rs` (step pipeline), `error.rs` (error types).

pub mod error;
pub mod job;
pub mod paths;
pub mod scratch;
pub mod sink;
pub mod source;

pub use error::{FsOpsError, FsOpsResult};
pub use job::{
    JobOutcome, JobRequest, JobSource, Materialize, ReorganizeJob, StepKind, StepRecord,
    StepStatus,
};
pub use paths::sanitize_relative_path;
pub use scratch::ScratchSpace;
pub use sink::{ARCHIVE_FILE_NAME, DirectorySink, ZipSink};
pub use source::{DirectorySource, ZipSource};
