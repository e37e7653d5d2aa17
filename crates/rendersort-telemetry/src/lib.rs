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

//! Telemetry primitives shared across the rendersort workspace.
//!
//! This crate centralises logging, metrics, and request-context helpers so the
//! HTTP service and the CLI adopt a consistent observability story.
//! Layout: `init.rs` (subscriber setup), `context.rs` (spans, request context
//! and request-id middleware), `metrics.rs` (Prometheus registry), `error.rs`
//! (error types).

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{
    GlobalContextGuard, REQUEST_ID_HEADER, current_request_id, current_route,
    propagate_request_id_layer, record_app_mode, set_request_id_layer, with_request_context,
};
pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_config,
};
pub use metrics::{Metrics, MetricsSnapshot};
