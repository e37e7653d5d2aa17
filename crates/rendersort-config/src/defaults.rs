//! Environment variable names and default values.
//!
//! # Design
//! - Every variable shares the `RENDERSORT_` prefix.
//! - Defaults match a local single-user deployment.

/// Listener IP address.
pub const ENV_BIND_ADDR: &str = "RENDERSORT_BIND_ADDR";
/// Listener port.
pub const ENV_HTTP_PORT: &str = "RENDERSORT_HTTP_PORT";
/// Default placement mode for uploads.
pub const ENV_PLACEMENT_MODE: &str = "RENDERSORT_PLACEMENT_MODE";
/// Request body limit in bytes.
pub const ENV_MAX_UPLOAD_BYTES: &str = "RENDERSORT_MAX_UPLOAD_BYTES";
/// Parent directory for per-request scratch space.
pub const ENV_SCRATCH_ROOT: &str = "RENDERSORT_SCRATCH_ROOT";
/// Default tracing filter directive.
pub const ENV_LOG_LEVEL: &str = "RENDERSORT_LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "RENDERSORT_LOG_FORMAT";

pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub(crate) const DEFAULT_HTTP_PORT: u16 = 5000;
pub(crate) const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
