//! Typed service configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use rendersort_core::PlacementMode;
use serde::Serialize;

use crate::defaults::{DEFAULT_HTTP_PORT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_UPLOAD_BYTES};

/// Settings for one service process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// Listener IP address.
    pub bind_addr: IpAddr,
    /// Listener port.
    pub http_port: u16,
    /// Placement mode used when a request does not pick one.
    pub placement_mode: PlacementMode,
    /// Request body limit in bytes.
    pub max_upload_bytes: usize,
    /// Parent directory for per-request scratch space.
    pub scratch_root: PathBuf,
    /// Default tracing filter directive.
    pub log_level: String,
    /// Log output format; `None` lets telemetry infer one from the build profile.
    pub log_format: Option<String>,
}

impl ServiceConfig {
    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: DEFAULT_HTTP_PORT,
            placement_mode: PlacementMode::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scratch_root: std::env::temp_dir(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        }
    }
}
