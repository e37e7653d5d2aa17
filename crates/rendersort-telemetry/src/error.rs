//! # Design
//!
//! - Failures come from two places only: installing the global subscriber and the metrics registry.
//! - Collector faults name the metric and the registry stage that rejected it.

use std::string::FromUtf8Error;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Registry stage at which a collector was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// Building the collector from its options and label names.
    Build,
    /// Adding the collector to the registry.
    Register,
}

impl CollectorStage {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Register => "register",
        }
    }
}

/// Errors raised while installing logging or exposing metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed for this process.
    #[error("logging subscriber already installed")]
    LoggingInstall {
        /// Underlying subscriber error.
        source: TryInitError,
    },
    /// A metric collector could not be built or registered.
    #[error("metric collector rejected")]
    Collector {
        /// Metric name.
        name: &'static str,
        /// Stage that failed.
        stage: CollectorStage,
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// Gathered metric families could not be encoded in the text format.
    #[error("metrics exposition encoding failed")]
    ExpositionEncode {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The encoded exposition was not valid UTF-8.
    #[error("metrics exposition was not utf-8")]
    ExpositionUtf8 {
        /// Underlying conversion error.
        source: FromUtf8Error,
    },
}
