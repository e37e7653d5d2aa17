//! Lookup-based configuration loading.
//!
//! # Design
//! - Loading takes a lookup closure so tests never touch the process environment.
//! - Unset and blank variables fall back to defaults; set variables must validate.

use tracing::debug;

use crate::defaults::{
    DEFAULT_BIND_ADDR, ENV_BIND_ADDR, ENV_HTTP_PORT, ENV_LOG_FORMAT, ENV_LOG_LEVEL,
    ENV_MAX_UPLOAD_BYTES, ENV_PLACEMENT_MODE, ENV_SCRATCH_ROOT,
};
use crate::error::ConfigResult;
use crate::model::ServiceConfig;
use crate::validate::{
    parse_bind_addr, parse_log_format, parse_log_level, parse_placement_mode, parse_port,
    parse_scratch_root, parse_upload_limit,
};

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] for the first variable that fails validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let bind_addr = parse_bind_addr(
            ENV_BIND_ADDR,
            read(ENV_BIND_ADDR).as_deref().unwrap_or(DEFAULT_BIND_ADDR),
        )?;
        let http_port = read(ENV_HTTP_PORT)
            .map(|value| parse_port(ENV_HTTP_PORT, &value))
            .transpose()?
            .unwrap_or(defaults.http_port);
        let placement_mode = read(ENV_PLACEMENT_MODE)
            .map(|value| parse_placement_mode(ENV_PLACEMENT_MODE, &value))
            .transpose()?
            .unwrap_or(defaults.placement_mode);
        let max_upload_bytes = read(ENV_MAX_UPLOAD_BYTES)
            .map(|value| parse_upload_limit(ENV_MAX_UPLOAD_BYTES, &value))
            .transpose()?
            .unwrap_or(defaults.max_upload_bytes);
        let scratch_root = read(ENV_SCRATCH_ROOT)
            .map(|value| parse_scratch_root(ENV_SCRATCH_ROOT, &value))
            .transpose()?
            .unwrap_or(defaults.scratch_root);
        let log_level = read(ENV_LOG_LEVEL)
            .map(|value| parse_log_level(ENV_LOG_LEVEL, &value))
            .transpose()?
            .unwrap_or(defaults.log_level);
        let log_format = read(ENV_LOG_FORMAT)
            .map(|value| parse_log_format(ENV_LOG_FORMAT, &value))
            .transpose()?;

        let config = Self {
            bind_addr,
            http_port,
            placement_mode,
            max_upload_bytes,
            scratch_root,
            log_level,
            log_format,
        };
        debug!(
            bind = %config.socket_addr(),
            placement_mode = %config.placement_mode,
            max_upload_bytes = config.max_upload_bytes,
            "service configuration loaded"
        );
        Ok(config)
    }
}
