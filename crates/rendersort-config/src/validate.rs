//! Field parsers for environment values.
//!
//! Every parser receives the variable name so failures point at the offending variable.

use std::net::IpAddr;
use std::path::PathBuf;

use rendersort_core::PlacementMode;

use crate::error::{ConfigError, ConfigResult};

/// Smallest accepted upload limit; anything lower cannot hold a single render.
pub const MIN_UPLOAD_BYTES: usize = 1024;

/// Parse a listener IP address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when `value` is not an IPv4 or IPv6 address.
pub fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid(field, "not_an_ip_address", value))
}

/// Parse a TCP port in `1..=65535`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric, zero or out-of-range values.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .parse::<u32>()
        .map_err(|_| ConfigError::invalid(field, "not_a_number", value))?;
    if !(1..=65_535).contains(&port) {
        return Err(ConfigError::invalid(field, "port_out_of_range", value));
    }
    u16::try_from(port).map_err(|_| ConfigError::invalid(field, "port_out_of_range", value))
}

/// Parse a placement mode name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for names other than `in_place` and `clean`.
pub fn parse_placement_mode(field: &'static str, value: &str) -> ConfigResult<PlacementMode> {
    value
        .parse::<PlacementMode>()
        .map_err(|_| ConfigError::invalid(field, "unknown_placement_mode", value))
}

/// Parse a request body limit in bytes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric values or limits below [`MIN_UPLOAD_BYTES`].
pub fn parse_upload_limit(field: &'static str, value: &str) -> ConfigResult<usize> {
    let limit = value
        .replace('_', "")
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, "not_a_number", value))?;
    if limit < MIN_UPLOAD_BYTES {
        return Err(ConfigError::invalid(field, "below_minimum", value));
    }
    Ok(limit)
}

/// Parse the scratch root; it must be an absolute path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for relative paths.
pub fn parse_scratch_root(field: &'static str, value: &str) -> ConfigResult<PathBuf> {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(ConfigError::invalid(field, "must_be_absolute", value))
    }
}

/// Accept a tracing filter directive, rejecting obviously malformed input.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the directive contains whitespace.
pub fn parse_log_level(field: &'static str, value: &str) -> ConfigResult<String> {
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(field, "contains_whitespace", value));
    }
    Ok(value.to_string())
}

/// Accept `json` or `pretty`, case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for any other format name.
pub fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<String> {
    let normalized = value.to_ascii_lowercase();
    match normalized.as_str() {
        "json" | "pretty" => Ok(normalized),
        _ => Err(ConfigError::invalid(field, "unknown_log_format", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(result: ConfigResult<impl std::fmt::Debug>) -> &'static str {
        match result {
            Err(ConfigError::InvalidField { reason, .. }) => reason,
            Ok(value) => panic!("expected failure, got {value:?}"),
        }
    }

    #[test]
    fn ports_must_be_in_range() {
        assert_eq!(parse_port("P", "5000").ok(), Some(5000));
        assert_eq!(parse_port("P", "65535").ok(), Some(65_535));
        assert_eq!(reason(parse_port("P", "0")), "port_out_of_range");
        assert_eq!(reason(parse_port("P", "70000")), "port_out_of_range");
        assert_eq!(reason(parse_port("P", "http")), "not_a_number");
    }

    #[test]
    fn bind_addresses_accept_v4_and_v6() {
        assert!(parse_bind_addr("A", "0.0.0.0").is_ok());
        assert!(parse_bind_addr("A", "::1").is_ok());
        assert_eq!(reason(parse_bind_addr("A", "localhost")), "not_an_ip_address");
    }

    #[test]
    fn placement_modes_parse() {
        assert_eq!(
            parse_placement_mode("M", "clean").ok(),
            Some(PlacementMode::Clean)
        );
        assert_eq!(
            parse_placement_mode("M", "in-place").ok(),
            Some(PlacementMode::InPlace)
        );
        assert_eq!(
            reason(parse_placement_mode("M", "merge")),
            "unknown_placement_mode"
        );
    }

    #[test]
    fn upload_limit_has_a_floor() {
        assert_eq!(parse_upload_limit("U", "1_048_576").ok(), Some(1_048_576));
        assert_eq!(reason(parse_upload_limit("U", "10")), "below_minimum");
        assert_eq!(reason(parse_upload_limit("U", "-1")), "not_a_number");
    }

    #[test]
    fn scratch_root_must_be_absolute() {
        assert!(parse_scratch_root("S", "/var/tmp/rendersort").is_ok());
        assert_eq!(reason(parse_scratch_root("S", "tmp")), "must_be_absolute");
    }

    #[test]
    fn log_settings_are_checked() {
        assert_eq!(
            parse_log_level("L", "rendersort_api=debug,info").ok().as_deref(),
            Some("rendersort_api=debug,info")
        );
        assert_eq!(reason(parse_log_level("L", "info debug")), "contains_whitespace");
        assert_eq!(parse_log_format("F", "JSON").ok().as_deref(), Some("json"));
        assert_eq!(reason(parse_log_format("F", "xml")), "unknown_log_format");
    }
}
