use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use rendersort_config::defaults::{
    ENV_BIND_ADDR, ENV_HTTP_PORT, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MAX_UPLOAD_BYTES,
    ENV_PLACEMENT_MODE, ENV_SCRATCH_ROOT,
};
use rendersort_config::{ConfigError, ServiceConfig};
use rendersort_core::PlacementMode;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn defaults_describe_a_local_service() -> anyhow::Result<()> {
    let config = ServiceConfig::from_lookup(|_| None)?;
    assert_eq!(config.socket_addr(), SocketAddr::from(([127, 0, 0, 1], 5000)));
    assert_eq!(config.placement_mode, PlacementMode::InPlace);
    assert_eq!(config.max_upload_bytes, 536_870_912);
    assert_eq!(config.scratch_root, std::env::temp_dir());
    assert_eq!(config.log_level, "info");
    assert!(config.log_format.is_none());
    Ok(())
}

#[test]
fn every_variable_is_honoured() -> anyhow::Result<()> {
    let vars = env(&[
        (ENV_BIND_ADDR, "::"),
        (ENV_HTTP_PORT, "8080"),
        (ENV_PLACEMENT_MODE, "clean"),
        (ENV_MAX_UPLOAD_BYTES, "2048"),
        (ENV_SCRATCH_ROOT, "/srv/rendersort/scratch"),
        (ENV_LOG_LEVEL, "rendersort_api=debug"),
        (ENV_LOG_FORMAT, "Pretty"),
    ]);
    let config = ServiceConfig::from_lookup(|name| vars.get(name).cloned())?;

    assert_eq!(config.bind_addr, IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.placement_mode, PlacementMode::Clean);
    assert_eq!(config.max_upload_bytes, 2048);
    assert_eq!(config.scratch_root, PathBuf::from("/srv/rendersort/scratch"));
    assert_eq!(config.log_level, "rendersort_api=debug");
    assert_eq!(config.log_format.as_deref(), Some("pretty"));
    Ok(())
}

#[test]
fn invalid_values_name_the_variable() {
    let cases = [
        (ENV_BIND_ADDR, "not-an-ip", "not_an_ip_address"),
        (ENV_HTTP_PORT, "0", "port_out_of_range"),
        (ENV_PLACEMENT_MODE, "scatter", "unknown_placement_mode"),
        (ENV_MAX_UPLOAD_BYTES, "lots", "not_a_number"),
        (ENV_SCRATCH_ROOT, "relative/dir", "must_be_absolute"),
        (ENV_LOG_FORMAT, "yaml", "unknown_log_format"),
    ];
    for (variable, value, expected_reason) in cases {
        let vars = env(&[(variable, value)]);
        match ServiceConfig::from_lookup(|name| vars.get(name).cloned()) {
            Err(ConfigError::InvalidField {
                field,
                reason,
                value: offending,
            }) => {
                assert_eq!(field, variable);
                assert_eq!(reason, expected_reason);
                assert_eq!(offending.as_deref(), Some(value));
            }
            Ok(config) => panic!("{variable}={value} should fail, got {config:?}"),
        }
    }
}

#[test]
fn config_serializes_for_diagnostics() -> anyhow::Result<()> {
    let config = ServiceConfig::default();
    let value = serde_json::to_value(&config)?;
    assert_eq!(value["placement_mode"], "in_place");
    assert_eq!(value["http_port"], 5000);
    Ok(())
}
