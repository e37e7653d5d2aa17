//! Service wiring: configuration, telemetry and the HTTP listener.

use std::net::SocketAddr;

use rendersort_api::ApiServer;
use rendersort_config::ServiceConfig;
use rendersort_telemetry::{
    GlobalContextGuard, LoggingConfig, Metrics, build_sha, log_format_from_config,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the service.
pub(crate) struct BootstrapDependencies {
    config: ServiceConfig,
    telemetry: Metrics,
    dotenv_loaded: bool,
}

impl BootstrapDependencies {
    /// Construct production dependencies from `.env` (when present) and the process environment.
    pub(crate) fn from_env() -> AppResult<Self> {
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        let config =
            ServiceConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            config,
            telemetry,
            dotenv_loaded,
        })
    }
}

/// Entry point for the service boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, telemetry or the HTTP listener fail.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        telemetry,
        dotenv_loaded,
    } = dependencies;

    rendersort_telemetry::init_logging(&logging_config(&config))
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new(config.placement_mode.as_str());

    info!(
        dotenv_loaded,
        placement_mode = %config.placement_mode,
        max_upload_bytes = config.max_upload_bytes,
        scratch_root = %config.scratch_root.display(),
        "rendersort bootstrap starting"
    );

    let addr = listen_addr(&config)?;
    let api = ApiServer::new(config, telemetry)
        .map_err(|err| AppError::api_server("api_server.new", err))?;

    info!(addr = %addr, "launching api listener");
    api.serve(addr, shutdown_signal())
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("api server shutdown complete");
    Ok(())
}

fn logging_config(config: &ServiceConfig) -> LoggingConfig<'_> {
    LoggingConfig {
        level: &config.log_level,
        format: log_format_from_config(config.log_format.as_deref()),
        build_sha: build_sha(),
    }
}

fn listen_addr(config: &ServiceConfig) -> AppResult<SocketAddr> {
    if config.http_port == 0 {
        return Err(AppError::InvalidConfig {
            field: "http_port",
            reason: "zero",
            value: Some(config.http_port.to_string()),
        });
    }
    Ok(config.socket_addr())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for sigterm");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c, starting graceful shutdown"),
        () = terminate => info!("received sigterm, starting graceful shutdown"),
    }
}
