//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    http::{Method, Request, header::CONTENT_TYPE},
    routing::{get, post},
};
use rendersort_config::ServiceConfig;
use rendersort_core::AovMapper;
use rendersort_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::form::upload_form;
use crate::http::health::{health, metrics};
use crate::http::process::{process_archive, process_directory};
use crate::http::telemetry::observe_request;
use crate::state::ApiState;

/// Axum router wrapper that hosts the rendersort HTTP surface.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server with shared dependencies wired through application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the filename mapper cannot be prepared.
    pub fn new(config: ServiceConfig, telemetry: Metrics) -> ApiServerResult<Self> {
        let mapper = AovMapper::new().map_err(|source| ApiServerError::Mapper { source })?;
        let body_limit = config.max_upload_bytes;
        let state = Arc::new(ApiState::new(config, telemetry.clone(), mapper));

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        // The id must exist before propagation reads it back onto the response.
        let layered = ServiceBuilder::new()
            .layer(rendersort_telemetry::set_request_id_layer())
            .layer(rendersort_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(telemetry, observe_request));

        let router = Self::build_router()
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Ok(Self { router })
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/", get(upload_form))
            .route("/process_directory", post(process_directory))
            .route("/process_archive", post(process_archive))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    /// Router with every layer applied, for embedding or in-process testing.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve the API on `addr` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "starting api");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })?;
        info!("api stopped");
        Ok(())
    }
}
