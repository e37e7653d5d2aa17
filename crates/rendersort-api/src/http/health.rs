//! Health and metrics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use rendersort_core::PlacementMode;
use rendersort_telemetry::build_sha;
use serde::Serialize;
use tracing::error;

use crate::http::constants::CONTENT_TYPE_METRICS;
use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: &'static str,
    pub(crate) mode: PlacementMode,
    pub(crate) metrics: HealthMetricsResponse,
}

#[derive(Serialize)]
pub(crate) struct HealthMetricsResponse {
    pub(crate) reorganize_runs_total: u64,
    pub(crate) items_renamed_total: u64,
    pub(crate) items_skipped_total: u64,
}

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let snapshot = state.telemetry.snapshot();
    Json(HealthResponse {
        status: "ok",
        build: build_sha(),
        mode: state.config.placement_mode,
        metrics: HealthMetricsResponse {
            reorganize_runs_total: snapshot.reorganize_runs_total,
            items_renamed_total: snapshot.items_renamed_total,
            items_skipped_total: snapshot.items_skipped_total,
        },
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(axum::http::header::CONTENT_TYPE, CONTENT_TYPE_METRICS)
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
