//! Directory and archive processing handlers.
//!
//! # Design
//! - Uploads are buffered, then the whole job runs on the blocking pool inside a per-request scratch space.
//! - Outcome counters travel as response headers for both archive and JSON responses.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use rendersort_core::PlacementMode;
use rendersort_fsops::{
    FsOpsResult, JobOutcome, JobRequest, JobSource, Materialize, ReorganizeJob, ScratchSpace,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::http::constants::{
    CONTENT_DISPOSITION_ARCHIVE, CONTENT_TYPE_ZIP, FIELD_ARCHIVE, FIELD_FILES, HEADER_RENAMED,
    HEADER_SKIPPED_DUPLICATE, HEADER_SKIPPED_UNPARSABLE, REPORT_ARCHIVE, REPORT_JSON,
};
use crate::http::errors::ApiError;
use crate::models::{OutcomeCounts, ProcessReport};
use crate::state::ApiState;

const UPLOAD_TOO_LARGE: &str = "upload exceeds the configured size limit";

/// Query options shared by both processing routes.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessQuery {
    mode: Option<String>,
    report: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Archive,
    Json,
}

#[derive(Debug, Clone, Copy)]
struct ProcessOptions {
    mode: PlacementMode,
    format: ReportFormat,
}

impl ProcessQuery {
    fn resolve(&self, default_mode: PlacementMode) -> Result<ProcessOptions, ApiError> {
        let mode = match self.mode.as_deref() {
            None | Some("") => default_mode,
            Some(value) => value
                .parse()
                .map_err(|_| ApiError::bad_request(format!("unknown placement mode: {value}")))?,
        };
        let format = match self.report.as_deref() {
            None | Some("" | REPORT_ARCHIVE) => ReportFormat::Archive,
            Some(REPORT_JSON) => ReportFormat::Json,
            Some(value) => {
                return Err(ApiError::bad_request(format!(
                    "unknown report format: {value}"
                )));
            }
        };
        Ok(ProcessOptions { mode, format })
    }
}

pub(crate) async fn process_directory(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ProcessQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let options = query.resolve(state.config.placement_mode)?;
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut uploads: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FIELD_FILES) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        if name.is_empty() {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        uploads.push((name, bytes.to_vec()));
    }
    if uploads.is_empty() {
        return Err(ApiError::bad_request("no files uploaded"));
    }
    info!(files = uploads.len(), mode = %options.mode, "directory upload received");

    let mode = options.mode;
    let package = options.format == ReportFormat::Archive;
    let outcome = run_job(&state, move |scratch| {
        for (name, bytes) in &uploads {
            scratch.stage_input(name, bytes)?;
        }
        let materialize = match mode {
            PlacementMode::InPlace => Materialize::InPlace,
            PlacementMode::Clean => Materialize::Skip,
        };
        Ok(JobRequest {
            source: JobSource::Directory(scratch.input_dir()),
            mode,
            materialize,
            package,
        })
    })
    .await?;

    respond(outcome, options)
}

pub(crate) async fn process_archive(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ProcessQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let options = query.resolve(state.config.placement_mode)?;
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut archive: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FIELD_ARCHIVE) {
            continue;
        }
        if archive.is_some() {
            return Err(ApiError::bad_request("only one archive may be uploaded"));
        }
        archive = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
    }
    let archive = archive.ok_or_else(|| ApiError::bad_request("no archive uploaded"))?;
    info!(bytes = archive.len(), mode = %options.mode, "archive upload received");

    let mode = options.mode;
    let package = options.format == ReportFormat::Archive;
    let outcome = run_job(&state, move |_scratch| {
        Ok(JobRequest {
            source: JobSource::Archive(archive),
            mode,
            materialize: Materialize::Skip,
            package,
        })
    })
    .await?;

    respond(outcome, options)
}

async fn run_job<F>(state: &Arc<ApiState>, build: F) -> Result<JobOutcome, ApiError>
where
    F: FnOnce(&ScratchSpace) -> FsOpsResult<JobRequest> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let scratch = ScratchSpace::create_in(&state.config.scratch_root)?;
        let request = build(&scratch)?;
        ReorganizeJob::new(&state.mapper, state.telemetry.clone()).run(request)
    })
    .await
    .map_err(|err| {
        error!(error = %err, "processing task did not complete");
        ApiError::internal("processing task did not complete")
    })?
    .map_err(ApiError::from)
}

fn respond(outcome: JobOutcome, options: ProcessOptions) -> Result<Response, ApiError> {
    let counts = OutcomeCounts::from(&outcome.report);
    info!(
        job_id = %outcome.job_id,
        renamed = counts.renamed,
        skipped_unparsable = counts.skipped_unparsable,
        skipped_duplicate = counts.skipped_duplicate,
        "processing complete"
    );

    let mut response = match options.format {
        ReportFormat::Json => Json(ProcessReport {
            job_id: outcome.job_id,
            mode: options.mode,
            counts,
            report: outcome.report,
            steps: outcome.steps,
        })
        .into_response(),
        ReportFormat::Archive => {
            let archive = outcome
                .archive
                .ok_or_else(|| ApiError::internal("archive was not produced"))?;
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_ZIP)),
                    (
                        CONTENT_DISPOSITION,
                        HeaderValue::from_static(CONTENT_DISPOSITION_ARCHIVE),
                    ),
                ],
                archive,
            )
                .into_response()
        }
    };
    insert_count_headers(response.headers_mut(), counts);
    Ok(response)
}

fn insert_count_headers(headers: &mut HeaderMap, counts: OutcomeCounts) {
    for (name, value) in [
        (HEADER_RENAMED, counts.renamed),
        (HEADER_SKIPPED_UNPARSABLE, counts.skipped_unparsable),
        (HEADER_SKIPPED_DUPLICATE, counts.skipped_duplicate),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(UPLOAD_TOO_LARGE)
    } else {
        ApiError::bad_request(err.body_text())
    }
}
