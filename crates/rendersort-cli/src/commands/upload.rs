use std::path::{Path, PathBuf};

use anyhow::anyhow;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use rendersort_core::PlacementMode;
use rendersort_fsops::DirectorySource;
use serde::Serialize;

use crate::cli::{OutputFormat, UploadArgs};
use crate::client::{
    AppContext, CliError, CliResult, HEADER_RENAMED, HEADER_SKIPPED_DUPLICATE,
    HEADER_SKIPPED_UNPARSABLE, classify_problem,
};
use crate::commands::write_archive;
use crate::output::render_upload;

const FIELD_FILES: &str = "files";
const PROCESS_DIRECTORY_PATH: &str = "/process_directory";

/// What the service returned for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UploadSummary {
    pub(crate) files_sent: usize,
    pub(crate) archive: PathBuf,
    pub(crate) archive_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) renamed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skipped_unparsable: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skipped_duplicate: Option<usize>,
}

pub(crate) async fn handle_upload(
    ctx: &AppContext,
    args: UploadArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let summary = execute_upload(ctx, args).await?;
    render_upload(&summary, format)
}

pub(crate) async fn execute_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<UploadSummary> {
    let dir = args.dir.clone();
    let (form, files_sent) = tokio::task::spawn_blocking(move || build_form(&dir))
        .await
        .map_err(|err| CliError::failure(anyhow!("upload preparation failed: {err}")))??;

    let mut url = ctx
        .base_url
        .join(PROCESS_DIRECTORY_PATH)
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;
    if let Some(mode) = args.mode {
        url.query_pairs_mut()
            .append_pair("mode", PlacementMode::from(mode).as_str());
    }

    let response = ctx
        .client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|err| {
            CliError::failure(anyhow!("request to {PROCESS_DIRECTORY_PATH} failed: {err}"))
        })?;

    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }

    let headers = response.headers().clone();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to read archive response: {err}")))?;
    write_archive(&args.out, &bytes)?;

    Ok(UploadSummary {
        files_sent,
        archive: args.out,
        archive_bytes: bytes.len(),
        renamed: header_count(&headers, HEADER_RENAMED),
        skipped_unparsable: header_count(&headers, HEADER_SKIPPED_UNPARSABLE),
        skipped_duplicate: header_count(&headers, HEADER_SKIPPED_DUPLICATE),
    })
}

/// Every file under `dir`, named the way a browser folder picker names them.
fn build_form(dir: &Path) -> CliResult<(Form, usize)> {
    if !dir.is_dir() {
        return Err(CliError::validation(format!(
            "not a directory: {}",
            dir.display()
        )));
    }
    let listing = DirectorySource::scan(dir)?;
    if listing.is_empty() {
        return Err(CliError::validation(format!(
            "no files found under {}",
            dir.display()
        )));
    }

    let prefix = folder_name(dir);
    let mut form = Form::new();
    let mut count = 0;
    for item in listing.into_items() {
        let (name, bytes) = item?.into_parts();
        let file_name = prefix
            .as_deref()
            .map_or_else(|| name.clone(), |prefix| format!("{prefix}/{name}"));
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|err| CliError::failure(anyhow!("failed to build upload part: {err}")))?;
        form = form.part(FIELD_FILES, part);
        count += 1;
    }
    Ok((form, count))
}

fn folder_name(dir: &Path) -> Option<String> {
    dir.canonicalize()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn header_count(headers: &HeaderMap, name: &str) -> Option<usize> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
