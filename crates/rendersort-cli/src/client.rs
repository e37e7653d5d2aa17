//! Shared client utilities and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use rendersort_fsops::FsOpsError;

use crate::cli::Cli;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_RENAMED: &str = "x-rendersort-renamed";
pub(crate) const HEADER_SKIPPED_UNPARSABLE: &str = "x-rendersort-skipped-unparsable";
pub(crate) const HEADER_SKIPPED_DUPLICATE: &str = "x-rendersort-skipped-duplicate";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<FsOpsError> for CliError {
    fn from(error: FsOpsError) -> Self {
        if error.is_client_error() || matches!(error, FsOpsError::DestinationExists { .. }) {
            Self::Validation(describe_fsops(&error))
        } else {
            Self::Failure(anyhow::Error::new(error))
        }
    }
}

fn describe_fsops(error: &FsOpsError) -> String {
    match error {
        FsOpsError::InvalidInput {
            field,
            reason,
            value: Some(value),
        } => format!("{field}: {reason} ({value})"),
        FsOpsError::InvalidInput { field, reason, .. } => format!("{field}: {reason}"),
        FsOpsError::DestinationExists { path } => {
            format!("destination already exists: {}", path.display())
        }
        FsOpsError::Unsupported {
            operation,
            value: Some(value),
        } => format!("unsupported {operation}: {value}"),
        FsOpsError::Unsupported { operation, .. } => format!("unsupported {operation}"),
        other => format!("{other:#}"),
    }
}

/// Dependencies constructed from environment flags and CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
}

impl CliDependencies {
    /// Construct a configured HTTP client tagged with the invocation trace id.
    pub(crate) fn from_env(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }
}

/// Application context passed to command handlers that talk to the service.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).to_string();
    let problem = serde_json::from_slice::<rendersort_api_models::ProblemDetails>(&bytes).ok();

    let message = problem
        .as_ref()
        .and_then(|p| p.detail.clone())
        .unwrap_or_else(|| {
            problem
                .as_ref()
                .map_or_else(|| body_text.trim().to_string(), |p| p.title.clone())
        });

    if matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::CONFLICT
            | StatusCode::PAYLOAD_TOO_LARGE
            | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        CliError::validation(message)
    } else {
        let detail = if let Some(problem) = problem {
            format!("{} (status {})", message, problem.status)
        } else if !body_text.is_empty() {
            format!("{message} (status {status})")
        } else {
            format!("request failed with status {status}")
        };
        CliError::failure(anyhow!(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_split_validation_from_failure() {
        let validation = CliError::validation("bad flag");
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.display_message(), "bad flag");
        assert_eq!(validation.to_string(), "cli error");

        let failure = CliError::failure(anyhow!("disk on fire"));
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "disk on fire");
    }

    #[test]
    fn fsops_client_errors_become_validation() {
        let missing = CliError::from(FsOpsError::InvalidInput {
            field: "root",
            reason: "not_a_directory",
            value: Some("/nowhere".to_string()),
        });
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(missing.display_message(), "root: not_a_directory (/nowhere)");

        let exists = CliError::from(FsOpsError::DestinationExists {
            path: PathBuf::from("out/G-1/x.png"),
        });
        assert_eq!(exists.exit_code(), 2);

        let io = CliError::from(FsOpsError::Io {
            operation: "sink.write",
            path: PathBuf::from("out"),
            source: std::io::Error::other("boom"),
        });
        assert_eq!(io.exit_code(), 3);
        assert!(io.display_message().contains("fsops io failure"));
    }

    #[test]
    fn parse_url_reports_bad_input() {
        assert!(parse_url("http://127.0.0.1:5000").is_ok());
        let Err(message) = parse_url("not a url") else {
            panic!("expected parse failure");
        };
        assert!(message.starts_with("invalid URL 'not a url'"));
    }
}
