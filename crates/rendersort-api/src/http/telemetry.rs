//! Request observation middleware: per-route counters and processing outcomes.

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::Response;
use rendersort_telemetry::{Metrics, with_request_context};
use tracing::debug;

use crate::http::constants::{CONTENT_TYPE_ZIP, HEADER_REQUEST_ID};

const PROCESS_ROUTE_PREFIX: &str = "/process_";
const UNMATCHED_ROUTE: &str = "unmatched";

/// What a processing route answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessOutcome {
    Archive,
    Report,
    Rejected,
    Failed,
}

impl ProcessOutcome {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Report => "report",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    pub(crate) fn classify(status: StatusCode, headers: &HeaderMap) -> Self {
        if status.is_server_error() {
            Self::Failed
        } else if !status.is_success() {
            Self::Rejected
        } else if headers
            .get(CONTENT_TYPE)
            .is_some_and(|value| value.as_bytes() == CONTENT_TYPE_ZIP.as_bytes())
        {
            Self::Archive
        } else {
            Self::Report
        }
    }
}

/// Counts every routed request by matched path and status, and every
/// processing request by outcome. Runs the handler inside the request context.
pub(crate) async fn observe_request(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_owned();
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let response = with_request_context(request_id, route.clone(), next.run(request)).await;

    let status = response.status();
    metrics.inc_http_request(&route, status.as_u16());
    if route.starts_with(PROCESS_ROUTE_PREFIX) {
        let outcome = ProcessOutcome::classify(status, response.headers());
        debug!(%route, outcome = outcome.as_str(), status = status.as_u16(), "processing request observed");
        metrics.inc_process_request(&route, outcome.as_str());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn outcomes_follow_status_then_content_type() {
        let zip = headers(CONTENT_TYPE_ZIP);
        let json = headers("application/json");
        assert_eq!(
            ProcessOutcome::classify(StatusCode::OK, &zip),
            ProcessOutcome::Archive
        );
        assert_eq!(
            ProcessOutcome::classify(StatusCode::OK, &json),
            ProcessOutcome::Report
        );
        assert_eq!(
            ProcessOutcome::classify(StatusCode::PAYLOAD_TOO_LARGE, &json),
            ProcessOutcome::Rejected
        );
        assert_eq!(
            ProcessOutcome::classify(StatusCode::INTERNAL_SERVER_ERROR, &zip),
            ProcessOutcome::Failed
        );
        assert_eq!(ProcessOutcome::Rejected.as_str(), "rejected");
    }
}
