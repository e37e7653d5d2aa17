//! Shared HTTP constants (headers, problem URIs, form fields).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const HEADER_RENAMED: &str = "x-rendersort-renamed";
pub(crate) const HEADER_SKIPPED_UNPARSABLE: &str = "x-rendersort-skipped-unparsable";
pub(crate) const HEADER_SKIPPED_DUPLICATE: &str = "x-rendersort-skipped-duplicate";

pub(crate) const PROBLEM_INTERNAL: &str = "https://rendersort.dev/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://rendersort.dev/problems/bad-request";
pub(crate) const PROBLEM_PAYLOAD_TOO_LARGE: &str =
    "https://rendersort.dev/problems/payload-too-large";
pub(crate) const PROBLEM_CONFLICT: &str = "https://rendersort.dev/problems/conflict";

pub(crate) const FIELD_FILES: &str = "files";
pub(crate) const FIELD_ARCHIVE: &str = "archive";

pub(crate) const CONTENT_TYPE_ZIP: &str = "application/zip";
pub(crate) const CONTENT_TYPE_PROBLEM: &str = "application/problem+json";
pub(crate) const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4";
pub(crate) const CONTENT_DISPOSITION_ARCHIVE: &str = "attachment; filename=\"processed.zip\"";

pub(crate) const REPORT_JSON: &str = "json";
pub(crate) const REPORT_ARCHIVE: &str = "zip";
