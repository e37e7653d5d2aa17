//! HTTP surface modules (router, handlers, middleware).

/// Shared constants and header names.
pub mod constants;
/// Problem response helpers and error types.
pub mod errors;
/// Upload form served at the root.
pub mod form;
/// Health and metrics endpoints.
pub mod health;
/// Directory and archive processing handlers.
pub mod process;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
