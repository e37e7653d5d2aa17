#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! HTTP surface for rendersort: the upload form, directory and archive
//! processing endpoints, health and metrics.
//!
//! Layout: `http/` (router, handlers, middleware), `models` (wire types from
//! `rendersort-api-models`), `state.rs` (shared handler state), `error.rs` (server errors).

pub mod error;
pub mod http;
pub(crate) mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use rendersort_api_models as models;
pub use http::router::ApiServer;
