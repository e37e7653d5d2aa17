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

//! Environment-driven configuration for the rendersort service.
//!
//! Layout: `defaults.rs` (variable names and default values), `model.rs`
//! (`ServiceConfig`), `validate.rs` (field parsers), `loader.rs` (lookup-based
//! loading), `error.rs` (error types).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::ServiceConfig;
