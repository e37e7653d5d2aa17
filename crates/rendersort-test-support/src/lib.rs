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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (sample render names and temp trees), archive.rs (in-memory zip
//! helpers), multipart.rs (request body builder), assert.rs (tree assertions).

pub mod archive;
pub mod assert;
pub mod fixtures;
pub mod multipart;
