#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (sample documents and data directories), memory.rs
//! (in-memory collection backend with failure injection).

pub mod fixtures;
pub mod memory;

pub use memory::MemoryBackend;
