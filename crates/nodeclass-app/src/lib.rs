#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Node classifier application bootstrap wiring.
//!
//! Layout: `config.rs` (environment settings), `bootstrap.rs` (service wiring
//! and shutdown), `error.rs` (application errors).

/// Application bootstrap and shutdown.
pub mod bootstrap;
/// Environment-driven settings.
pub mod config;
/// Application error types.
pub mod error;

pub use bootstrap::{run_app, run_app_with};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
