#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! HTTP surface of the node classifier.
//!
//! Layout: `error.rs` (server bootstrap errors), `state.rs` (shared handler
//! state), `http/` (router, authentication middleware, YAML responses and the
//! host, group and user handlers).

pub mod error;
pub mod http;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
