#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! Collection storage for the node classifier.
//!
//! Layout: `collection.rs` (collection identities), `document.rs` (YAML
//! rendering/parsing), `backend.rs` (persistence backends), `store.rs`
//! (`CollectionStore` snapshots and serialized writers).

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod store;

pub use backend::{CollectionBackend, YamlFileBackend};
pub use collection::{Collection, CollectionKind};
pub use document::{parse_collection, render_yaml};
pub use error::{DataError, Result as DataResult};
pub use store::CollectionStore;
