#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! Node classification engine.
//!
//! Layout: `model.rs` (hosts, groups, users and parameter values),
//! `directive.rs` (add/remove update directives), `patch.rs` (directive
//! application), `resolve.rs` (fqdn to effective configuration), `policy.rs`
//! (per-operation role requirements), `password.rs` (credential hashing),
//! `service.rs` (`Classifier` facade over the three collections).

pub mod defaults;
pub mod directive;
pub mod error;
pub mod model;
pub mod password;
pub mod patch;
pub mod policy;
pub mod resolve;
pub mod service;

pub use defaults::{DEFAULT_GROUP, DEFAULT_ROLE};
pub use directive::{Directive, Directives};
pub use error::{EncError, EncResult, ErrorKind};
pub use model::{
    ClassMap, EffectiveConfig, Group, Host, ParamMap, ParamValue, Role, User, UserView,
};
pub use password::{hash_password, verify_password};
pub use patch::{PatchTarget, apply_directives, apply_role_directives};
pub use policy::{AccessPolicy, Operation, Principal, Requirement};
pub use resolve::{Resolution, ResolutionSource, Resolver};
pub use service::Classifier;
