//! Error types for collection storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::collection::CollectionKind;

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors raised while loading or persisting a collection.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading the collection document failed.
    #[error("failed to read collection document")]
    Read {
        /// Collection being loaded.
        collection: CollectionKind,
        /// Document path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The collection document could not be decoded.
    #[error("collection document is malformed")]
    Decode {
        /// Collection being loaded.
        collection: CollectionKind,
        /// Document path.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// Encoding the collection into a document failed.
    #[error("failed to encode collection document")]
    Encode {
        /// Collection being persisted.
        collection: CollectionKind,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// Writing the collection document failed.
    #[error("failed to write collection document")]
    Write {
        /// Collection being persisted.
        collection: CollectionKind,
        /// Step that failed (`create_dir`, `create`, `write`, `sync`, `rename`).
        operation: &'static str,
        /// Path involved in the failing step.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl DataError {
    /// Collection the failure relates to.
    #[must_use]
    pub const fn collection(&self) -> CollectionKind {
        match self {
            Self::Read { collection, .. }
            | Self::Decode { collection, .. }
            | Self::Encode { collection, .. }
            | Self::Write { collection, .. } => *collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn data_error_display_and_source() {
        let write = DataError::Write {
            collection: CollectionKind::Groups,
            operation: "rename",
            path: PathBuf::from("data/groups.yaml"),
            source: io::Error::other("disk full"),
        };
        assert_eq!(write.to_string(), "failed to write collection document");
        assert_eq!(write.collection(), CollectionKind::Groups);
        assert!(write.source().is_some());

        let Err(yaml_error) = serde_yaml::from_str::<Vec<String>>("{") else {
            panic!("expected malformed yaml");
        };
        let decode = DataError::Decode {
            collection: CollectionKind::Hosts,
            path: PathBuf::from("data/hosts.yaml"),
            source: yaml_error,
        };
        assert_eq!(decode.to_string(), "collection document is malformed");
        assert_eq!(decode.collection(), CollectionKind::Hosts);
    }
}
