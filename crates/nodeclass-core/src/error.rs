//! Error types for classifier operations.

use nodeclass_data::{CollectionKind, DataError};
use thiserror::Error;

/// Result alias for classifier operations.
pub type EncResult<T> = Result<T, EncError>;

/// Coarse classification used to map errors onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or violates a constraint.
    BadRequest,
    /// The principal lacks a required role.
    Forbidden,
    /// The named record does not exist.
    NotFound,
    /// The service failed to do its part.
    Internal,
}

/// Errors returned by the classifier.
#[derive(Debug, Error)]
pub enum EncError {
    /// A required request field was missing or empty.
    #[error("required field is missing")]
    MissingField {
        /// Field name.
        field: &'static str,
    },
    /// A request field carried a value that cannot be used.
    #[error("field value is invalid")]
    InvalidField {
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A YAML document field could not be decoded into a record.
    #[error("document is not a valid record")]
    InvalidDocument {
        /// Field carrying the document.
        field: &'static str,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A record with the same key already exists.
    #[error("record already exists")]
    AlreadyExists {
        /// Collection holding the record.
        collection: CollectionKind,
        /// Record key.
        key: String,
    },
    /// The operation is not permitted.
    #[error("operation is not permitted")]
    Forbidden {
        /// Operation name.
        operation: &'static str,
        /// Why access was denied.
        reason: &'static str,
    },
    /// The named record does not exist.
    #[error("record not found")]
    NotFound {
        /// Collection searched.
        collection: CollectionKind,
        /// Record key.
        key: String,
    },
    /// Persisting a collection failed.
    #[error("collection persistence failed")]
    Persistence {
        /// Underlying storage error.
        #[from]
        source: DataError,
    },
    /// Hashing a new password failed.
    #[error("failed to hash password")]
    PasswordHash {
        /// Hasher error detail.
        detail: String,
    },
    /// A stored password hash could not be parsed.
    #[error("stored password hash is invalid")]
    StoredHashInvalid {
        /// Parser error detail.
        detail: String,
    },
}

impl EncError {
    /// Transport-neutral classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::InvalidDocument { .. }
            | Self::AlreadyExists { .. } => ErrorKind::BadRequest,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Persistence { .. } | Self::PasswordHash { .. } | Self::StoredHashInvalid { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Human readable detail suitable for a client-facing message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::MissingField { field } => format!("field `{field}` is required"),
            Self::InvalidField {
                field,
                value,
                reason,
            } => format!("field `{field}` value `{value}` {reason}"),
            Self::InvalidDocument { field, source } => {
                format!("field `{field}` is not a valid record: {source}")
            }
            Self::AlreadyExists { collection, key } => {
                format!("{key} already exists in {collection}")
            }
            Self::Forbidden { operation, reason } => format!("{operation}: {reason}"),
            Self::NotFound { collection, key } => format!("{key} not found in {collection}"),
            Self::Persistence { source } => {
                format!("{} could not be persisted", source.collection())
            }
            Self::PasswordHash { .. } | Self::StoredHashInvalid { .. } => {
                "credential processing failed".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            EncError::MissingField { field: "data" }.kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            EncError::AlreadyExists {
                collection: CollectionKind::Users,
                key: "alice".into()
            }
            .kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            EncError::Forbidden {
                operation: "delete_group",
                reason: "the default group cannot be deleted"
            }
            .kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            EncError::NotFound {
                collection: CollectionKind::Hosts,
                key: "web".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        let persistence = EncError::from(DataError::Write {
            collection: CollectionKind::Groups,
            operation: "rename",
            path: PathBuf::from("groups.yaml"),
            source: io::Error::other("disk full"),
        });
        assert_eq!(persistence.kind(), ErrorKind::Internal);
        assert_eq!(persistence.detail(), "groups could not be persisted");
    }

    #[test]
    fn details_name_the_record() {
        let err = EncError::NotFound {
            collection: CollectionKind::Groups,
            key: "web".into(),
        };
        assert_eq!(err.to_string(), "record not found");
        assert_eq!(err.detail(), "web not found in groups");
    }
}
