//! Sample collection documents and temporary data directories.

use std::fs;

use anyhow::{Context, Result};
use nodeclass_data::CollectionKind;
use tempfile::TempDir;

/// Hosts document with one pinned host and one list-valued parameter.
pub const HOSTS_DOCUMENT: &str = "\
web01.example.com:
  environment: production
  classes:
    nginx:
  parameters:
    tags:
    - a
    - b
    tier: web
";

/// Groups declared as `corp`, `web`, `default`.
pub const GROUPS_DOCUMENT: &str = "\
corp:
  hosts:
  - db
  environment: corp
  classes:
    postgres:
  parameters: {}
web:
  hosts:
  - www
  environment: web
  classes:
    nginx:
  parameters: {}
default:
  hosts: []
  environment: production
  classes:
    base:
  parameters: {}
";

/// Render a users document from `(username, password_hash, roles)` entries.
#[must_use]
pub fn users_document(entries: &[(&str, &str, &[&str])]) -> String {
    entries.iter().fold(String::new(), |mut out, (name, hash, roles)| {
        out.push_str(name);
        out.push_str(":\n  password: '");
        out.push_str(hash);
        out.push_str("'\n  roles:\n");
        for role in *roles {
            out.push_str("  - ");
            out.push_str(role);
            out.push('\n');
        }
        out
    })
}

/// Create a temporary data directory holding the given collection documents.
///
/// # Errors
///
/// Returns an error if the directory or a document cannot be written.
pub fn data_dir_with(documents: &[(CollectionKind, &str)]) -> Result<TempDir> {
    let dir = tempfile::tempdir().context("failed to create temporary data directory")?;
    for (kind, document) in documents {
        let path = dir.path().join(kind.file_name());
        fs::write(&path, document)
            .with_context(|| format!("failed to seed {}", path.display()))?;
    }
    Ok(dir)
}
