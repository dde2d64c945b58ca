//! Reserved names and defaults.

use crate::model::Role;

/// Name of the fallback group; it can never be deleted.
pub const DEFAULT_GROUP: &str = "default";

/// Role granted to new users created without any role.
pub const DEFAULT_ROLE: Role = Role::Viewer;
