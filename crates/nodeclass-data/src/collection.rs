//! Collection identities and the ordered map type shared by every store.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

/// Ordered mapping of record key to record; iteration follows insertion order.
pub type Collection<V> = IndexMap<String, V>;

/// The three collections the classifier persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Host records keyed by fqdn.
    Hosts,
    /// Group records keyed by group name.
    Groups,
    /// User accounts keyed by username.
    Users,
}

impl CollectionKind {
    /// Every collection, in load order.
    pub const ALL: [Self; 3] = [Self::Hosts, Self::Groups, Self::Users];

    /// Stable lowercase identifier used in logs, metrics and file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hosts => "hosts",
            Self::Groups => "groups",
            Self::Users => "users",
        }
    }

    /// Name of the document that persists this collection.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Hosts => "hosts.yaml",
            Self::Groups => "groups.yaml",
            Self::Users => "users.yaml",
        }
    }
}

impl Display for CollectionKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
