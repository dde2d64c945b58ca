//! Resolution of an fqdn to its effective configuration.

use std::fmt::{self, Display, Formatter};

use nodeclass_data::Collection;

use crate::defaults::DEFAULT_GROUP;
use crate::model::{EffectiveConfig, Group, Host};

/// Record that supplied a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Exact host record.
    Host,
    /// First named group whose host prefixes matched.
    Group(String),
    /// The fallback group.
    Default,
}

impl ResolutionSource {
    /// Metric label for the source kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Group(_) => "group",
            Self::Default => "default",
        }
    }
}

impl Display for ResolutionSource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(name) => write!(formatter, "group:{name}"),
            other => formatter.write_str(other.label()),
        }
    }
}

/// Effective configuration and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Matching record.
    pub source: ResolutionSource,
    /// Configuration to hand to the agent.
    pub config: EffectiveConfig,
}

/// Resolves fqdns against consistent snapshots of the host and group
/// collections.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    hosts: &'a Collection<Host>,
    groups: &'a Collection<Group>,
}

impl<'a> Resolver<'a> {
    /// Build a resolver over committed snapshots.
    #[must_use]
    pub const fn new(hosts: &'a Collection<Host>, groups: &'a Collection<Group>) -> Self {
        Self { hosts, groups }
    }

    /// Effective configuration for `fqdn`.
    ///
    /// An exact host record wins. Otherwise the first group in declaration
    /// order (skipping the fallback group) with a prefix of `fqdn` applies,
    /// then the fallback group, then nothing.
    #[must_use]
    pub fn resolve(&self, fqdn: &str) -> Option<Resolution> {
        if let Some(host) = self.hosts.get(fqdn) {
            return Some(Resolution {
                source: ResolutionSource::Host,
                config: host.clone(),
            });
        }

        let matched = self
            .groups
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_GROUP)
            .find(|(_, group)| group.matches(fqdn));
        if let Some((name, group)) = matched {
            return Some(Resolution {
                source: ResolutionSource::Group(name.clone()),
                config: group.effective_config(),
            });
        }

        self.groups.get(DEFAULT_GROUP).map(|group| Resolution {
            source: ResolutionSource::Default,
            config: group.effective_config(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeclass_data::parse_collection;

    const GROUPS: &str = "\
corp:
  hosts: [db]
  environment: corp
web:
  hosts: [www, db01]
  environment: web
default:
  hosts: [db]
  environment: fallback
";

    fn groups() -> Collection<Group> {
        parse_collection(GROUPS).expect("groups fixture")
    }

    #[test]
    fn exact_host_record_wins_over_groups() {
        let hosts: Collection<Host> =
            parse_collection("db01.corp:\n  environment: pinned\n").expect("hosts fixture");
        let groups = groups();
        let resolution = Resolver::new(&hosts, &groups)
            .resolve("db01.corp")
            .expect("resolved");
        assert_eq!(resolution.source, ResolutionSource::Host);
        assert_eq!(resolution.config.environment.as_deref(), Some("pinned"));
    }

    #[test]
    fn first_declared_group_wins_not_longest_prefix() {
        let hosts = Collection::new();
        let groups = groups();
        let resolution = Resolver::new(&hosts, &groups)
            .resolve("db01.corp")
            .expect("resolved");
        assert_eq!(resolution.source, ResolutionSource::Group("corp".into()));
        assert_eq!(resolution.config.environment.as_deref(), Some("corp"));
    }

    #[test]
    fn default_group_is_only_a_last_resort() {
        let hosts = Collection::new();
        let mut groups = groups();
        groups.shift_remove("corp");
        groups.move_index(1, 0);
        assert_eq!(groups.keys().next().map(String::as_str), Some(DEFAULT_GROUP));

        let resolver = Resolver::new(&hosts, &groups);
        let resolution = resolver.resolve("db01.corp").expect("resolved");
        assert_eq!(resolution.source, ResolutionSource::Group("web".into()));

        let resolution = resolver.resolve("dbx.corp").expect("resolved");
        assert_eq!(resolution.source, ResolutionSource::Default);

        let resolution = resolver.resolve("unknown.host").expect("resolved");
        assert_eq!(resolution.source, ResolutionSource::Default);
        assert_eq!(resolution.config.environment.as_deref(), Some("fallback"));
    }

    #[test]
    fn nothing_resolves_without_groups() {
        let hosts = Collection::new();
        let groups = Collection::new();
        assert!(Resolver::new(&hosts, &groups).resolve("any.host").is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let hosts = Collection::new();
        let groups = groups();
        let resolver = Resolver::new(&hosts, &groups);
        assert_eq!(resolver.resolve("www1"), resolver.resolve("www1"));
        assert_eq!(ResolutionSource::Group("web".into()).to_string(), "group:web");
        assert_eq!(ResolutionSource::Default.label(), "default");
    }
}
