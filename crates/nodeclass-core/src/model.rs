//! Records stored in the hosts, groups and users collections.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use thiserror::Error;

/// Classes applied to a node. A class may carry its own parameter overrides,
/// kept verbatim; a bare class maps to `None`.
pub type ClassMap = IndexMap<String, Option<Mapping>>;

/// Node parameters keyed by name.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Value of one parameter. Its shape is fixed once the key exists: update
/// directives never turn a scalar into a list or a list into a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single value.
    Scalar(String),
    /// An ordered list of values.
    List(Vec<String>),
}

impl ParamValue {
    /// Build a scalar value.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Build a list value.
    #[must_use]
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether the value is list-shaped.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a scalar or a list of scalars")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ParamValue::Scalar(String::new()))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        ParamValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<ParamValue>()? {
            match item {
                ParamValue::Scalar(value) => items.push(value),
                ParamValue::List(_) => {
                    return Err(de::Error::custom("nested lists are not valid parameter values"));
                }
            }
        }
        Ok(ParamValue::List(items))
    }
}

/// Exact configuration record for one fqdn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Environment the node belongs to.
    #[serde(default)]
    pub environment: Option<String>,
    /// Classes applied to the node.
    #[serde(default, deserialize_with = "deserialize_classes")]
    pub classes: ClassMap,
    /// Node parameters.
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub parameters: ParamMap,
}

/// Configuration handed to an agent: either a host record or a group's
/// configuration with its host prefixes stripped.
pub type EffectiveConfig = Host;

/// Configuration shared by every fqdn matching one of its host prefixes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Literal fqdn prefixes selecting this group.
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub hosts: Vec<String>,
    /// Environment the matching nodes belong to.
    #[serde(default)]
    pub environment: Option<String>,
    /// Classes applied to matching nodes.
    #[serde(default, deserialize_with = "deserialize_classes")]
    pub classes: ClassMap,
    /// Parameters applied to matching nodes.
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub parameters: ParamMap,
}

impl Group {
    /// Whether any host prefix matches the start of `fqdn`.
    #[must_use]
    pub fn matches(&self, fqdn: &str) -> bool {
        self.hosts.iter().any(|prefix| fqdn.starts_with(prefix.as_str()))
    }

    /// The group's configuration without its host prefixes.
    #[must_use]
    pub fn effective_config(&self) -> EffectiveConfig {
        Host {
            environment: self.environment.clone(),
            classes: self.classes.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

/// Roles a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// May read everything and create or update hosts.
    User,
    /// Read-only access to hosts and groups.
    Viewer,
}

impl Role {
    /// Lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Viewer => "viewer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a role name is not `admin`, `user` or `viewer`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "viewer" => Ok(Self::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Stored user account. `password` always holds a salted hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Argon2 PHC string.
    pub password: String,
    /// Granted roles.
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub roles: Vec<Role>,
}

impl User {
    /// Whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Representation safe to return to clients.
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            roles: self.roles.clone(),
        }
    }
}

/// User record with the password hash redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    /// Granted roles.
    pub roles: Vec<Role>,
}

fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassesDocument {
    Map(ClassMap),
    List(Vec<String>),
}

// Classes may be written either as a mapping (with optional overrides) or as
// a plain list of class names.
fn deserialize_classes<'de, D>(deserializer: D) -> Result<ClassMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<ClassesDocument>::deserialize(deserializer)? {
            None => ClassMap::new(),
            Some(ClassesDocument::Map(classes)) => classes,
            Some(ClassesDocument::List(names)) => {
                names.into_iter().map(|name| (name, None)).collect()
            }
        },
    )
}
