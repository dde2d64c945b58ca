//! Application of update directives to host and group records.
//!
//! Directive handling per field:
//! - `environment`: every value replaces the environment; the last one wins.
//! - `classes`: `X` adds a bare class when absent, `-X` removes it.
//! - `hosts` (groups only): same add/remove rules on the host-prefix list.
//! - anything else is a parameter. A list keeps its shape: `X` appends when
//!   absent, `-X` removes every occurrence. A scalar or unset key is replaced
//!   by `X`, and `-X` deletes it only when the current value is exactly `X`.
//!
//! Application is pure: callers persist the returned record themselves.

use crate::directive::{Directive, Directives};
use crate::error::{EncError, EncResult};
use crate::model::{ClassMap, Group, Host, ParamMap, ParamValue, Role};

const ENVIRONMENT: &str = "environment";
const CLASSES: &str = "classes";
const HOSTS: &str = "hosts";

/// Record that update directives can be applied to.
pub trait PatchTarget {
    /// Field naming the record itself; directives for it are ignored.
    const IDENTITY_FIELD: &'static str;

    /// Mutable environment.
    fn environment_mut(&mut self) -> &mut Option<String>;

    /// Mutable class map.
    fn classes_mut(&mut self) -> &mut ClassMap;

    /// Mutable parameter map.
    fn parameters_mut(&mut self) -> &mut ParamMap;

    /// Mutable host-prefix list, for records that have one.
    fn host_prefixes_mut(&mut self) -> Option<&mut Vec<String>> {
        None
    }
}

impl PatchTarget for Host {
    const IDENTITY_FIELD: &'static str = "fqdn";

    fn environment_mut(&mut self) -> &mut Option<String> {
        &mut self.environment
    }

    fn classes_mut(&mut self) -> &mut ClassMap {
        &mut self.classes
    }

    fn parameters_mut(&mut self) -> &mut ParamMap {
        &mut self.parameters
    }
}

impl PatchTarget for Group {
    const IDENTITY_FIELD: &'static str = "name";

    fn environment_mut(&mut self) -> &mut Option<String> {
        &mut self.environment
    }

    fn classes_mut(&mut self) -> &mut ClassMap {
        &mut self.classes
    }

    fn parameters_mut(&mut self) -> &mut ParamMap {
        &mut self.parameters
    }

    fn host_prefixes_mut(&mut self) -> Option<&mut Vec<String>> {
        Some(&mut self.hosts)
    }
}

/// Apply `directives` to `target` and return the updated record.
#[must_use]
pub fn apply_directives<T: PatchTarget>(mut target: T, directives: &Directives) -> T {
    for (field, values) in directives.iter() {
        if field == T::IDENTITY_FIELD {
            continue;
        }
        match field {
            ENVIRONMENT => {
                if let Some(last) = values.last() {
                    *target.environment_mut() = Some(last.clone());
                }
            }
            CLASSES => apply_classes(target.classes_mut(), values),
            HOSTS => {
                if let Some(prefixes) = target.host_prefixes_mut() {
                    apply_list(prefixes, values);
                } else {
                    apply_parameter(target.parameters_mut(), field, values);
                }
            }
            _ => apply_parameter(target.parameters_mut(), field, values),
        }
    }
    target
}

/// Apply `roles` add/remove directives to a user's role list.
///
/// # Errors
///
/// Returns [`EncError::InvalidField`] when a directive names an unknown role;
/// nothing is applied in that case.
pub fn apply_role_directives(mut roles: Vec<Role>, values: &[String]) -> EncResult<Vec<Role>> {
    let parsed = values
        .iter()
        .map(|raw| match Directive::parse(raw) {
            Directive::Add(name) => parse_role("roles", name).map(|role| (true, role)),
            Directive::Remove(name) => parse_role("roles", name).map(|role| (false, role)),
        })
        .collect::<EncResult<Vec<(bool, Role)>>>()?;
    for (add, role) in parsed {
        if add {
            if !roles.contains(&role) {
                roles.push(role);
            }
        } else {
            roles.retain(|held| *held != role);
        }
    }
    Ok(roles)
}

pub(crate) fn parse_role(field: &str, name: &str) -> EncResult<Role> {
    name.parse().map_err(|_| EncError::InvalidField {
        field: field.to_string(),
        value: name.to_string(),
        reason: "is not one of admin, user, viewer",
    })
}

fn apply_classes(classes: &mut ClassMap, values: &[String]) {
    for raw in values {
        match Directive::parse(raw) {
            Directive::Add(class) => {
                classes.entry(class.to_string()).or_insert(None);
            }
            Directive::Remove(class) => {
                classes.shift_remove(class);
            }
        }
    }
}

fn apply_list(items: &mut Vec<String>, values: &[String]) {
    for raw in values {
        match Directive::parse(raw) {
            Directive::Add(item) => {
                if !items.iter().any(|existing| existing == item) {
                    items.push(item.to_string());
                }
            }
            Directive::Remove(item) => items.retain(|existing| existing != item),
        }
    }
}

fn apply_parameter(parameters: &mut ParamMap, key: &str, values: &[String]) {
    if let Some(ParamValue::List(items)) = parameters.get_mut(key) {
        apply_list(items, values);
        return;
    }
    for raw in values {
        match Directive::parse(raw) {
            Directive::Add(value) => {
                parameters.insert(key.to_string(), ParamValue::scalar(value));
            }
            Directive::Remove(value) => {
                if matches!(parameters.get(key), Some(ParamValue::Scalar(current)) if current == value)
                {
                    parameters.shift_remove(key);
                }
            }
        }
    }
}
