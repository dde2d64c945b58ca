//! Repeated form-field access.
//!
//! Write requests are form encoded and list-valued fields (classes, hosts,
//! roles, list parameters) arrive as repeated keys, so bodies are decoded as
//! ordered pairs rather than a struct.

use nodeclass_core::Directives;

/// Decoded form body, in submission order.
#[derive(Debug, Default)]
pub(crate) struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub(crate) const fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted for `name`, or the empty string.
    pub(crate) fn first(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(field, _)| field == name)
            .map_or("", |(_, value)| value.as_str())
    }

    /// First value submitted for `name`, if any.
    pub(crate) fn optional(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted for `name`.
    pub(crate) fn all(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Every pair as an update directive set.
    pub(crate) fn directives(&self) -> Directives {
        Directives::from_pairs(
            self.pairs
                .iter()
                .map(|(field, value)| (field.as_str(), value.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(
            pairs
                .iter()
                .map(|(field, value)| ((*field).to_string(), (*value).to_string()))
                .collect(),
        )
    }

    #[test]
    fn repeated_fields_keep_submission_order() {
        let form = fields(&[("role", "admin"), ("username", "ops"), ("role", "user")]);
        assert_eq!(form.first("username"), "ops");
        assert_eq!(form.all("role"), ["admin", "user"]);
        assert_eq!(form.first("password"), "");
        assert_eq!(form.optional("password"), None);
    }

    #[test]
    fn directives_group_values_by_field() {
        let form = fields(&[("tags", "-a"), ("classes", "ntp"), ("tags", "c")]);
        let directives = form.directives();
        assert_eq!(directives.values("tags"), ["-a", "c"]);
        assert_eq!(directives.values("classes"), ["ntp"]);
    }
}
