//! Update directives: field name to one or more `X` / `-X` values.

use indexmap::IndexMap;

/// A single directive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Add the value (or replace, for scalar fields).
    Add(&'a str),
    /// Remove the value; the leading `-` has been stripped.
    Remove(&'a str),
}

impl<'a> Directive<'a> {
    /// Interpret a raw directive value. A leading `-` marks a removal of the
    /// remaining text.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        raw.strip_prefix('-').map_or(Self::Add(raw), Self::Remove)
    }
}

/// Directives grouped by field, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    fields: IndexMap<String, Vec<String>>,
}

impl Directives {
    /// Empty directive set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group repeated `(field, value)` pairs, as submitted in a form body.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut directives = Self::new();
        for (field, value) in pairs {
            directives.push(field, value);
        }
        directives
    }

    /// Append one value for `field`.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(value.into());
    }

    /// Raw values supplied for `field`.
    #[must_use]
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Last value supplied for `field`, if any.
    #[must_use]
    pub fn last(&self, field: &str) -> Option<&str> {
        self.values(field).last().map(String::as_str)
    }

    /// Fields with their raw values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    /// Whether no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_dash_marks_removal() {
        assert_eq!(Directive::parse("ntp"), Directive::Add("ntp"));
        assert_eq!(Directive::parse("-ntp"), Directive::Remove("ntp"));
        assert_eq!(Directive::parse("--x"), Directive::Remove("-x"));
        assert_eq!(Directive::parse("-"), Directive::Remove(""));
    }

    #[test]
    fn pairs_group_by_first_appearance() {
        let directives = Directives::from_pairs([
            ("tags", "-a"),
            ("environment", "prod"),
            ("tags", "c"),
        ]);
        let fields: Vec<_> = directives.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["tags", "environment"]);
        assert_eq!(directives.values("tags"), ["-a", "c"]);
        assert_eq!(directives.last("environment"), Some("prod"));
        assert!(directives.values("classes").is_empty());
        assert!(Directives::new().is_empty());
    }
}
