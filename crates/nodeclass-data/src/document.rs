//! YAML document rendering and parsing.
//!
//! Collections and API responses share one rendering rule: null values are
//! written as an empty scalar (`key:` and `-`) rather than the literal `null`,
//! so documents read back by configuration agents carry bare keys for classes
//! without overrides.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::collection::Collection;

/// Render a value as a YAML document with nulls emitted as empty scalars.
///
/// # Errors
///
/// Returns an error when the value cannot be represented as YAML.
pub fn render_yaml<T>(value: &T) -> Result<String, serde_yaml::Error>
where
    T: Serialize + ?Sized,
{
    let raw = serde_yaml::to_string(value)?;
    Ok(blank_nulls(&raw))
}

/// Parse a collection document. An empty or `null` document is an empty collection.
///
/// # Errors
///
/// Returns an error when the document is not a mapping of records.
pub fn parse_collection<V>(text: &str) -> Result<Collection<V>, serde_yaml::Error>
where
    V: DeserializeOwned,
{
    if text.trim().is_empty() {
        return Ok(Collection::new());
    }
    let parsed: Option<Collection<V>> = serde_yaml::from_str(text)?;
    Ok(parsed.unwrap_or_default())
}

fn blank_nulls(raw: &str) -> String {
    let mut rendered = String::with_capacity(raw.len());
    let mut block_header_indent: Option<usize> = None;

    for line in raw.lines() {
        let indent = line.len() - line.trim_start().len();
        if let Some(header) = block_header_indent {
            if line.trim().is_empty() || indent > header {
                rendered.push_str(line);
                rendered.push('\n');
                continue;
            }
            block_header_indent = None;
        }
        if opens_block_scalar(line) {
            block_header_indent = Some(indent);
        }
        rendered.push_str(blank_null(line));
        rendered.push('\n');
    }
    rendered
}

fn blank_null(line: &str) -> &str {
    if line == "null" {
        return "";
    }
    line.strip_suffix(" null")
        .filter(|head| head.ends_with(':') || is_sequence_marker(head))
        .unwrap_or(line)
}

fn is_sequence_marker(head: &str) -> bool {
    let head = head.trim_start();
    !head.is_empty() && head.split(' ').all(|token| token == "-")
}

// Literal/folded block headers (`|`, `|-`, `>+`, `|2-`); their content lines
// are string data and must be passed through untouched.
fn opens_block_scalar(line: &str) -> bool {
    line.trim_end()
        .rsplit(' ')
        .next()
        .is_some_and(|token| {
            token.starts_with(['|', '>'])
                && token.len() <= 4
                && token
                    .chars()
                    .all(|ch| matches!(ch, '|' | '>' | '+' | '-') || ch.is_ascii_digit())
        })
}
