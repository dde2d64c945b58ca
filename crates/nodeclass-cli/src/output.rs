//! Renderers for YAML response bodies.

use anyhow::anyhow;

use crate::client::{CliError, CliResult};

/// Print a document body exactly as the server produced it.
pub(crate) fn print_document(body: &str) {
    print!("{body}");
    if !body.is_empty() && !body.ends_with('\n') {
        println!();
    }
}

/// Render a YAML sequence of names as one name per line.
pub(crate) fn render_names(body: &str) -> CliResult<String> {
    if body.trim().is_empty() {
        return Ok(String::new());
    }
    let names: Option<Vec<String>> = serde_yaml::from_str(body)
        .map_err(|err| CliError::failure(anyhow!("server returned an invalid list: {err}")))?;
    Ok(names
        .unwrap_or_default()
        .iter()
        .fold(String::new(), |mut out, name| {
            out.push_str(name);
            out.push('\n');
            out
        }))
}
