//! Node classification, the entry point configuration agents call.

use crate::client::{AppContext, CliResult, send};
use crate::commands::records::{Resource, record_url};

/// Fetch the effective configuration for `fqdn` as the server renders it.
pub(crate) async fn handle_classify(ctx: &AppContext, fqdn: &str) -> CliResult<String> {
    let url = record_url(ctx, Resource::Hosts, fqdn)?;
    send(ctx.authorized(ctx.client.get(url))?, "classify").await
}
