//! Handlers shared by the host, group and user collections.

use std::fs;

use anyhow::anyhow;
use reqwest::Url;

use crate::cli::{RecordAddArgs, RecordUpdateArgs};
use crate::client::{AppContext, CliError, CliResult, send};
use crate::output::render_names;

/// Server collection a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    Hosts,
    Groups,
    Users,
}

impl Resource {
    const fn segment(self) -> &'static str {
        match self {
            Self::Hosts => "hosts",
            Self::Groups => "groups",
            Self::Users => "users",
        }
    }

    /// Form field naming the record on create.
    const fn key_field(self) -> &'static str {
        match self {
            Self::Hosts => "fqdn",
            Self::Groups => "name",
            Self::Users => "username",
        }
    }
}

pub(crate) fn collection_url(ctx: &AppContext, resource: Resource) -> CliResult<Url> {
    ctx.url(&format!("/{}", resource.segment()))
}

/// URL of one record, with `key` percent-encoded as a single path segment.
pub(crate) fn record_url(ctx: &AppContext, resource: Resource, key: &str) -> CliResult<Url> {
    if key.trim().is_empty() {
        return Err(CliError::validation("record key cannot be empty"));
    }
    let mut url = collection_url(ctx, resource)?;
    url.path_segments_mut()
        .map_err(|()| CliError::failure(anyhow!("server URL cannot carry a path")))?
        .push(key);
    Ok(url)
}

pub(crate) async fn handle_list(ctx: &AppContext, resource: Resource) -> CliResult<String> {
    let url = collection_url(ctx, resource)?;
    let body = send(ctx.authorized(ctx.client.get(url))?, resource.segment()).await?;
    render_names(&body)
}

pub(crate) async fn handle_get(ctx: &AppContext, resource: Resource, key: &str) -> CliResult<String> {
    let url = record_url(ctx, resource, key)?;
    send(ctx.authorized(ctx.client.get(url))?, resource.segment()).await
}

pub(crate) async fn handle_add(
    ctx: &AppContext,
    resource: Resource,
    args: RecordAddArgs,
) -> CliResult<String> {
    let data = match (args.data, args.file) {
        (Some(inline), None) => inline,
        (None, Some(path)) => fs::read_to_string(&path).map_err(|err| {
            CliError::failure(anyhow!("failed to read {}: {err}", path.display()))
        })?,
        _ => {
            return Err(CliError::validation(
                "supply the record document with exactly one of --data or --file",
            ));
        }
    };
    let url = collection_url(ctx, resource)?;
    let form = [(resource.key_field(), args.key.as_str()), ("data", data.as_str())];
    send(
        ctx.authorized(ctx.client.post(url).form(&form))?,
        resource.segment(),
    )
    .await
}

pub(crate) async fn handle_update(
    ctx: &AppContext,
    resource: Resource,
    args: &RecordUpdateArgs,
) -> CliResult<String> {
    let url = record_url(ctx, resource, &args.key)?;
    send(
        ctx.authorized(ctx.client.put(url).form(&args.directives))?,
        resource.segment(),
    )
    .await
}

pub(crate) async fn handle_delete(
    ctx: &AppContext,
    resource: Resource,
    key: &str,
) -> CliResult<String> {
    let url = record_url(ctx, resource, key)?;
    send(ctx.authorized(ctx.client.delete(url))?, resource.segment()).await?;
    Ok(format!("deleted {key}\n"))
}
