//! User account management.

use crate::cli::{UserAddArgs, UserUpdateArgs};
use crate::client::{AppContext, CliError, CliResult, send};
use crate::commands::password::read_password;
use crate::commands::records::{Resource, collection_url, record_url};

pub(crate) async fn handle_user_add(ctx: &AppContext, args: UserAddArgs) -> CliResult<String> {
    if args.username.trim().is_empty() {
        return Err(CliError::validation("username cannot be empty"));
    }
    let password = match args.new_password {
        Some(password) => password,
        None => read_password(&format!("Password for {}: ", args.username))?,
    };
    let form = user_form(Some(("username", args.username)), Some(password), args.roles);
    let url = collection_url(ctx, Resource::Users)?;
    send(ctx.authorized(ctx.client.post(url).form(&form))?, "users").await
}

pub(crate) async fn handle_user_update(
    ctx: &AppContext,
    args: UserUpdateArgs,
) -> CliResult<String> {
    if args.new_password.is_none() && args.roles.is_empty() {
        return Err(CliError::validation(
            "nothing to update (pass --new-password and/or --role)",
        ));
    }
    let url = record_url(ctx, Resource::Users, &args.username)?;
    let form = user_form(None, args.new_password, args.roles);
    send(ctx.authorized(ctx.client.put(url).form(&form))?, "users").await
}

fn user_form(
    key: Option<(&'static str, String)>,
    password: Option<String>,
    roles: Vec<String>,
) -> Vec<(&'static str, String)> {
    key.into_iter()
        .chain(password.map(|password| ("password", password)))
        .chain(roles.into_iter().map(|role| ("roles", role)))
        .collect()
}
