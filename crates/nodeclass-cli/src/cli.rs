//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_credentials, parse_directive, parse_url};
use crate::commands::classify::handle_classify;
use crate::commands::password::handle_hash_password;
use crate::commands::records::{
    Resource, handle_add, handle_delete, handle_get, handle_list, handle_update,
};
use crate::commands::users::{handle_user_add, handle_user_update};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Parses CLI arguments, executes the requested command and prints its
/// output. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(output) => {
            crate::output::print_document(&output);
            0
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<String> {
    if let Command::HashPassword(args) = &cli.command {
        return handle_hash_password(args);
    }

    let credentials = parse_credentials(cli.user, cli.password)?;
    let request_id = Uuid::new_v4().to_string();
    let ctx = AppContext::new(cli.url, credentials, cli.timeout, &request_id)?;

    match cli.command {
        Command::Classify(args) => handle_classify(&ctx, &args.fqdn).await,
        Command::Hosts(command) => dispatch_records(&ctx, Resource::Hosts, command).await,
        Command::Groups(command) => dispatch_records(&ctx, Resource::Groups, command).await,
        Command::Users(command) => match command {
            UserCommand::List => handle_list(&ctx, Resource::Users).await,
            UserCommand::Get(args) => handle_get(&ctx, Resource::Users, &args.key).await,
            UserCommand::Add(args) => handle_user_add(&ctx, args).await,
            UserCommand::Update(args) => handle_user_update(&ctx, args).await,
            UserCommand::Delete(args) => handle_delete(&ctx, Resource::Users, &args.key).await,
        },
        Command::HashPassword(args) => handle_hash_password(&args),
    }
}

async fn dispatch_records(
    ctx: &AppContext,
    resource: Resource,
    command: RecordCommand,
) -> CliResult<String> {
    match command {
        RecordCommand::List => handle_list(ctx, resource).await,
        RecordCommand::Get(args) => handle_get(ctx, resource, &args.key).await,
        RecordCommand::Add(args) => handle_add(ctx, resource, args).await,
        RecordCommand::Update(args) => handle_update(ctx, resource, &args).await,
        RecordCommand::Delete(args) => handle_delete(ctx, resource, &args.key).await,
    }
}

#[derive(Parser)]
#[command(name = "nodeclass", about = "Client for the node classifier service")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "NODECLASS_URL",
        value_parser = parse_url,
        default_value = DEFAULT_SERVER_URL
    )]
    url: Url,
    #[arg(long, global = true, env = "NODECLASS_USER")]
    user: Option<String>,
    #[arg(long, global = true, env = "NODECLASS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(
        long,
        global = true,
        env = "NODECLASS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective configuration of a node.
    Classify(ClassifyArgs),
    /// Manage host records.
    #[command(subcommand)]
    Hosts(RecordCommand),
    /// Manage groups.
    #[command(subcommand)]
    Groups(RecordCommand),
    /// Manage users.
    #[command(subcommand)]
    Users(UserCommand),
    /// Hash a password for seeding the users document.
    HashPassword(HashPasswordArgs),
}

#[derive(Args)]
struct ClassifyArgs {
    #[arg(help = "Fully qualified domain name of the node")]
    fqdn: String,
}

#[derive(Subcommand)]
enum RecordCommand {
    /// List record keys.
    List,
    /// Show one record.
    Get(KeyArgs),
    /// Create or replace a record from a YAML document.
    Add(RecordAddArgs),
    /// Apply `field=value` directives; prefix a value with `-` to remove it.
    Update(RecordUpdateArgs),
    /// Delete a record.
    Delete(KeyArgs),
}

#[derive(Subcommand)]
enum UserCommand {
    /// List usernames.
    List,
    /// Show a user's roles.
    Get(KeyArgs),
    /// Create a user.
    Add(UserAddArgs),
    /// Change a user's password or roles.
    Update(UserUpdateArgs),
    /// Delete a user.
    Delete(KeyArgs),
}

#[derive(Args)]
pub(crate) struct KeyArgs {
    #[arg(help = "Record key (fqdn, group name or username)")]
    pub(crate) key: String,
}

#[derive(Args)]
pub(crate) struct RecordAddArgs {
    #[arg(help = "Record key (fqdn or group name)")]
    pub(crate) key: String,
    #[arg(long, conflicts_with = "file", help = "Inline YAML document")]
    pub(crate) data: Option<String>,
    #[arg(long, help = "Read the YAML document from this file")]
    pub(crate) file: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RecordUpdateArgs {
    #[arg(help = "Record key (fqdn or group name)")]
    pub(crate) key: String,
    #[arg(required = true, value_parser = parse_directive, help = "Directives as field=value")]
    pub(crate) directives: Vec<(String, String)>,
}

#[derive(Args)]
pub(crate) struct UserAddArgs {
    pub(crate) username: String,
    #[arg(long, help = "Password for the new user (prompted when omitted)")]
    pub(crate) new_password: Option<String>,
    #[arg(long = "role", help = "Role to grant; repeat for several (default viewer)")]
    pub(crate) roles: Vec<String>,
}

#[derive(Args)]
pub(crate) struct UserUpdateArgs {
    pub(crate) username: String,
    #[arg(long, help = "Replacement password")]
    pub(crate) new_password: Option<String>,
    #[arg(long = "role", allow_hyphen_values = true, help = "Role directive: `admin` grants, `-admin` revokes")]
    pub(crate) roles: Vec<String>,
}

#[derive(Args)]
pub(crate) struct HashPasswordArgs {
    #[arg(long, help = "Read the password from standard input instead of prompting")]
    pub(crate) stdin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_directives_are_parsed() {
        let cli = Cli::try_parse_from([
            "nodeclass",
            "hosts",
            "update",
            "web01.example.com",
            "tags=-a",
            "tags=c",
        ])
        .expect("parse");
        let Command::Hosts(RecordCommand::Update(args)) = cli.command else {
            panic!("expected hosts update");
        };
        assert_eq!(args.key, "web01.example.com");
        assert_eq!(
            args.directives,
            [
                ("tags".to_string(), "-a".to_string()),
                ("tags".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn role_revocations_are_accepted() {
        let cli = Cli::try_parse_from([
            "nodeclass", "users", "update", "bob", "--role", "-viewer", "--role", "user",
        ])
        .expect("parse");
        let Command::Users(UserCommand::Update(args)) = cli.command else {
            panic!("expected users update");
        };
        assert_eq!(args.roles, ["-viewer", "user"]);
    }

    #[test]
    fn add_rejects_both_document_sources() {
        let parsed = Cli::try_parse_from([
            "nodeclass", "groups", "add", "web", "--data", "hosts: [www]", "--file", "web.yaml",
        ]);
        assert!(parsed.is_err());
    }
}
