#![forbid(unsafe_code)]

//! `nodeclass` binary entrypoint.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = nodeclass_cli::run().await;
    process::exit(exit_code);
}
