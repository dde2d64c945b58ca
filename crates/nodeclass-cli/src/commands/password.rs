//! Offline password hashing and interactive password entry.

use std::io::{self, BufRead, IsTerminal};

use anyhow::anyhow;

use crate::cli::HashPasswordArgs;
use crate::client::{CliError, CliResult};

/// Produce a stored hash suitable for a hand-written users document.
pub(crate) fn handle_hash_password(args: &HashPasswordArgs) -> CliResult<String> {
    let plaintext = if args.stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| CliError::failure(anyhow!("failed to read standard input: {err}")))?;
        line
    } else {
        read_password("Password: ")?
    };
    hash_plaintext(&plaintext)
}

/// Prompt for a password without echo when attached to a terminal.
pub(crate) fn read_password(prompt: &str) -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::validation(
            "no password supplied and standard input is not a terminal",
        ));
    }
    rpassword::prompt_password(prompt)
        .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))
}

fn hash_plaintext(raw: &str) -> CliResult<String> {
    let plaintext = raw.trim_end_matches(['\r', '\n']);
    if plaintext.is_empty() {
        return Err(CliError::validation("password cannot be empty"));
    }
    let hash = nodeclass_core::hash_password(plaintext).map_err(CliError::failure)?;
    Ok(format!("{hash}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeclass_core::verify_password;

    #[test]
    fn hashes_verify_against_the_trimmed_input() {
        let output = hash_plaintext("hunter2\n").expect("hash");
        let hash = output.trim_end();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(hash, "hunter2").expect("verify"));
        assert!(!verify_password(hash, "hunter2\n").expect("verify"));
    }

    #[test]
    fn empty_passwords_are_rejected() {
        let err = hash_plaintext("\r\n").expect_err("empty");
        assert_eq!(err.exit_code(), 2);
    }
}
