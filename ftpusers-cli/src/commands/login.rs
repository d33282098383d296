//! Credential check against the stored accounts

use anyhow::{bail, Context, Result};
use clap::Parser;
use ftpusers_data::{Credentials, Datastore, LoginOutcome};
use serde_json::json;

use super::print_json;

#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, env = "FTPUSERS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Prints the outcome; anything but a successful login exits non-zero.
pub async fn run_login(store: &dyn Datastore, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(args.username, args.password);
    let outcome = store
        .verify_login(&credentials)
        .await
        .context("Failed to verify credentials")?;

    let reason = match outcome {
        LoginOutcome::Authenticated(account) => {
            return print_json(&json!({ "outcome": "authenticated", "account": account }));
        }
        LoginOutcome::BlankCredentials => "blank_credentials",
        LoginOutcome::UnknownUser => "unknown_user",
        LoginOutcome::BadPassword => "bad_password",
    };

    print_json(&json!({ "outcome": reason }))?;
    bail!("login rejected for '{}': {reason}", credentials.username)
}
