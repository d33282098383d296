//! Command implementations for the ftpusers CLI
//!
//! Every command prints a single JSON document to stdout.

pub mod account;
pub mod login;
pub mod mapping;

use anyhow::{Context, Result};
use serde::Serialize;

pub use account::run_account;
pub use login::run_login;
pub use mapping::run_mapping;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}
