//! Mapping commands
//!
//! Commands: get, set, delete, directory

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ftpusers_data::{AccountId, Datastore, NewMapping};
use serde_json::json;
use tracing::info;

use super::print_json;

#[derive(Parser, Debug)]
pub struct MappingArgs {
    #[command(subcommand)]
    pub command: MappingCommands,
}

#[derive(Subcommand, Debug)]
pub enum MappingCommands {
    /// Show the account an external id maps to
    Get(KeyArgs),
    /// Map an external id to an account, replacing any existing mapping
    Set {
        #[command(flatten)]
        key: KeyArgs,
        /// Account id to map to
        account_id: AccountId,
    },
    /// Remove a mapping
    Delete(KeyArgs),
    /// List every external id and username under a system
    Directory {
        /// External system name
        system: String,
    },
}

#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// External system name
    pub system: String,
    /// Identifier within that system
    pub id: String,
}

pub async fn run_mapping(store: &dyn Datastore, args: MappingArgs) -> Result<()> {
    match args.command {
        MappingCommands::Get(key) => {
            let mapping = store
                .mapping_retrieve(&key.system, &key.id)
                .await
                .with_context(|| format!("Failed to get mapping {}/{}", key.system, key.id))?;
            print_json(&mapping)
        }
        MappingCommands::Set { key, account_id } => {
            let mapping = NewMapping {
                system: key.system,
                id: key.id,
                account_id,
            };
            let outcome = store.mapping_upsert(&mapping).await.with_context(|| {
                format!("Failed to set mapping {}/{}", mapping.system, mapping.id)
            })?;
            info!(system = %mapping.system, id = %mapping.id, ?outcome, "mapping set");
            print_json(&json!({ "outcome": outcome }))
        }
        MappingCommands::Delete(key) => {
            let deleted = store
                .mapping_delete(&key.system, &key.id)
                .await
                .with_context(|| format!("Failed to delete mapping {}/{}", key.system, key.id))?;
            print_json(&json!({ "deleted": deleted }))
        }
        MappingCommands::Directory { system } => {
            let directory = store
                .system_directory(&system)
                .await
                .with_context(|| format!("Failed to list directory for system '{system}'"))?;
            print_json(&directory)
        }
    }
}
