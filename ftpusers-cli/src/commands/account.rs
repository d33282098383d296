//! Account commands
//!
//! Commands: lookup, get, list, create, update, passwd, delete

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ftpusers_data::{Account, AccountId, Datastore, NewAccount, DEFAULT_PAGE_SIZE};
use serde_json::json;
use tracing::info;

use super::print_json;

#[derive(Parser, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommands,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Find an account by exact username
    Lookup {
        username: String,
    },
    /// Show one account
    Get {
        /// Account id
        id: AccountId,
    },
    /// List accounts, a page at a time
    List(ListArgs),
    /// Create an account and print its id
    Create(CreateArgs),
    /// Change username and description
    Update(UpdateArgs),
    /// Replace an account's password
    Passwd {
        /// Account id
        id: AccountId,
        /// New password
        #[arg(long, env = "FTPUSERS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete an account and its mappings
    Delete {
        /// Account id
        id: AccountId,
    },
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Accounts per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Only accounts whose username or description contains this text
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Initial password
    #[arg(long, env = "FTPUSERS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Account id
    pub id: AccountId,

    /// New username (unchanged if omitted)
    #[arg(long)]
    pub username: Option<String>,

    /// New description (unchanged if omitted)
    #[arg(long)]
    pub description: Option<String>,
}

pub async fn run_account(store: &dyn Datastore, args: AccountArgs) -> Result<()> {
    match args.command {
        AccountCommands::Lookup { username } => {
            let secret = store
                .account_lookup(&username)
                .await
                .with_context(|| format!("Failed to look up account '{username}'"))?;
            print_json(&secret.into_account())
        }
        AccountCommands::Get { id } => {
            let account = store
                .account_get(id)
                .await
                .with_context(|| format!("Failed to get account {id}"))?;
            print_json(&account)
        }
        AccountCommands::List(list) => {
            let page = store
                .account_list(list.page, list.page_size, &list.search)
                .await
                .context("Failed to list accounts")?;
            print_json(&page)
        }
        AccountCommands::Create(create) => run_create(store, create).await,
        AccountCommands::Update(update) => run_update(store, update).await,
        AccountCommands::Passwd { id, password } => {
            store
                .account_update_password(id, &password)
                .await
                .with_context(|| format!("Failed to update password for account {id}"))?;
            info!(id, "password updated");
            print_json(&json!({ "id": id, "updated": true }))
        }
        AccountCommands::Delete { id } => {
            store
                .account_delete(id)
                .await
                .with_context(|| format!("Failed to delete account {id}"))?;
            info!(id, "account deleted");
            print_json(&json!({ "id": id, "deleted": true }))
        }
    }
}

async fn run_create(store: &dyn Datastore, args: CreateArgs) -> Result<()> {
    let account = NewAccount {
        username: args.username,
        description: args.description,
        password: args.password,
    };
    let id = store
        .account_create(&account)
        .await
        .with_context(|| format!("Failed to create account '{}'", account.username))?;

    info!(id, username = %account.username, "account created");
    print_json(&json!({ "id": id }))
}

async fn run_update(store: &dyn Datastore, args: UpdateArgs) -> Result<()> {
    let current = store
        .account_get(args.id)
        .await
        .with_context(|| format!("Failed to get account {}", args.id))?;

    let updated = Account {
        id: current.id,
        username: args.username.unwrap_or(current.username),
        description: args.description.unwrap_or(current.description),
    };
    store
        .account_update(&updated)
        .await
        .with_context(|| format!("Failed to update account {}", args.id))?;

    print_json(&updated)
}
