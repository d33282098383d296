//! External system mappings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::account::{Account, AccountId};

/// A (system, external id) pair resolved to its account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub system: String,
    pub id: String,
    #[serde(rename = "ftp_account")]
    pub account: Account,
}

/// Input for the mapping upsert
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMapping {
    pub system: String,
    pub id: String,
    #[serde(rename = "ftp_id")]
    pub account_id: AccountId,
}

/// How an upsert resolved. Storage failures travel as `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The mapping exists but the requested account does not
    AccountNotFound,
}

/// External id -> username for every mapping under one system
pub type SystemDirectory = BTreeMap<String, String>;
