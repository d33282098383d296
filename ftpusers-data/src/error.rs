//! Error types for ftpusers-data
//!
//! Known conflict shapes (missing rows, duplicate usernames) become typed
//! variants. Anything the driver reports that we do not recognise is kept
//! as the driver's `sqlx::Error`, untouched.

use thiserror::Error;

use crate::classify::{ErrorClass, ErrorClassifier};
use crate::dialect::Dialect;

/// Result type alias for data layer operations
pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    /// Connection string has no `<scheme>://` prefix
    #[error("protocol not specified in datasource")]
    MissingProtocol,

    /// Connection string names a scheme with no dialect behind it
    #[error("protocol {0} not supported")]
    UnsupportedProtocol(String),

    /// Connection string could not be turned into a driver URL
    #[error("invalid datasource: {0}")]
    InvalidSource(String),

    /// Every connection attempt failed (or the liveness probe and the
    /// reconnect that followed it both failed)
    #[error("could not connect to {dialect} datasource after {attempts} attempt(s): {source}")]
    Connection {
        dialect: Dialect,
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("an account for username '{username}' already exists")]
    AlreadyExists { username: String },

    /// Numbered placeholders only go up to `$max`
    #[error("query uses {found} placeholders, at most {max} are supported")]
    PlaceholderCeiling { found: usize, max: usize },

    /// Storage handed back an identifier that does not fit an account id
    #[error("identifier {0} is out of range for an account id")]
    IdOutOfRange(i64),

    /// Opaque storage error, surfaced as the driver reported it
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DataError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Classify a storage failure. Errors raised by this layer itself are
    /// never conflicts.
    pub fn class_with(&self, classifier: &(impl ErrorClassifier + ?Sized)) -> ErrorClass {
        match self {
            Self::Sqlx(err) => classifier.classify(err),
            _ => ErrorClass::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
