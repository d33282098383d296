//! SQL dialects and the query adapter
//!
//! Queries are written once in a neutral form: identifiers quoted with
//! backticks and positional `?` placeholders. MySQL runs that form as-is.
//! PostgreSQL needs double-quoted identifiers and numbered `$n`
//! placeholders, so the adapter rewrites before execution.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::error::{DataError, Result};

/// Highest placeholder number the adapter will produce.
///
/// A neutral query with more than this many `?` is rejected rather than
/// half-rewritten.
pub const MAX_PLACEHOLDERS: usize = 10;

/// The SQL engines the data layer can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Backtick identifiers, `?` placeholders
    MySql,
    /// Double-quoted identifiers, `$1..$n` placeholders
    Postgres,
}

/// Connection pool limits applied after a successful connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolBounds {
    /// Informational only. sqlx pools have no idle-count cap, so this is
    /// not applied; idle connections are reaped by the pool's idle timeout.
    pub max_idle: u32,
    pub max_open: u32,
    pub max_lifetime: Duration,
}

impl Dialect {
    /// Resolve a dialect from a connection-string scheme.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "mysql" => Some(Self::MySql),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Rewrite a neutral query for this dialect.
    ///
    /// MySQL queries are borrowed back unchanged. PostgreSQL queries get
    /// every backtick turned into a double quote and each `?`, left to
    /// right, numbered from `$1`.
    pub fn rewrite<'q>(&self, query: &'q str) -> Result<Cow<'q, str>> {
        match self {
            Self::MySql => Ok(Cow::Borrowed(query)),
            Self::Postgres => {
                let found = query.matches('?').count();
                if found > MAX_PLACEHOLDERS {
                    return Err(DataError::PlaceholderCeiling {
                        found,
                        max: MAX_PLACEHOLDERS,
                    });
                }

                let mut out = String::with_capacity(query.len() + found * 2);
                let mut next = 1;
                for ch in query.chars() {
                    match ch {
                        '`' => out.push('"'),
                        '?' => {
                            out.push('$');
                            out.push_str(&next.to_string());
                            next += 1;
                        }
                        other => out.push(other),
                    }
                }
                Ok(Cow::Owned(out))
            }
        }
    }

    /// Trailing limit clause for a page of `page_size` rows starting at
    /// `offset`. Values are rendered inline, not bound.
    pub fn limit_clause(&self, page_size: u32, offset: u64) -> String {
        match self {
            Self::MySql => format!(" limit {offset}, {page_size}"),
            Self::Postgres => format!(" limit {page_size} offset {offset}"),
        }
    }

    /// Fragment of driver error text that marks a primary or unique key
    /// violation.
    pub fn unique_violation_signature(&self) -> &'static str {
        match self {
            Self::MySql => "1062 (23000)",
            Self::Postgres => "duplicate key value violates unique constraint",
        }
    }

    /// Fragment of driver error text that marks a foreign key violation.
    pub fn foreign_key_violation_signature(&self) -> &'static str {
        match self {
            Self::MySql => "1452 (23000)",
            Self::Postgres => "violates foreign key constraint",
        }
    }

    /// Pool limits for this dialect. MySQL keeps the driver defaults.
    pub fn pool_bounds(&self) -> Option<PoolBounds> {
        match self {
            Self::MySql => None,
            Self::Postgres => Some(PoolBounds {
                max_idle: 30,
                max_open: 100,
                max_lifetime: Duration::from_secs(60 * 60),
            }),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
