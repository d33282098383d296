//! Connection management
//!
//! Owns the shared pool handle. Opening retries a fixed number of times
//! with a fixed pause in between, and every repository call goes through
//! [`ConnectionManager::ensure_live`] first so a dropped database is
//! reconnected before the query runs.

use std::borrow::Cow;
use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Connection};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::dialect::Dialect;
use crate::error::{DataError, Result};
use crate::source::DataSource;

/// Connection attempts before giving up
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Pause between connection attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How long a single attempt may wait for the pool's first connection
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded retry for opening the pool. No backoff growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
    pub acquire_timeout: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// A pool that just answered a ping, plus the dialect to write for
#[derive(Debug, Clone)]
pub struct Live {
    pool: AnyPool,
    dialect: Dialect,
}

impl Live {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Rewrite a neutral query for the active dialect.
    pub fn sql<'q>(&self, query: &'q str) -> Result<Cow<'q, str>> {
        let sql = self.dialect.rewrite(query)?;
        debug!(dialect = %self.dialect, sql = %sql, "prepared query");
        Ok(sql)
    }
}

/// Shared connection handle with transparent reconnect
pub struct ConnectionManager {
    source: DataSource,
    policy: RetryPolicy,
    pool: RwLock<AnyPool>,
}

impl ConnectionManager {
    /// Open the datasource, retrying per `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Connection`] with the last driver error once
    /// every attempt has failed.
    pub async fn connect(source: DataSource, policy: RetryPolicy) -> Result<Self> {
        sqlx::any::install_default_drivers();

        info!(datasource = %source.redacted(), dialect = %source.dialect(), "connecting to datasource");
        let pool = open(&source, &policy).await?;

        Ok(Self {
            source,
            policy,
            pool: RwLock::new(pool),
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.source.dialect()
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Ping the current pool and reconnect if it does not answer.
    ///
    /// Every repository operation calls this first and gives up on the
    /// operation if it fails.
    pub async fn ensure_live(&self) -> Result<Live> {
        let current = self.pool.read().await.clone();
        match ping(&current).await {
            Ok(()) => return Ok(self.live(current)),
            Err(err) => warn!(error = %err, "liveness probe failed, reconnecting"),
        }

        let mut guard = self.pool.write().await;

        // Someone else may have reconnected while we waited for the lock
        if ping(&guard).await.is_ok() {
            return Ok(self.live(guard.clone()));
        }

        let fresh = open(&self.source, &self.policy).await?;
        *guard = fresh.clone();
        Ok(self.live(fresh))
    }

    /// Close the pool. A later `ensure_live` will reopen it.
    pub async fn close(&self) {
        self.pool.read().await.close().await;
    }

    fn live(&self, pool: AnyPool) -> Live {
        Live {
            pool,
            dialect: self.source.dialect(),
        }
    }
}

async fn ping(pool: &AnyPool) -> std::result::Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}

fn pool_options(dialect: Dialect, policy: &RetryPolicy) -> AnyPoolOptions {
    let options = AnyPoolOptions::new().acquire_timeout(policy.acquire_timeout);

    match dialect.pool_bounds() {
        // `max_idle` has no sqlx counterpart
        Some(bounds) => options
            .max_connections(bounds.max_open)
            .max_lifetime(bounds.max_lifetime),
        None => options,
    }
}

async fn open(source: &DataSource, policy: &RetryPolicy) -> Result<AnyPool> {
    let dialect = source.dialect();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match pool_options(dialect, policy).connect(source.url()).await {
            Ok(pool) => {
                info!(%dialect, attempt, "datasource connected");
                return Ok(pool);
            }
            Err(err) if attempt < policy.attempts => {
                warn!(
                    %dialect,
                    attempt,
                    max_attempts = policy.attempts,
                    error = %err,
                    "connection attempt failed, retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => {
                return Err(DataError::Connection {
                    dialect,
                    attempts: attempt,
                    source: err,
                })
            }
        }
    }
}
