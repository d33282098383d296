//! Mapping repository
//!
//! Associates (system, external id) pairs with accounts in `ftp_mapping`.
//!
//! Neither engine offers an upsert both can run, so writes try an INSERT
//! and fall back to an UPDATE when the key already exists. The two
//! statements are not wrapped in a transaction: a delete or another
//! upsert landing between them can leave the reported outcome stale.

use async_trait::async_trait;
use sqlx::{Any, Row};
use tracing::{debug, error, instrument};

use super::accounts::decode_id;
use crate::classify::{ErrorClass, ErrorClassifier};
use crate::db::connection::{ConnectionManager, Live};
use crate::error::{DataError, Result};
use crate::models::{Account, Mapping, NewMapping, SystemDirectory, UpsertOutcome};

/// Mapping repository
pub struct MappingRepo<'a> {
    conn: &'a ConnectionManager,
}

impl<'a> MappingRepo<'a> {
    pub fn new(conn: &'a ConnectionManager) -> Self {
        Self { conn }
    }

    /// Resolve a mapping to its account.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, system: &str, id: &str) -> Result<Mapping> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "select a.`id`, a.`username`, a.`description` \
             from `ftp_mapping` m \
             inner join `ftp_account` a on m.`ftp_id` = a.`id` \
             where m.`system` = ? and m.`id` = ?",
        )?;

        let row = sqlx::query(&sql)
            .bind(system)
            .bind(id)
            .fetch_optional(live.pool())
            .await?
            .ok_or_else(|| DataError::not_found("mapping", format!("{system}/{id}")))?;

        Ok(Mapping {
            system: system.to_owned(),
            id: id.to_owned(),
            account: Account {
                id: decode_id(row.try_get(0)?)?,
                username: row.try_get(1)?,
                description: row.try_get(2)?,
            },
        })
    }

    /// Delete a mapping and report how many rows went. Zero is not an
    /// error here; the caller decides.
    #[instrument(skip(self))]
    pub async fn delete(&self, system: &str, id: &str) -> Result<u64> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql("delete from `ftp_mapping` where `system` = ? and `id` = ?")?;

        let result = sqlx::query(&sql)
            .bind(system)
            .bind(id)
            .execute(live.pool())
            .await
            .map_err(|e| {
                error!(error = %e, "mapping delete failed");
                e
            })?;

        Ok(result.rows_affected())
    }

    /// Insert the mapping, or point the existing one at a new account.
    #[instrument(skip(self), fields(system = %mapping.system, id = %mapping.id, account_id = mapping.account_id))]
    pub async fn upsert(&self, mapping: &NewMapping) -> Result<UpsertOutcome> {
        let live = self.conn.ensure_live().await?;
        let dialect = live.dialect();
        upsert_with(&LiveWriter { live: &live }, &dialect, mapping).await
    }

    /// Every external id under `system` with the username it maps to.
    /// An unknown system yields an empty directory.
    #[instrument(skip(self))]
    pub async fn directory(&self, system: &str) -> Result<SystemDirectory> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "select distinct m.`id`, a.`username` \
             from `ftp_mapping` m \
             inner join `ftp_account` a on m.`ftp_id` = a.`id` \
             where m.`system` = ?",
        )?;

        let rows = sqlx::query(&sql)
            .bind(system)
            .fetch_all(live.pool())
            .await
            .map_err(|e| {
                error!(error = %e, "system directory query failed");
                e
            })?;

        rows.iter()
            .map(|row| -> Result<(String, String)> { Ok((row.try_get(0)?, row.try_get(1)?)) })
            .collect()
    }
}

/// The two statements the upsert is built from
#[async_trait]
pub(crate) trait MappingWriter: Send + Sync {
    async fn insert(&self, mapping: &NewMapping) -> Result<()>;
    async fn reassign(&self, mapping: &NewMapping) -> Result<()>;
}

struct LiveWriter<'a> {
    live: &'a Live,
}

#[async_trait]
impl MappingWriter for LiveWriter<'_> {
    async fn insert(&self, mapping: &NewMapping) -> Result<()> {
        let sql = self
            .live
            .sql("insert into `ftp_mapping` (`system`, `id`, `ftp_id`) values (?, ?, ?)")?;

        sqlx::query::<Any>(&sql)
            .bind(mapping.system.as_str())
            .bind(mapping.id.as_str())
            .bind(i64::from(mapping.account_id))
            .execute(self.live.pool())
            .await?;
        Ok(())
    }

    async fn reassign(&self, mapping: &NewMapping) -> Result<()> {
        let sql = self
            .live
            .sql("update `ftp_mapping` set `ftp_id` = ? where `system` = ? and `id` = ?")?;

        sqlx::query::<Any>(&sql)
            .bind(i64::from(mapping.account_id))
            .bind(mapping.system.as_str())
            .bind(mapping.id.as_str())
            .execute(self.live.pool())
            .await?;
        Ok(())
    }
}

/// Insert, and on a key conflict update instead.
///
/// | insert              | update           | outcome           |
/// |---------------------|------------------|-------------------|
/// | ok                  | -                | `Inserted`        |
/// | unique violation    | ok               | `Updated`         |
/// | unique violation    | fk violation     | `AccountNotFound` |
/// | unique violation    | other error      | `Err`             |
/// | any other error     | -                | `Err`             |
pub(crate) async fn upsert_with<W, C>(
    writer: &W,
    classifier: &C,
    mapping: &NewMapping,
) -> Result<UpsertOutcome>
where
    W: MappingWriter + ?Sized,
    C: ErrorClassifier + ?Sized,
{
    let err = match writer.insert(mapping).await {
        Ok(()) => {
            debug!("mapping inserted");
            return Ok(UpsertOutcome::Inserted);
        }
        Err(err) => err,
    };

    if err.class_with(classifier) != ErrorClass::Unique {
        error!(error = %err, "mapping insert failed");
        return Err(err);
    }

    match writer.reassign(mapping).await {
        Ok(()) => {
            debug!("mapping updated");
            Ok(UpsertOutcome::Updated)
        }
        Err(err) if err.class_with(classifier) == ErrorClass::ForeignKey => {
            debug!("mapping update refused, account does not exist");
            Ok(UpsertOutcome::AccountNotFound)
        }
        Err(err) => {
            error!(error = %err, "mapping update failed");
            Err(err)
        }
    }
}
