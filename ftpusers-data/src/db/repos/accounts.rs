//! Account repository
//!
//! CRUD over `ftp_account`:
//! - create: INSERT, duplicate usernames classified from the driver error
//! - list: COUNT then a paged SELECT with the dialect's limit clause
//! - update/delete: zero affected rows means the account is missing

use sqlx::any::AnyRow;
use sqlx::{Any, Row};
use tracing::{debug, error, instrument};

use crate::classify::ErrorClass;
use crate::db::connection::{ConnectionManager, Live};
use crate::error::{DataError, Result};
use crate::models::{
    Account, AccountId, AccountPage, AccountSecret, NewAccount, Pagination, SearchFilter,
};

/// Account repository
pub struct AccountRepo<'a> {
    conn: &'a ConnectionManager,
}

impl<'a> AccountRepo<'a> {
    pub fn new(conn: &'a ConnectionManager) -> Self {
        Self { conn }
    }

    /// Fetch an account with its stored password, by exact username.
    #[instrument(skip(self))]
    pub async fn lookup(&self, username: &str) -> Result<AccountSecret> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "select `id`, `username`, `description`, `password` from `ftp_account` where `username` = ?",
        )?;

        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(live.pool())
            .await?
            .ok_or_else(|| DataError::not_found("account", username))?;

        Ok(AccountSecret {
            account: account_from_row(&row)?,
            password: row.try_get(3)?,
        })
    }

    /// Get a single account by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: AccountId) -> Result<Account> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql("select `id`, `username`, `description` from `ftp_account` where `id` = ?")?;

        let row = sqlx::query(&sql)
            .bind(i64::from(id))
            .fetch_optional(live.pool())
            .await?
            .ok_or_else(|| DataError::not_found("account", id))?;

        account_from_row(&row)
    }

    /// List accounts ordered by id, optionally filtered by a search term
    /// matched against username and description.
    ///
    /// A page past the end comes back empty with the totals filled in.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, page_size: u32, search: &str) -> Result<AccountPage> {
        let live = self.conn.ensure_live().await?;
        let page = Pagination::new(page, page_size);
        let filter = SearchFilter::new(search);
        let clause = if filter.is_some() { SearchFilter::CLAUSE } else { "" };

        let total_items = count(&live, clause, filter.as_ref()).await?;
        let total_pages = page.total_pages(total_items);

        // Offsets past the end can exceed what the engine accepts in LIMIT
        if page.is_past_end(total_items) {
            debug!(total_items, offset = page.offset(), "page past the end");
            return Ok(AccountPage {
                accounts: Vec::new(),
                total_items,
                total_pages,
            });
        }

        let neutral = format!(
            "select `id`, `username`, `description` from `ftp_account`{clause} order by `id`{}",
            live.dialect().limit_clause(page.limit(), page.offset())
        );
        let sql = live.sql(&neutral)?;

        let mut query = sqlx::query::<Any>(&sql);
        if let Some(filter) = &filter {
            query = query.bind(filter.pattern()).bind(filter.pattern());
        }

        let rows = query.fetch_all(live.pool()).await.map_err(|e| {
            error!(error = %e, "account page query failed");
            e
        })?;

        let accounts = rows.iter().map(account_from_row).collect::<Result<Vec<_>>>()?;

        Ok(AccountPage {
            accounts,
            total_items,
            total_pages,
        })
    }

    /// Create an account and return its new id.
    ///
    /// The id is read back as the lowest id holding the username; the read
    /// is a separate statement, not tied to the insert.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn create(&self, account: &NewAccount) -> Result<AccountId> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "insert into `ftp_account` (`username`, `description`, `password`) values (?, ?, ?)",
        )?;

        let inserted = sqlx::query(&sql)
            .bind(account.username.as_str())
            .bind(account.description.as_str())
            .bind(account.password.as_str())
            .execute(live.pool())
            .await;

        if let Err(err) = inserted {
            let err = DataError::from(err);
            if err.class_with(&live.dialect()) == ErrorClass::Unique {
                debug!("username already taken");
                return Err(DataError::AlreadyExists {
                    username: account.username.clone(),
                });
            }
            error!(error = %err, "account insert failed");
            return Err(err);
        }

        let sql = live.sql("select min(`id`) from `ftp_account` where `username` = ?")?;
        let id: Option<i64> = sqlx::query_scalar(&sql)
            .bind(account.username.as_str())
            .fetch_one(live.pool())
            .await?;

        let id = id.ok_or_else(|| DataError::not_found("account", &account.username))?;
        decode_id(id)
    }

    /// Update username and description. The password is left alone.
    #[instrument(skip(self, account), fields(id = account.id))]
    pub async fn update(&self, account: &Account) -> Result<()> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "update `ftp_account` set `username` = ?, `description` = ?, `updated_on` = current_timestamp where `id` = ?",
        )?;

        let result = sqlx::query(&sql)
            .bind(account.username.as_str())
            .bind(account.description.as_str())
            .bind(i64::from(account.id))
            .execute(live.pool())
            .await?;

        expect_affected(result.rows_affected(), account.id)
    }

    /// Replace the stored password, keyed strictly by id.
    #[instrument(skip(self, password))]
    pub async fn update_password(&self, id: AccountId, password: &str) -> Result<()> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql(
            "update `ftp_account` set `password` = ?, `updated_on` = current_timestamp where `id` = ?",
        )?;

        let result = sqlx::query(&sql)
            .bind(password)
            .bind(i64::from(id))
            .execute(live.pool())
            .await?;

        expect_affected(result.rows_affected(), id)
    }

    /// Delete an account. Its mappings go with it via the cascading
    /// foreign key.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AccountId) -> Result<()> {
        let live = self.conn.ensure_live().await?;
        let sql = live.sql("delete from `ftp_account` where `id` = ?")?;

        let result = sqlx::query(&sql)
            .bind(i64::from(id))
            .execute(live.pool())
            .await?;

        expect_affected(result.rows_affected(), id)
    }
}

async fn count(live: &Live, clause: &str, filter: Option<&SearchFilter>) -> Result<u64> {
    let neutral = format!("select count(`id`) from `ftp_account`{clause}");
    let sql = live.sql(&neutral)?;

    let mut query = sqlx::query_scalar::<Any, i64>(&sql);
    if let Some(filter) = filter {
        query = query.bind(filter.pattern()).bind(filter.pattern());
    }

    let total = query.fetch_one(live.pool()).await.map_err(|e| {
        error!(error = %e, "account count query failed");
        e
    })?;

    // COUNT is never negative
    Ok(u64::try_from(total).unwrap_or_default())
}

fn account_from_row(row: &AnyRow) -> Result<Account> {
    Ok(Account {
        id: decode_id(row.try_get(0)?)?,
        username: row.try_get(1)?,
        description: row.try_get(2)?,
    })
}

pub(crate) fn decode_id(raw: i64) -> Result<AccountId> {
    AccountId::try_from(raw).map_err(|_| DataError::IdOutOfRange(raw))
}

fn expect_affected(rows: u64, id: AccountId) -> Result<()> {
    if rows == 0 {
        Err(DataError::not_found("account", id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_fit() {
        assert_eq!(decode_id(42).unwrap(), 42);
        assert!(matches!(decode_id(-1), Err(DataError::IdOutOfRange(-1))));
        assert!(decode_id(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn zero_rows_affected_is_not_found() {
        assert!(expect_affected(1, 7).is_ok());
        let err = expect_affected(0, 1).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: account '1'");
    }
}
