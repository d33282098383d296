//! The data layer's public surface
//!
//! [`Datastore`] names the eleven storage operations callers may use.
//! [`Database`] is the implementation backed by a live connection; tests
//! and embedders can supply their own.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{AccountRepo, ConnectionManager, MappingRepo, RetryPolicy};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::models::{
    Account, AccountId, AccountPage, AccountSecret, Credentials, LoginOutcome, Mapping,
    NewAccount, NewMapping, SystemDirectory, UpsertOutcome,
};
use crate::source::DataSource;

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn account_lookup(&self, username: &str) -> Result<AccountSecret>;
    async fn account_get(&self, id: AccountId) -> Result<Account>;
    async fn account_list(&self, page: u32, page_size: u32, search: &str) -> Result<AccountPage>;
    async fn account_create(&self, account: &NewAccount) -> Result<AccountId>;
    async fn account_update(&self, account: &Account) -> Result<()>;
    async fn account_update_password(&self, id: AccountId, password: &str) -> Result<()>;
    async fn account_delete(&self, id: AccountId) -> Result<()>;

    async fn mapping_retrieve(&self, system: &str, id: &str) -> Result<Mapping>;
    async fn mapping_delete(&self, system: &str, id: &str) -> Result<u64>;
    async fn mapping_upsert(&self, mapping: &NewMapping) -> Result<UpsertOutcome>;
    async fn system_directory(&self, system: &str) -> Result<SystemDirectory>;

    /// Check a username/password pair against the stored account.
    ///
    /// Blank input never reaches storage. An unknown username is an
    /// outcome, not an error; any other lookup failure is returned.
    async fn verify_login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        if credentials.is_blank() {
            return Ok(LoginOutcome::BlankCredentials);
        }

        let secret = match self.account_lookup(&credentials.username).await {
            Ok(secret) => secret,
            Err(err) if err.is_not_found() => {
                debug!(username = %credentials.username, "login for unknown user");
                return Ok(LoginOutcome::UnknownUser);
            }
            Err(err) => return Err(err),
        };

        if secret.password_matches(&credentials.password) {
            Ok(LoginOutcome::Authenticated(secret.into_account()))
        } else {
            debug!(username = %credentials.username, "password mismatch");
            Ok(LoginOutcome::BadPassword)
        }
    }
}

/// [`Datastore`] over a SQL database
pub struct Database {
    conn: ConnectionManager,
}

impl Database {
    /// Resolve the connection string and open it.
    pub async fn connect(conn_str: &str, policy: RetryPolicy) -> Result<Self> {
        let source = DataSource::parse(conn_str)?;
        Self::open(source, policy).await
    }

    pub async fn open(source: DataSource, policy: RetryPolicy) -> Result<Self> {
        let conn = ConnectionManager::connect(source, policy).await?;
        Ok(Self { conn })
    }

    pub fn dialect(&self) -> Dialect {
        self.conn.dialect()
    }

    pub fn accounts(&self) -> AccountRepo<'_> {
        AccountRepo::new(&self.conn)
    }

    pub fn mappings(&self) -> MappingRepo<'_> {
        MappingRepo::new(&self.conn)
    }

    pub async fn close(&self) {
        info!("closing datasource");
        self.conn.close().await;
    }
}

#[async_trait]
impl Datastore for Database {
    async fn account_lookup(&self, username: &str) -> Result<AccountSecret> {
        self.accounts().lookup(username).await
    }

    async fn account_get(&self, id: AccountId) -> Result<Account> {
        self.accounts().get(id).await
    }

    async fn account_list(&self, page: u32, page_size: u32, search: &str) -> Result<AccountPage> {
        self.accounts().list(page, page_size, search).await
    }

    async fn account_create(&self, account: &NewAccount) -> Result<AccountId> {
        self.accounts().create(account).await
    }

    async fn account_update(&self, account: &Account) -> Result<()> {
        self.accounts().update(account).await
    }

    async fn account_update_password(&self, id: AccountId, password: &str) -> Result<()> {
        self.accounts().update_password(id, password).await
    }

    async fn account_delete(&self, id: AccountId) -> Result<()> {
        self.accounts().delete(id).await
    }

    async fn mapping_retrieve(&self, system: &str, id: &str) -> Result<Mapping> {
        self.mappings().retrieve(system, id).await
    }

    async fn mapping_delete(&self, system: &str, id: &str) -> Result<u64> {
        self.mappings().delete(system, id).await
    }

    async fn mapping_upsert(&self, mapping: &NewMapping) -> Result<UpsertOutcome> {
        self.mappings().upsert(mapping).await
    }

    async fn system_directory(&self, system: &str) -> Result<SystemDirectory> {
        self.mappings().directory(system).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers lookups from a single fixed account; everything else is
    /// unreachable in these tests.
    struct OneUser {
        lookups: AtomicUsize,
        broken: bool,
    }

    impl OneUser {
        fn new() -> Self {
            Self {
                lookups: AtomicUsize::new(0),
                broken: false,
            }
        }
    }

    #[async_trait]
    impl Datastore for OneUser {
        async fn account_lookup(&self, username: &str) -> Result<AccountSecret> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            if username != "alice" {
                return Err(DataError::not_found("account", username));
            }
            Ok(AccountSecret {
                account: Account {
                    id: 5,
                    username: "alice".into(),
                    description: "Alice".into(),
                },
                password: "s3cret".into(),
            })
        }

        async fn account_get(&self, _: AccountId) -> Result<Account> {
            unimplemented!()
        }
        async fn account_list(&self, _: u32, _: u32, _: &str) -> Result<AccountPage> {
            unimplemented!()
        }
        async fn account_create(&self, _: &NewAccount) -> Result<AccountId> {
            unimplemented!()
        }
        async fn account_update(&self, _: &Account) -> Result<()> {
            unimplemented!()
        }
        async fn account_update_password(&self, _: AccountId, _: &str) -> Result<()> {
            unimplemented!()
        }
        async fn account_delete(&self, _: AccountId) -> Result<()> {
            unimplemented!()
        }
        async fn mapping_retrieve(&self, _: &str, _: &str) -> Result<Mapping> {
            unimplemented!()
        }
        async fn mapping_delete(&self, _: &str, _: &str) -> Result<u64> {
            unimplemented!()
        }
        async fn mapping_upsert(&self, _: &NewMapping) -> Result<UpsertOutcome> {
            unimplemented!()
        }
        async fn system_directory(&self, _: &str) -> Result<SystemDirectory> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn matching_password_authenticates() {
        let store = OneUser::new();
        let outcome = store
            .verify_login(&Credentials::new("alice", "s3cret"))
            .await
            .unwrap();
        match outcome {
            LoginOutcome::Authenticated(account) => assert_eq!(account.id, 5),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user() {
        let store = OneUser::new();
        assert_eq!(
            store
                .verify_login(&Credentials::new("alice", "nope"))
                .await
                .unwrap(),
            LoginOutcome::BadPassword
        );
        assert_eq!(
            store
                .verify_login(&Credentials::new("mallory", "s3cret"))
                .await
                .unwrap(),
            LoginOutcome::UnknownUser
        );
    }

    #[tokio::test]
    async fn blank_credentials_skip_storage() {
        let store = OneUser::new();
        for creds in [
            Credentials::new("", "s3cret"),
            Credentials::new("alice", ""),
            Credentials::default(),
        ] {
            assert_eq!(
                store.verify_login(&creds).await.unwrap(),
                LoginOutcome::BlankCredentials
            );
        }
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let store = OneUser {
            broken: true,
            ..OneUser::new()
        };
        let err = store
            .verify_login(&Credentials::new("alice", "s3cret"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Sqlx(sqlx::Error::PoolTimedOut)));
    }
}
