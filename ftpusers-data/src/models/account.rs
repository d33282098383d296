//! FTP account records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned account identifier
pub type AccountId = u32;

/// An account as it is shown to callers. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub description: String,
}

/// Input for account creation
#[derive(Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub description: String,
    pub password: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("description", &self.description)
            .field("password", &"***")
            .finish()
    }
}

/// Lookup result used for authentication; the stored password is
/// populated.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountSecret {
    pub account: Account,
    pub password: String,
}

impl AccountSecret {
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn into_account(self) -> Account {
        self.account
    }
}

impl fmt::Debug for AccountSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSecret")
            .field("account", &self.account)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_passwords() {
        let secret = AccountSecret {
            account: Account {
                id: 1,
                username: "bob".into(),
                description: "Bob".into(),
            },
            password: "hunter2".into(),
        };
        assert!(!format!("{secret:?}").contains("hunter2"));

        let new = NewAccount {
            username: "bob".into(),
            description: "Bob".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{new:?}").contains("hunter2"));
    }

    #[test]
    fn account_json_has_no_password_field() {
        let json = serde_json::to_value(Account {
            id: 3,
            username: "carol".into(),
            description: "Carol".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "username": "carol", "description": "Carol"})
        );
    }
}
