//! Entity models handed across the data layer boundary
//!
//! Read-side types serialize; write-side types only deserialize. Nothing
//! that carries a password is ever `Serialize`.

pub mod account;
pub mod credentials;
pub mod mapping;
pub mod pagination;

pub use account::{Account, AccountId, AccountSecret, NewAccount};
pub use credentials::{Credentials, LoginOutcome};
pub use mapping::{Mapping, NewMapping, SystemDirectory, UpsertOutcome};
pub use pagination::{AccountPage, Pagination, SearchFilter, DEFAULT_PAGE_SIZE};
