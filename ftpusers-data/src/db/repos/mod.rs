//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the shared [`ConnectionManager`](super::ConnectionManager)
//! - Probes liveness before every statement
//! - Lets constraints reject conflicts, then classifies the driver error

pub mod accounts;
pub mod mappings;

pub use accounts::AccountRepo;
pub use mappings::MappingRepo;
