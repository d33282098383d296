//! Database layer - connection management and repositories
//!
//! # Design Principles
//!
//! - One shared pool, checked with a ping before every operation
//! - Queries are written once in the neutral dialect and rewritten per engine
//! - Rely on DB constraints and classify the conflict; no check-then-insert
//! - No multi-statement transactions; each statement autocommits

pub mod connection;
pub mod repos;

pub use connection::{ConnectionManager, Live, RetryPolicy};
pub use repos::{AccountRepo, MappingRepo};
