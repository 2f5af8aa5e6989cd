//! Storage port for the purchase service.
//!
//! A [`Store`] begins [`Transaction`]s; every read and write goes through a
//! transaction so the purchase path can be committed or rolled back as one
//! unit. Two backends are provided: [`InMemoryStore`] for tests and local
//! runs, and [`PostgresStore`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PostgresStore, PostgresTransaction};
pub use store::{Store, StoreExt, Transaction};
