use common::{CustomerId, InvalidMoney, ProductId};
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write referenced a customer that does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// A write referenced a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A stored amount could not be represented as money.
    #[error("Invalid stored amount: {0}")]
    InvalidAmount(#[from] InvalidMoney),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A failure injected through the in-memory store's test hooks.
    #[error("Injected fault: {0}")]
    InjectedFault(&'static str),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
