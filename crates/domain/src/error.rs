//! Purchase error types.

use common::{CustomerId, Money, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during a purchase.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// No customer exists with the given id.
    #[error("Customer not found")]
    CustomerNotFound(CustomerId),

    /// No product exists with the given id.
    #[error("Product not found")]
    ProductNotFound(ProductId),

    /// The customer's balance does not cover the product's price.
    #[error("Insufficient funds for the purchase")]
    InsufficientFunds { balance: Money, price: Money },

    /// The store failed while reading, writing, or committing.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl PurchaseError {
    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            PurchaseError::CustomerNotFound(_) => "customer_not_found",
            PurchaseError::ProductNotFound(_) => "product_not_found",
            PurchaseError::InsufficientFunds { .. } => "insufficient_funds",
            PurchaseError::Storage(_) => "storage_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_caller_facing_text() {
        let err = PurchaseError::InsufficientFunds {
            balance: Money::from_units(50),
            price: Money::from_units(80),
        };
        assert_eq!(err.to_string(), "Insufficient funds for the purchase");
        assert_eq!(
            PurchaseError::CustomerNotFound(CustomerId::new(1)).to_string(),
            "Customer not found"
        );
        assert_eq!(
            PurchaseError::ProductNotFound(ProductId::new(1)).to_string(),
            "Product not found"
        );
    }

    #[test]
    fn outcome_labels() {
        let err = PurchaseError::Storage(StoreError::InjectedFault("order insert"));
        assert_eq!(err.outcome(), "storage_error");
        assert_eq!(
            PurchaseError::ProductNotFound(ProductId::new(2)).outcome(),
            "product_not_found"
        );
    }
}
