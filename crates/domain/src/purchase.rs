//! The purchase operation: a guarded balance debit that records an order.

use std::time::Instant;

use common::{Customer, CustomerId, CustomerOrder, NewOrder, Product, ProductId};
use store::{Store, Transaction};

use crate::error::PurchaseError;

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    /// The customer after the debit.
    pub customer: Customer,

    /// The purchased product.
    pub product: Product,

    /// The order recorded for this purchase.
    pub order: CustomerOrder,
}

/// Service that executes purchases against a store.
///
/// Each purchase runs in its own transaction: the balance check, the debit,
/// and the order insert are committed together or not at all.
pub struct PurchaseService<S: Store> {
    store: S,
}

impl<S: Store> PurchaseService<S> {
    /// Creates a new purchase service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Debits the product's price from the customer's balance and records
    /// an order.
    ///
    /// Checks run in order: the customer must exist, then the product must
    /// exist, then the balance must cover the price. Any failure leaves the
    /// store untouched. Calling this twice debits twice.
    #[tracing::instrument(skip(self))]
    pub async fn purchase(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Purchase, PurchaseError> {
        let start = Instant::now();
        let result = self.execute(customer_id, product_id).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome(),
        };
        metrics::counter!("purchases_total", "outcome" => outcome).increment(1);
        metrics::histogram!("purchase_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(purchase) => tracing::info!(
                order_id = %purchase.order.id,
                balance = %purchase.customer.balance,
                "purchase completed"
            ),
            Err(PurchaseError::Storage(err)) => {
                tracing::error!(error = %err, "purchase failed in storage");
            }
            Err(err) => tracing::warn!(reason = outcome, error = %err, "purchase rejected"),
        }

        result
    }

    async fn execute(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Purchase, PurchaseError> {
        let mut tx = self.store.begin().await?;

        match debit_and_record(&mut *tx, customer_id, product_id).await {
            Ok(purchase) => {
                tx.commit().await?;
                Ok(purchase)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

async fn debit_and_record(
    tx: &mut dyn Transaction,
    customer_id: CustomerId,
    product_id: ProductId,
) -> Result<Purchase, PurchaseError> {
    let mut customer = tx
        .find_customer(customer_id)
        .await?
        .ok_or(PurchaseError::CustomerNotFound(customer_id))?;

    let product = tx
        .find_product(product_id)
        .await?
        .ok_or(PurchaseError::ProductNotFound(product_id))?;

    customer.balance =
        customer
            .balance
            .checked_sub(product.price)
            .ok_or(PurchaseError::InsufficientFunds {
                balance: customer.balance,
                price: product.price,
            })?;

    tx.update_customer(&customer).await?;
    let order = tx
        .insert_order(NewOrder::new(customer.id, product.id))
        .await?;

    Ok(Purchase {
        customer,
        product,
        order,
    })
}
