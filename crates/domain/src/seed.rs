//! Startup seed data.

use common::{Customer, Money, NewCustomer, NewProduct, Product};
use store::{Store, StoreError};

/// Rows written by [`seed`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub customer: Customer,
    pub products: Vec<Product>,
}

/// The default dataset: one funded customer and two products.
pub fn default_seed() -> (NewCustomer, Vec<NewProduct>) {
    (
        NewCustomer::new("Vivek Singh", Money::from_units(100)),
        vec![
            NewProduct::new("Laptop", Money::from_units(80)),
            NewProduct::new("Phone", Money::from_units(50)),
        ],
    )
}

/// Inserts a customer and products in a single transaction.
#[tracing::instrument(skip_all, fields(products = products.len()))]
pub async fn seed<S: Store + ?Sized>(
    store: &S,
    customer: NewCustomer,
    products: Vec<NewProduct>,
) -> Result<SeedData, StoreError> {
    let mut tx = store.begin().await?;
    let customer = tx.insert_customer(customer).await?;
    let products = tx.insert_products(products).await?;
    tx.commit().await?;

    tracing::info!(
        customer_id = %customer.id,
        products = products.len(),
        "seed data loaded"
    );
    Ok(SeedData { customer, products })
}
