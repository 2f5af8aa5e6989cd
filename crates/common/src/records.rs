//! Persisted records and the data needed to insert them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Money, OrderId, ProductId};

/// A customer and their spendable balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub balance: Money,
}

/// Insert form of [`Customer`]; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub balance: Money,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// A product offered at a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

/// Insert form of [`Product`]; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// A completed purchase linking one customer to one product.
///
/// Orders are written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// Insert form of [`CustomerOrder`]; the store assigns the id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId, product_id: ProductId) -> Self {
        Self {
            customer_id,
            product_id,
        }
    }
}

impl Customer {
    /// Returns true if the balance covers the product's price.
    pub fn can_afford(&self, product: &Product) -> bool {
        self.balance.covers(product.price)
    }
}
