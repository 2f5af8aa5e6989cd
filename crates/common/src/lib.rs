//! Shared types for the purchase service.
//!
//! Identifiers and money live in [`types`]; the three persisted records
//! (customer, product, order) and their insert forms live in [`records`].

pub mod records;
pub mod types;

pub use records::{Customer, CustomerOrder, NewCustomer, NewOrder, NewProduct, Product};
pub use types::{CustomerId, InvalidMoney, Money, OrderId, ProductId};
