//! Domain layer for the purchase service.
//!
//! This crate provides:
//! - [`PurchaseService`], the guarded balance debit that records an order
//! - [`PurchaseError`], the tagged failure kinds of a purchase
//! - seed data loading for a fresh store

pub mod error;
pub mod purchase;
pub mod seed;

pub use error::PurchaseError;
pub use purchase::{Purchase, PurchaseService};
pub use seed::{SeedData, default_seed, seed};
