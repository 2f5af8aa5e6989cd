//! HTTP route handlers.

pub mod ops;
pub mod purchase;
