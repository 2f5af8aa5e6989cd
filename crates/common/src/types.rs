use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

row_id! {
    /// Identifier of a customer row, assigned by the store on insert.
    CustomerId
}

row_id! {
    /// Identifier of a product row, assigned by the store on insert.
    ProductId
}

row_id! {
    /// Identifier of a customer order row, assigned by the store on insert.
    OrderId
}

/// Rejected money amount.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Invalid money amount: {0} (must be finite and non-negative)")]
pub struct InvalidMoney(pub f64);

/// Non-negative monetary amount.
///
/// Stored as `f64` to match the double precision columns of the store.
/// Arithmetic is plain floating point; no rounding is applied.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(f64);

impl Money {
    /// Creates a money amount, rejecting negative and non-finite values.
    pub fn new(amount: f64) -> Result<Self, InvalidMoney> {
        if amount.is_finite() && amount >= 0.0 {
            // Normalizes -0.0.
            Ok(Self(amount + 0.0))
        } else {
            Err(InvalidMoney(amount))
        }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a money amount from whole currency units.
    pub const fn from_units(units: u32) -> Self {
        Self(units as f64)
    }

    /// Returns the raw amount.
    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Returns true if this amount is at least `price`.
    pub fn covers(&self, price: Money) -> bool {
        self.0 >= price.0
    }

    /// Subtracts `other`, returning `None` if the result would be negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if self.covers(other) {
            Some(Self(self.0 - other.0))
        } else {
            None
        }
    }
}

impl TryFrom<f64> for Money {
    type Error = InvalidMoney;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
