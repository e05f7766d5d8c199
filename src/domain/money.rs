use crate::error::{ArisanError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A monetary value in whole currency units (rupiah).
///
/// Wraps `rust_decimal::Decimal` so that contribution arithmetic never goes
/// through floating point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Accepts zero or positive amounts only.
    pub fn non_negative(amount: Decimal, what: &str) -> Result<Self> {
        if amount < Decimal::ZERO {
            Err(ArisanError::ValidationError(format!(
                "{what} must not be negative (got {amount})"
            )))
        } else {
            Ok(Self(amount))
        }
    }

    /// Accepts strictly positive amounts only.
    pub fn positive(amount: Decimal, what: &str) -> Result<Self> {
        if amount > Decimal::ZERO {
            Ok(Self(amount))
        } else {
            Err(ArisanError::ValidationError(format!(
                "{what} must be positive (got {amount})"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `None` when the sum leaves the range of `Decimal`.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Rounds to whole units, halves away from zero.
    pub fn round_to_unit(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Clamps negative values to zero.
    pub fn floor_at_zero(self) -> Self {
        if self.0 < Decimal::ZERO {
            Self::ZERO
        } else {
            self
        }
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
