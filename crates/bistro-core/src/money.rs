//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill total that is off by one unit is a support ticket.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    85 000 + 75 000 × 2 = 235 000    ✅ exact, always                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::Money;
//!
//! let unit_price = Money::from_units(85_000);
//! let line_total = unit_price * 2;
//! assert_eq!(line_total.units(), 170_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Persists as a plain JSON number
///
/// Every price, line total and bill total in the system flows through this
/// type. Only the UI converts to a display currency string.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor currency units.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let price = Money::from_units(75_000);
    /// assert_eq!(price.units(), 75_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in minor currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks whether the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks whether the amount is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, saturating at the numeric bounds.
    ///
    /// Quantities are bounded upstream (see `MAX_ITEM_QUANTITY`), so
    /// saturation is unreachable in practice; it exists so arithmetic here
    /// can never panic.
    #[inline]
    pub const fn times(&self, quantity: i64) -> Self {
        Money(self.0.saturating_mul(quantity))
    }
}

// =============================================================================
// Arithmetic Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, quantity: i64) -> Money {
        self.times(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    /// Formats with thousands separators: `85000` → `85,000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if negative {
            write!(f, "-{grouped}")
        } else {
            write!(f, "{grouped}")
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_units(85_000);
        let b = Money::from_units(75_000);

        assert_eq!((a + b).units(), 160_000);
        assert_eq!((a - b).units(), 10_000);
        assert_eq!((b * 2).units(), 150_000);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [85_000, 75_000, 15_000]
            .into_iter()
            .map(Money::from_units)
            .sum();
        assert_eq!(total.units(), 175_000);
    }

    #[test]
    fn test_money_saturates_instead_of_overflowing() {
        let max = Money::from_units(i64::MAX);
        assert_eq!((max + Money::from_units(1)).units(), i64::MAX);
        assert_eq!(max.times(2).units(), i64::MAX);
    }

    #[test]
    fn test_money_display_grouping() {
        assert_eq!(Money::from_units(0).to_string(), "0");
        assert_eq!(Money::from_units(999).to_string(), "999");
        assert_eq!(Money::from_units(85_000).to_string(), "85,000");
        assert_eq!(Money::from_units(1_234_567).to_string(), "1,234,567");
        assert_eq!(Money::from_units(-15_000).to_string(), "-15,000");
    }
}
