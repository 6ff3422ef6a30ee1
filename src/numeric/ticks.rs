// ============================================================================
// Tick and Lot Units
// Integer newtypes for prices and sizes
// ============================================================================

use super::errors::{NumericError, NumericResult};
use rust_decimal::Decimal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generates an unsigned integer unit newtype with checked arithmetic.
macro_rules! integer_unit {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const ZERO: Self = Self(0);
            pub const MAX: Self = Self(u64::MAX);

            #[inline]
            pub const fn new(units: u64) -> Self {
                Self(units)
            }

            /// Raw number of units.
            #[inline]
            pub const fn value(self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }

            /// Checked addition.
            ///
            /// # Errors
            /// Returns `Overflow` if the sum exceeds `u64::MAX`.
            #[inline]
            pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
                self.0
                    .checked_add(rhs.0)
                    .map(Self)
                    .ok_or(NumericError::Overflow)
            }

            /// Checked subtraction.
            ///
            /// # Errors
            /// Returns `Underflow` if `rhs > self`.
            #[inline]
            pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
                self.0
                    .checked_sub(rhs.0)
                    .map(Self)
                    .ok_or(NumericError::Underflow)
            }

            /// Convert to human units given the size of one unit
            /// (tick size for prices, lot size for quantities).
            pub fn to_decimal(self, unit: Decimal) -> NumericResult<Decimal> {
                Decimal::from(self.0)
                    .checked_mul(unit)
                    .ok_or(NumericError::InvalidScale)
            }
        }

        impl From<u64> for $name {
            fn from(units: u64) -> Self {
                Self(units)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_unit!(
    /// Limit price expressed in integer tick units.
    Price
);

integer_unit!(
    /// Order or trade size expressed in integer lot units.
    Quantity
);

impl Price {
    /// Notional value of `size` lots at this price, in tick-lots.
    ///
    /// The product of two `u64` values always fits in `u128`.
    #[inline]
    pub fn notional(self, size: Quantity) -> u128 {
        u128::from(self.0) * u128::from(size.0)
    }

    /// Absolute distance between two prices in ticks.
    #[inline]
    pub fn distance(self, other: Price) -> u64 {
        self.0.abs_diff(other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let a = Quantity::new(10);
        let b = Quantity::new(3);

        assert_eq!(a.checked_sub(b).unwrap(), Quantity::new(7));
        assert_eq!(a.checked_add(b).unwrap(), Quantity::new(13));
        assert_eq!(b.checked_sub(a), Err(NumericError::Underflow));
        assert_eq!(Quantity::MAX.checked_add(b), Err(NumericError::Overflow));
    }

    #[test]
    fn test_ordering_and_min() {
        assert!(Price::new(100) < Price::new(101));
        assert_eq!(Quantity::new(4).min(Quantity::new(2)), Quantity::new(2));
        assert!(Quantity::ZERO.is_zero());
    }

    #[test]
    fn test_to_decimal() {
        // 50_012 ticks of 0.01
        let price = Price::new(50_012);
        assert_eq!(
            price.to_decimal(Decimal::new(1, 2)).unwrap(),
            Decimal::new(50_012, 2)
        );
    }

    #[test]
    fn test_notional_does_not_overflow() {
        let notional = Price::MAX.notional(Quantity::MAX);
        assert_eq!(notional, u128::from(u64::MAX) * u128::from(u64::MAX));
        assert_eq!(Price::new(100).notional(Quantity::new(5)), 500);
    }

    #[test]
    fn test_display_and_debug() {
        assert_eq!(Price::new(42).to_string(), "42");
        assert_eq!(format!("{:?}", Quantity::new(7)), "Quantity(7)");
    }
}
