//! Fixed-point arithmetic implementation
//!
//! Prices, balances and quantities travel as decimal strings on the wire and
//! are kept as exact decimals in memory, so moving averages and order
//! quantities never pick up binary floating point noise.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, Sub, Mul, Div, AddAssign, SubAssign};
use std::str::FromStr;

/// Fixed-point decimal type for precise financial calculations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    /// Zero value
    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    /// One value
    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    /// Create a Fixed from an integer
    pub fn from_i64(value: i64) -> Self {
        Fixed { value: Decimal::from(value) }
    }

    /// Parse a decimal string such as `"612.34000000"`
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        Decimal::from_str(s.trim())
            .map(Fixed::from)
            .map_err(|_| FixedError::InvalidValue(s.to_string()))
    }

    /// Check if the value is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Number of digits after the decimal point as currently stored
    pub fn scale(&self) -> u32 {
        self.value.scale()
    }

    /// Strip trailing zeros (`"1.50000000"` becomes `"1.5"`)
    pub fn normalize(&self) -> Self {
        Fixed { value: self.value.normalize() }
    }

    /// Round to specified decimal places (banker's rounding)
    pub fn round_dp(&self, dp: u32) -> Self {
        Fixed { value: self.value.round_dp(dp) }
    }

    /// Truncate toward zero to `scale` decimal places, never rounding up
    pub fn trunc_with_scale(&self, scale: u32) -> Self {
        Fixed {
            value: self.value.trunc_with_scale(scale).normalize(),
        }
    }

    /// Truncate toward zero to a whole multiple of `step`
    ///
    /// A non-positive step leaves the value untouched.
    pub fn trunc_to_step(&self, step: Fixed) -> Self {
        if !step.is_positive() {
            return *self;
        }
        let steps = (self.value / step.value).trunc();
        Fixed { value: (steps * step.value).normalize() }
    }

    /// Decimal places implied by an exchange step size (`0.00100000` gives 3)
    pub fn step_precision(&self) -> u32 {
        self.value.normalize().scale()
    }

    /// Division that reports a zero divisor instead of panicking
    pub fn checked_div(&self, rhs: Fixed) -> Result<Fixed, FixedError> {
        self.value
            .checked_div(rhs.value)
            .map(Fixed::from)
            .ok_or(FixedError::DivisionByZero)
    }

    /// Arithmetic mean, `None` for an empty slice
    pub fn mean(values: &[Fixed]) -> Option<Fixed> {
        if values.is_empty() {
            return None;
        }
        let sum: Fixed = values.iter().copied().sum();
        Some(sum / Fixed::from_i64(values.len() as i64))
    }
}

/// Fixed-point arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Invalid decimal value: {0}")]
    InvalidValue(String),
    #[error("Division by zero")]
    DivisionByZero,
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed { value: self.value + rhs.value }
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Self) -> Self::Output {
        Fixed { value: self.value - rhs.value }
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Self) -> Self::Output {
        Fixed { value: self.value * rhs.value }
    }
}

impl Div for Fixed {
    type Output = Fixed;

    fn div(self, rhs: Self) -> Self::Output {
        Fixed { value: self.value / rhs.value }
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Self {
        iter.fold(Fixed::ZERO, |acc, x| acc + x)
    }
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}
