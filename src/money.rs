//! Fixed-point currency amounts.
//!
//! Amounts are kept as integer cents so weekly and monthly totals never pick
//! up floating-point drift. On the wire they are plain JSON numbers with at
//! most two fraction digits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use thiserror::Error;

/// Largest magnitude (in cents) that still converts to an `f64` exactly.
const MAX_CENTS: i64 = 1 << 53;

#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("'{0}' is not a number")]
    Invalid(String),
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount is too large")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Upper bound for a single amount and for any ledger total.
    pub const MAX: Money = Money(MAX_CENTS);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a decimal amount, rounding half away from zero to whole cents.
    pub fn from_decimal(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_CENTS as f64 {
            return Err(MoneyError::OutOfRange);
        }
        Ok(Self(cents as i64))
    }

    /// Sums `amounts`, or `None` once the running total leaves
    /// `-MAX..=MAX`. Totals inside that range can't overflow `i64`
    /// arithmetic and stay exact as JSON numbers.
    pub fn checked_total(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(0_i64, |total, amount| {
                total
                    .checked_add(amount.0)
                    .filter(|sum| sum.abs() <= MAX_CENTS)
            })
            .map(Money)
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses user input such as `"12.50"`, `"12,50"` or `"R$ 12.50"`.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
        let normalized = trimmed.replace(',', ".");
        let value: f64 = normalized
            .parse()
            .map_err(|_| MoneyError::Invalid(input.trim().to_string()))?;
        Self::from_decimal(value)
    }

    /// Formats with the Brazilian real symbol, e.g. `R$ 1000.00`.
    pub fn format_brl(self) -> String {
        if self.is_negative() {
            format!("-R$ {}", -self)
        } else {
            format!("R$ {self}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value).map_err(serde::de::Error::custom)
    }
}
