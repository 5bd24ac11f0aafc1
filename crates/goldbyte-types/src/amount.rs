//! Amount types with 18-decimal precision
//!
//! GoldByte uses fixed-point arithmetic on integer base units: one GB token
//! (backed by one unit of reserve, e.g. one gram of gold) is `10^18` base
//! units. All arithmetic is overflow-checked; nothing here rounds except
//! [`Amount::basis_points`], which truncates toward zero.
//!
//! On the wire both types travel as decimal strings of base units, so
//! `"1000000000000000000"` is one token.

use crate::{LedgerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits in a token amount
pub const DECIMALS: u32 = 18;

/// Base units in one whole token (`10^18`)
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Denominator for basis-point rates (100 bps = 1%)
pub const BASIS_POINTS_SCALE: u32 = 10_000;

/// Non-negative token or reserve amount in base units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from raw base units
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Create an amount of whole tokens
    pub const fn from_whole(whole: u64) -> Self {
        // u64::MAX * 10^18 < u128::MAX
        Self(whole as u128 * UNIT)
    }

    /// Raw base units
    pub const fn units(self) -> u128 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Checked subtraction, `None` when `other > self`
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiply by basis points (0-10000, where 100 = 1%), truncating toward zero.
    ///
    /// Computes `floor(self * bps / 10000)` exactly without intermediate
    /// overflow. Rates above 10000 bps are clamped to 100%.
    pub fn basis_points(self, bps: u32) -> Self {
        let bps = bps.min(BASIS_POINTS_SCALE) as u128;
        let scale = BASIS_POINTS_SCALE as u128;
        let whole = self.0 / scale;
        let rest = self.0 % scale;
        Self(whole * bps + rest * bps / scale)
    }

    /// Parse a human decimal such as `"99.93"` or `"1000"`.
    ///
    /// At most 18 fractional digits are accepted; signs, exponents and
    /// separators are rejected.
    pub fn parse_decimal(input: &str) -> Result<Self> {
        let s = input.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid(input, "no digits"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(input, "only digits and a single '.' are allowed"));
        }
        if fraction.len() > DECIMALS as usize {
            return Err(invalid(input, "more than 18 fractional digits"));
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| LedgerError::AmountOverflow)?
                .checked_mul(UNIT)
                .ok_or(LedgerError::AmountOverflow)?
        };

        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let padding = 10u128.pow(DECIMALS - fraction.len() as u32);
            // At most 18 digits, always fits
            fraction
                .parse::<u128>()
                .map_err(|_| invalid(input, "bad fraction"))?
                * padding
        };

        whole_units
            .checked_add(fraction_units)
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Parse a decimal string of raw base units (the wire format)
    pub fn parse_units(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(input, "expected base units as a decimal integer"));
        }
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| LedgerError::AmountOverflow)
    }

    /// Human-readable decimal with trailing zeros trimmed (e.g. `"99.93"`)
    pub fn to_decimal_string(self) -> String {
        let whole = self.0 / UNIT;
        let fraction = self.0 % UNIT;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{:018}", fraction);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

fn invalid(input: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidAmount {
        message: format!("'{}': {}", input, reason),
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_decimal(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse_units(&raw).map_err(serde::de::Error::custom)
    }
}

/// Signed amount in base units, used for net interbank positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedAmount(i128);

impl SignedAmount {
    /// The zero amount
    pub const ZERO: SignedAmount = SignedAmount(0);

    /// Create from raw signed base units
    pub const fn from_units(units: i128) -> Self {
        Self(units)
    }

    /// Raw signed base units
    pub const fn units(self) -> i128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Checked negation
    pub fn checked_neg(self) -> Result<Self> {
        self.0
            .checked_neg()
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Absolute value as an unsigned amount
    pub fn magnitude(self) -> Amount {
        Amount(self.0.unsigned_abs())
    }

    /// Human-readable signed decimal (e.g. `"-99.93"`)
    pub fn to_decimal_string(self) -> String {
        let magnitude = self.magnitude().to_decimal_string();
        if self.is_negative() {
            format!("-{}", magnitude)
        } else {
            magnitude
        }
    }
}

impl TryFrom<Amount> for SignedAmount {
    type Error = LedgerError;

    fn try_from(amount: Amount) -> Result<Self> {
        i128::try_from(amount.0)
            .map(Self)
            .map_err(|_| LedgerError::AmountOverflow)
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Serialize for SignedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for SignedAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<i128>()
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid signed amount '{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let amt = Amount::parse_decimal("99.93").unwrap();
        assert_eq!(amt.units(), 99_930_000_000_000_000_000);
        assert_eq!(amt.to_string(), "99.93");

        assert_eq!(Amount::parse_decimal("1000").unwrap(), Amount::from_whole(1000));
        assert_eq!(Amount::parse_decimal(".5").unwrap().units(), UNIT / 2);
        assert_eq!(Amount::parse_decimal("0.000000000000000001").unwrap().units(), 1);
        assert_eq!(Amount::from_whole(7).to_string(), "7");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", ".", "-1", "1.2.3", "1e5", "abc", "0.0000000000000000001"] {
            assert!(
                matches!(Amount::parse_decimal(bad), Err(LedgerError::InvalidAmount { .. })),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            Amount::parse_decimal("999999999999999999999999999999"),
            Err(LedgerError::AmountOverflow)
        ));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(Amount::parse_units("1000000000000000000").unwrap(), Amount::from_whole(1));
        assert!(Amount::parse_units("1.5").is_err());
        assert!(Amount::parse_units("").is_err());
    }

    #[test]
    fn test_fee_basis_points_truncate() {
        // 0.07% of 100 tokens is exactly 0.07
        let fee = Amount::from_whole(100).basis_points(7);
        assert_eq!(fee.to_string(), "0.07");

        // floor(10001 * 7 / 10000) = 7
        assert_eq!(Amount::from_units(10_001).basis_points(7).units(), 7);
        // Dust amounts carry no fee
        assert_eq!(Amount::from_units(1_428).basis_points(7).units(), 0);
        assert_eq!(Amount::from_units(1_429).basis_points(7).units(), 1);

        // No intermediate overflow at the top of the range
        let max = Amount::from_units(u128::MAX);
        assert_eq!(max.basis_points(10_000), max);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::from_whole(100);
        let b = Amount::from_whole(40);
        assert_eq!(a.checked_add(b).unwrap(), Amount::from_whole(140));
        assert_eq!(a.checked_sub(b), Some(Amount::from_whole(60)));
        assert_eq!(b.checked_sub(a), None);
        assert!(matches!(
            Amount::from_units(u128::MAX).checked_add(Amount::from_units(1)),
            Err(LedgerError::AmountOverflow)
        ));
    }

    #[test]
    fn test_signed_amount() {
        let owed = SignedAmount::try_from(Amount::parse_decimal("99.93").unwrap()).unwrap();
        let neg = owed.checked_neg().unwrap();
        assert!(neg.is_negative());
        assert_eq!(neg.to_string(), "-99.93");
        assert_eq!(neg.magnitude(), owed.magnitude());
        assert!(owed.checked_add(neg).unwrap().is_zero());
        assert!(SignedAmount::try_from(Amount::from_units(u128::MAX)).is_err());
    }

    #[test]
    fn test_serde_uses_base_unit_strings() {
        let amt = Amount::from_whole(1);
        let json = serde_json::to_string(&amt).unwrap();
        assert_eq!(json, "\"1000000000000000000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amt);

        let signed: SignedAmount = serde_json::from_str("\"-5\"").unwrap();
        assert_eq!(signed.units(), -5);
    }
}
