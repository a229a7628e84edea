// SPDX-License-Identifier: MIT

//! Exact decimal values for numeric comparison
//!
//! Bounds and guard comparisons must not go through `f64`: integers past
//! 2^53 collapse together and tiny fractions would compare equal to zero.
//! A `Decimal` keeps every digit, so ordering is exact for anything a JSON
//! number or a decimal string can spell.

use serde_json::Number;
use std::cmp::Ordering;

/// `digits × 10^-scale`, normalised so equal values are structurally equal
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decimal {
    negative: bool,
    /// Most significant first, no leading or trailing zeros; empty for zero
    digits: Vec<u8>,
    scale: i64,
}

impl Decimal {
    fn zero() -> Self {
        Self {
            negative: false,
            digits: Vec::new(),
            scale: 0,
        }
    }

    /// Parse decimal text such as `-12.50`, `.5` or `1e-17`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, rest) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => (&rest[..at], rest[at + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();
        let mut scale = i64::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;

        let leading = digits.iter().take_while(|&&d| d == 0).count();
        digits.drain(..leading);
        while digits.last() == Some(&0) {
            digits.pop();
            scale = scale.checked_sub(1)?;
        }
        if digits.is_empty() {
            return Some(Self::zero());
        }
        Some(Self {
            negative,
            digits,
            scale,
        })
    }

    /// Exact value of a JSON number, as written by serde_json
    pub fn from_number(number: &Number) -> Option<Self> {
        Self::parse(&number.to_string())
    }

    fn signum(&self) -> i8 {
        match (self.digits.is_empty(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }

    /// Power of ten just above the leading digit
    fn magnitude(&self) -> i64 {
        self.digits.len() as i64 - self.scale
    }

    fn cmp_abs(&self, other: &Self) -> Ordering {
        self.magnitude()
            .cmp(&other.magnitude())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        let mut digits: Vec<u8> = value
            .unsigned_abs()
            .to_string()
            .bytes()
            .map(|b| b - b'0')
            .collect();
        let mut scale = 0;
        while digits.last() == Some(&0) {
            digits.pop();
            scale -= 1;
        }
        if digits.is_empty() {
            return Self::zero();
        }
        Self {
            negative: value < 0,
            digits,
            scale,
        }
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match self.signum() {
            0 => Ordering::Equal,
            1 => self.cmp_abs(other),
            _ => other.cmp_abs(self),
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(text: &str) -> Decimal {
        Decimal::parse(text).unwrap()
    }

    fn num(value: serde_json::Value) -> Decimal {
        match value {
            serde_json::Value::Number(n) => Decimal::from_number(&n).unwrap(),
            other => panic!("Expected a number, got {other}"),
        }
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("100"), Decimal::from(100));
        assert_eq!(dec("-0.0"), dec("0"));
        assert_eq!(dec("007"), dec("7"));
        assert_eq!(dec(".5"), dec("0.5"));
    }

    #[test]
    fn test_integers_past_f64_precision() {
        let bound = Decimal::from(9_007_199_254_740_992);
        let value = num(json!(9_007_199_254_740_993_u64));
        assert_eq!(value.cmp(&bound), Ordering::Greater);
        assert_eq!(
            num(json!(u64::MAX)).cmp(&Decimal::from(i64::MAX)),
            Ordering::Greater
        );
        assert_eq!(Decimal::from(i64::MIN), dec("-9223372036854775808"));
    }

    #[test]
    fn test_tiny_fraction_is_not_zero() {
        let tiny = num(json!(1e-17));
        assert!(tiny > Decimal::from(0));
        assert_ne!(tiny, Decimal::from(0));
        assert!(num(json!(-1e-17)) < Decimal::from(0));
    }

    #[test]
    fn test_negative_ordering() {
        assert!(dec("-2") < dec("-1.5"));
        assert!(dec("-10") < dec("-9.99"));
        assert!(dec("-0.001") > dec("-1"));
        assert!(dec("-1") < dec("1"));
    }

    #[test]
    fn test_exponents() {
        assert_eq!(dec("1.5E3"), Decimal::from(1500));
        assert_eq!(dec("25e-1"), dec("2.5"));
        assert_eq!(num(json!(1e20)), dec("100000000000000000000"));
        assert!(dec("9.99") < dec("1e1"));
    }

    #[test]
    fn test_invalid_text() {
        for text in ["", "-", ".", "abc", "1.2.3", "1e", "NaN", "inf", "1_000", "0x10"] {
            assert!(Decimal::parse(text).is_none(), "{text:?} should not parse");
        }
        assert_eq!(dec("  +3.25 "), dec("3.25"));
    }
}
