//! Exact conversion between satoshi and BTC amounts.
//!
//! Every conversion goes through [`Decimal`]; amounts never touch binary
//! floating point. BTC values are always produced with a scale of exactly 8,
//! so `to_string()` yields the fixed `"%.8f"` form.
//!
//! Inputs with more than 8 fractional digits are rounded to 8 before scaling,
//! half away from zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 1 BTC = 10^8 satoshi.
pub const SATOSHI_PER_BTC: i64 = 100_000_000;

/// Number of fractional digits in a BTC amount.
pub const BTC_DECIMALS: u32 = 8;

/// 21 million BTC expressed in satoshi.
pub const MAX_MONEY: i64 = 21_000_000 * SATOSHI_PER_BTC;

/// Errors produced when an amount cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("invalid amount: {0:?}")]
    Invalid(String),
    #[error("satoshi amount must be a whole number, got {0}")]
    FractionalSatoshi(Decimal),
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Values that can be read as an exact decimal amount.
///
/// Implemented for integers, [`Decimal`], [`Satoshi`] and decimal strings.
/// Floats are not accepted.
pub trait IntoAmount {
    fn into_amount(self) -> Result<Decimal, AmountError>;
}

impl IntoAmount for Decimal {
    fn into_amount(self) -> Result<Decimal, AmountError> {
        Ok(self)
    }
}

macro_rules! impl_into_amount_for_int {
    ($($ty:ty),*) => {
        $(
            impl IntoAmount for $ty {
                fn into_amount(self) -> Result<Decimal, AmountError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_amount_for_int!(i32, u32, i64, u64);

impl IntoAmount for Satoshi {
    fn into_amount(self) -> Result<Decimal, AmountError> {
        Ok(Decimal::from(self.0))
    }
}

impl IntoAmount for &str {
    fn into_amount(self) -> Result<Decimal, AmountError> {
        parse_amount(self)
    }
}

impl IntoAmount for &String {
    fn into_amount(self) -> Result<Decimal, AmountError> {
        parse_amount(self)
    }
}

impl IntoAmount for String {
    fn into_amount(self) -> Result<Decimal, AmountError> {
        parse_amount(&self)
    }
}

/// Fraction length kept when an input has more digits than a [`Decimal`]
/// holds. Nine digits decide rounding to 8; the tenth records whether
/// anything non-zero was dropped.
const REDUCED_FRACTION_DIGITS: usize = 10;

/// Parse a plain decimal string (`"-12.5"`, `"2100000000000000"`).
///
/// Accepts an optional sign, digits, and an optional `.` followed by digits.
/// Fractions longer than a [`Decimal`] can hold are cut to 10 digits without
/// changing how they round to 8 or whether they are whole.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let invalid = || AmountError::Invalid(input.to_owned());

    let negative = input.starts_with('-');
    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((_, "")) | Some(("", _)) => return Err(invalid()),
        Some(parts) => parts,
        None => (unsigned, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    let sign = if negative { "-" } else { "" };
    let canonical = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };
    if let Ok(amount) = Decimal::from_str_exact(&canonical) {
        return Ok(amount);
    }
    if frac_part.len() <= REDUCED_FRACTION_DIGITS {
        return Err(AmountError::OutOfRange(input.to_owned()));
    }

    let (kept, dropped) = frac_part.split_at(REDUCED_FRACTION_DIGITS);
    let mut kept = kept.to_owned();
    if kept.ends_with('0') && dropped.bytes().any(|b| b != b'0') {
        kept.pop();
        kept.push('1');
    }
    Decimal::from_str_exact(&format!("{sign}{int_part}.{kept}"))
        .map_err(|_| AmountError::OutOfRange(input.to_owned()))
}

/// Convert a satoshi amount to BTC, with a scale of exactly 8.
pub fn to_btc(satoshi: impl IntoAmount) -> Result<Decimal, AmountError> {
    let satoshi = satoshi.into_amount()?;
    if !satoshi.fract().is_zero() {
        return Err(AmountError::FractionalSatoshi(satoshi));
    }
    let mut btc = satoshi
        .checked_div(Decimal::from(SATOSHI_PER_BTC))
        .ok_or_else(|| AmountError::OutOfRange(satoshi.to_string()))?;
    btc.rescale(BTC_DECIMALS);
    Ok(normalize_zero(btc))
}

/// Convert a satoshi amount to a BTC string with exactly 8 fractional digits.
pub fn to_btc_string(satoshi: impl IntoAmount) -> Result<String, AmountError> {
    to_btc(satoshi).map(|btc| btc.to_string())
}

/// Convert a BTC amount to satoshi as an integral [`Decimal`].
///
/// The input is rounded to 8 fractional digits first, so the result has no
/// fractional part. The range is that of a 96-bit mantissa, well beyond `i64`.
pub fn to_satoshi_decimal(btc: impl IntoAmount) -> Result<Decimal, AmountError> {
    let btc = btc.into_amount()?;
    let rounded = btc.round_dp_with_strategy(BTC_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    let satoshi = rounded
        .checked_mul(Decimal::from(SATOSHI_PER_BTC))
        .ok_or_else(|| AmountError::OutOfRange(btc.to_string()))?;
    Ok(normalize_zero(satoshi.trunc()))
}

/// Convert a BTC amount to a satoshi integer string.
pub fn to_satoshi_string(btc: impl IntoAmount) -> Result<String, AmountError> {
    to_satoshi_decimal(btc).map(|satoshi| satoshi.to_string())
}

/// Convert a BTC amount to satoshi.
pub fn to_satoshi(btc: impl IntoAmount) -> Result<i64, AmountError> {
    let satoshi = to_satoshi_decimal(btc)?;
    satoshi
        .to_i64()
        .ok_or_else(|| AmountError::OutOfRange(satoshi.to_string()))
}

// `-0` would otherwise print with its sign.
fn normalize_zero(value: Decimal) -> Decimal {
    if value.is_zero() {
        let mut zero = Decimal::ZERO;
        zero.rescale(value.scale());
        zero
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Satoshi
// ---------------------------------------------------------------------------

/// An amount in satoshi, the unit every amount on the wire uses.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Satoshi(pub i64);

impl Satoshi {
    pub const ZERO: Self = Self(0);

    /// Wrap a raw satoshi count.
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw satoshi count.
    pub const fn as_satoshi(self) -> i64 {
        self.0
    }

    /// Create a [`Satoshi`] from a BTC amount, rounding to 8 fractional digits.
    pub fn from_btc(btc: impl IntoAmount) -> Result<Self, AmountError> {
        to_satoshi(btc).map(Self)
    }

    /// Exact value in BTC, scale 8.
    pub fn as_btc(self) -> Decimal {
        Decimal::new(self.0, BTC_DECIMALS)
    }

    /// BTC value formatted with exactly 8 fractional digits.
    pub fn to_btc_string(self) -> String {
        self.as_btc().to_string()
    }
}

impl From<i64> for Satoshi {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Satoshi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Satoshi {
    type Err = AmountError;

    /// Parses an integral satoshi string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = parse_amount(s)?;
        if !amount.fract().is_zero() {
            return Err(AmountError::FractionalSatoshi(amount));
        }
        amount
            .to_i64()
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_satoshi_formats_with_eight_decimals() {
        assert_eq!(to_btc_string(1).unwrap(), "0.00000001");
        assert_eq!(to_btc_string(100_000_000).unwrap(), "1.00000000");
        assert_eq!(to_btc_string(0).unwrap(), "0.00000000");
    }

    #[test]
    fn negative_satoshi_keeps_sign() {
        assert_eq!(to_btc_string(-150_000_000_i64).unwrap(), "-1.50000000");
        assert_eq!(to_satoshi("-1.5").unwrap(), -150_000_000);
    }

    #[test]
    fn btc_strings_to_satoshi() {
        assert_eq!(to_satoshi("0.1").unwrap(), 10_000_000);
        assert_eq!(to_satoshi("1.23456789").unwrap(), 123_456_789);
        assert_eq!(to_satoshi("21000000").unwrap(), MAX_MONEY);
        assert_eq!(to_satoshi_string("0.00000001").unwrap(), "1");
    }

    #[test]
    fn excess_precision_rounds_half_away_from_zero() {
        assert_eq!(to_satoshi("1.234567885").unwrap(), 123_456_789);
        assert_eq!(to_satoshi("1.234567884").unwrap(), 123_456_788);
        assert_eq!(to_satoshi("-0.000000015").unwrap(), -2);
        assert_eq!(to_satoshi("0.000000004").unwrap(), 0);
    }

    #[test]
    fn rounding_to_zero_drops_the_sign() {
        assert_eq!(to_satoshi_string("-0.000000004").unwrap(), "0");
        assert_eq!(to_btc_string("-0").unwrap(), "0.00000000");
    }

    #[test]
    fn satoshi_strings_beyond_i64_stay_exact() {
        // 2^64 satoshi
        let huge = "18446744073709551616";
        assert_eq!(to_btc_string(huge).unwrap(), "184467440737.09551616");
        assert_eq!(to_satoshi_string("184467440737.09551616").unwrap(), huge);
        assert!(matches!(
            to_satoshi("184467440737.09551616"),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for input in [
            "", "abc", " 1", "1 ", "1.2.3", "1e5", "1_000", "1__0.5", "_1", "1.", ".5", "-",
            "--1", "+-1", "1.-5",
        ] {
            assert!(
                matches!(to_satoshi(input), Err(AmountError::Invalid(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn fractions_longer_than_a_decimal_still_round() {
        assert_eq!(to_satoshi("0.1234567891234567890123456789012").unwrap(), 12_345_679);
        assert_eq!(
            to_satoshi("20000000.000000004999999999999999999999").unwrap(),
            2_000_000_000_000_000
        );
        assert_eq!(
            to_satoshi("20000000.000000005000000000000000000001").unwrap(),
            2_000_000_000_000_001
        );
        assert_eq!(to_satoshi("-0.000000015000000000000000000000").unwrap(), -2);
        assert!(matches!(
            to_btc("1.00000000000000000000000000001"),
            Err(AmountError::FractionalSatoshi(_))
        ));
    }

    #[test]
    fn too_many_integer_digits_is_out_of_range() {
        assert!(matches!(
            to_satoshi_string("99999999999999999999999999999"),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn explicit_plus_sign_is_accepted() {
        assert_eq!(to_satoshi("+1.5").unwrap(), 150_000_000);
    }

    #[test]
    fn fractional_satoshi_is_rejected() {
        assert!(matches!(
            to_btc("1.5"),
            Err(AmountError::FractionalSatoshi(_))
        ));
        assert!(matches!(
            "10.5".parse::<Satoshi>(),
            Err(AmountError::FractionalSatoshi(_))
        ));
    }

    #[test]
    fn decimal_input_keeps_full_precision() {
        let btc = Decimal::new(123_456_789, 8);
        assert_eq!(to_satoshi(btc).unwrap(), 123_456_789);
        assert_eq!(to_btc(123_456_789_i64).unwrap(), btc);
        assert_eq!(to_btc(123_456_789_i64).unwrap().scale(), 8);
    }

    #[test]
    fn satoshi_newtype_helpers() {
        let amount = Satoshi::from_btc("0.0001").unwrap();
        assert_eq!(amount, Satoshi::new(10_000));
        assert_eq!(amount.to_btc_string(), "0.00010000");
        assert_eq!(amount.as_btc(), Decimal::new(10_000, 8));
        assert_eq!("2100000000000000".parse::<Satoshi>().unwrap().as_satoshi(), MAX_MONEY);
        assert_eq!(amount.to_string(), "10000");
    }

    #[test]
    fn satoshi_serde_is_a_bare_integer() {
        let json = serde_json::to_string(&Satoshi::new(42)).expect("serialize");
        assert_eq!(json, "42");
        let back: Satoshi = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Satoshi::new(42));
    }

    proptest! {
        #[test]
        fn satoshi_survives_btc_round_trip(n in 0i64..=MAX_MONEY) {
            let btc = to_btc_string(n).unwrap();
            prop_assert_eq!(to_satoshi(btc.as_str()).unwrap(), n);
        }

        #[test]
        fn btc_survives_satoshi_round_trip(n in -MAX_MONEY..=MAX_MONEY) {
            let btc = Decimal::new(n, BTC_DECIMALS);
            let satoshi = to_satoshi(btc).unwrap();
            prop_assert_eq!(to_btc_string(satoshi).unwrap(), btc.to_string());
        }
    }
}
