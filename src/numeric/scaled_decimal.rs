// ============================================================================
// Scaled Decimal
// Exact decimal values stored as an integer mantissa and a place count
// ============================================================================

use super::errors::{NumericError, NumericResult};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Working precision (decimal places) used for quotients.
///
/// Division is the only primitive whose result may not terminate; the
/// quotient is carried at this many places and rounded half away from zero
/// in the last place before any caller-side rounding.
pub const QUOTIENT_PLACES: u32 = 18;

/// Integer rounding applied when a value is cut down to fewer places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoundingMode {
    /// Nearest, ties away from zero
    #[default]
    Round,
    /// Toward negative infinity
    Floor,
    /// Toward positive infinity
    Ceil,
}

/// Decimal number represented as `mantissa × 10^-places`.
///
/// Every arithmetic primitive scales its operands to a shared power of ten,
/// operates on the integer mantissas, and rescales. No value ever passes
/// through binary floating point, so `0.1 + 0.2` is exactly `0.3`.
///
/// The place count is whatever the operation produced; results are
/// normalized (trailing zero places dropped), while parsed values keep the
/// places they were written with. Equality and hashing compare the
/// normalized value, so `1.50 == 1.5`.
///
/// # Example
/// ```
/// use decimal_field::numeric::ScaledDecimal;
///
/// let a: ScaledDecimal = "0.1".parse().unwrap();
/// let b: ScaledDecimal = "0.2".parse().unwrap();
/// assert_eq!(a.checked_add(b).unwrap().to_string(), "0.3");
/// ```
#[derive(Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaledDecimal {
    mantissa: i128,
    places: u32,
}

/// 10^n, checked against the i128 range
#[inline]
fn pow10(n: u32) -> NumericResult<i128> {
    10i128.checked_pow(n).ok_or(NumericError::Overflow)
}

/// True when the remainder `r` of a division by `divisor` is at least half
/// of the divisor in magnitude.
#[inline]
fn at_least_half(r: i128, divisor: i128) -> bool {
    let r = r.unsigned_abs();
    r >= divisor.unsigned_abs() - r
}

impl ScaledDecimal {
    /// Zero value
    pub const ZERO: Self = Self::from_raw(0, 0);

    /// One (1)
    pub const ONE: Self = Self::from_raw(1, 0);

    /// One hundred, the percent factor
    pub const HUNDRED: Self = Self::from_raw(100, 0);

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from a mantissa and a place count without normalizing.
    #[inline]
    pub const fn from_raw(mantissa: i128, places: u32) -> Self {
        Self { mantissa, places }
    }

    /// Create from an integer value.
    #[inline]
    pub const fn from_integer(value: i64) -> Self {
        Self::from_raw(value as i128, 0)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub const fn mantissa(self) -> i128 {
        self.mantissa
    }

    /// Number of digits after the decimal point.
    #[inline]
    pub const fn places(self) -> u32 {
        self.places
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.mantissa < 0
    }

    /// Drop trailing zero places: `12.500` becomes `12.5`.
    pub fn normalize(self) -> Self {
        let mut mantissa = self.mantissa;
        let mut places = self.places;
        while places > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            places -= 1;
        }
        Self::from_raw(mantissa, places)
    }

    /// Get absolute value.
    pub fn abs(self) -> NumericResult<Self> {
        self.mantissa
            .checked_abs()
            .map(|m| Self::from_raw(m, self.places))
            .ok_or(NumericError::Overflow)
    }

    /// Checked negation.
    pub fn checked_neg(self) -> NumericResult<Self> {
        self.mantissa
            .checked_neg()
            .map(|m| Self::from_raw(m, self.places))
            .ok_or(NumericError::Overflow)
    }

    /// Mantissa rescaled to `places` (which must not be below `self.places`).
    fn aligned(self, places: u32) -> NumericResult<i128> {
        debug_assert!(places >= self.places);
        self.mantissa
            .checked_mul(pow10(places - self.places)?)
            .ok_or(NumericError::Overflow)
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Checked addition: both mantissas are scaled to the larger place count.
    pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
        let places = self.places.max(rhs.places);
        let lhs = self.aligned(places)?;
        let rhs = rhs.aligned(places)?;
        lhs.checked_add(rhs)
            .map(|m| Self::from_raw(m, places).normalize())
            .ok_or(NumericError::Overflow)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    /// Checked multiplication: mantissas multiply, place counts add.
    pub fn checked_mul(self, rhs: Self) -> NumericResult<Self> {
        let places = self
            .places
            .checked_add(rhs.places)
            .ok_or(NumericError::Overflow)?;
        self.mantissa
            .checked_mul(rhs.mantissa)
            .map(|m| Self::from_raw(m, places).normalize())
            .ok_or(NumericError::Overflow)
    }

    /// Checked division carried at [`QUOTIENT_PLACES`].
    ///
    /// When the dividend is too wide for the full working precision, the
    /// precision is lowered one place at a time until the scaled dividend fits.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor, `Overflow` when no precision fits.
    pub fn checked_div(self, rhs: Self) -> NumericResult<Self> {
        if rhs.is_zero() {
            return Err(NumericError::DivisionByZero);
        }

        let mut target = QUOTIENT_PLACES;
        loop {
            match self.div_at(rhs, target) {
                Err(NumericError::Overflow) if target > 0 => target -= 1,
                other => return other,
            }
        }
    }

    /// Quotient with exactly `target` places before normalization.
    fn div_at(self, rhs: Self, target: u32) -> NumericResult<Self> {
        // result = a.m * 10^(target + b.p - a.p) / b.m
        let shift = i64::from(target) + i64::from(rhs.places) - i64::from(self.places);
        let (numerator, denominator) = if shift >= 0 {
            let factor = pow10(shift as u32)?;
            (
                self.mantissa
                    .checked_mul(factor)
                    .ok_or(NumericError::Overflow)?,
                rhs.mantissa,
            )
        } else {
            let factor = pow10(shift.unsigned_abs() as u32)?;
            (
                self.mantissa,
                rhs.mantissa
                    .checked_mul(factor)
                    .ok_or(NumericError::Overflow)?,
            )
        };

        let mut quotient = numerator / denominator;
        let remainder = numerator % denominator;
        if remainder != 0 && at_least_half(remainder, denominator) {
            if (numerator < 0) != (denominator < 0) {
                quotient -= 1;
            } else {
                quotient += 1;
            }
        }

        Ok(Self::from_raw(quotient, target).normalize())
    }

    /// Round to at most `places` decimal places.
    ///
    /// Values that already fit are returned unchanged.
    pub fn round_to(self, places: u32, mode: RoundingMode) -> NumericResult<Self> {
        if self.places <= places {
            return Ok(self);
        }

        let factor = pow10(self.places - places)?;
        let mut integral = self.mantissa / factor;
        let remainder = self.mantissa % factor;

        match mode {
            RoundingMode::Round => {
                if remainder != 0 && at_least_half(remainder, factor) {
                    integral += self.mantissa.signum();
                }
            },
            RoundingMode::Floor => {
                if remainder < 0 {
                    integral -= 1;
                }
            },
            RoundingMode::Ceil => {
                if remainder > 0 {
                    integral += 1;
                }
            },
        }

        Ok(Self::from_raw(integral, places).normalize())
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compare by value, aligning place counts. `None` if alignment overflows.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        let places = self.places.max(other.places);
        let lhs = self.aligned(places).ok()?;
        let rhs = other.aligned(places).ok()?;
        Some(lhs.cmp(&rhs))
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for ScaledDecimal {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for ScaledDecimal {
    fn eq(&self, other: &Self) -> bool {
        let lhs = self.normalize();
        let rhs = other.normalize();
        lhs.mantissa == rhs.mantissa && lhs.places == rhs.places
    }
}

impl Eq for ScaledDecimal {}

impl PartialOrd for ScaledDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Hash for ScaledDecimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalize();
        normalized.mantissa.hash(state);
        normalized.places.hash(state);
    }
}

impl Neg for ScaledDecimal {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self::from_raw(-self.mantissa, self.places)
    }
}

impl From<i64> for ScaledDecimal {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScaledDecimal({}, mantissa={}, places={})",
            self, self.mantissa, self.places
        )
    }
}

impl fmt::Display for ScaledDecimal {
    /// Canonical text: `-` sign, `.` decimal point, no grouping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let places = self.places as usize;

        if places == 0 {
            return write!(f, "{}{}", sign, digits);
        }

        let padded = format!("{:0>width$}", digits, width = places + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - places);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

// ============================================================================
// Conversion from rust_decimal (for API boundaries)
// ============================================================================

impl ScaledDecimal {
    /// Convert from rust_decimal::Decimal. Always exact.
    pub fn from_decimal(d: rust_decimal::Decimal) -> Self {
        Self::from_raw(d.mantissa(), d.scale())
    }

    /// Convert to rust_decimal::Decimal.
    ///
    /// # Errors
    /// `PrecisionLoss` when the value needs more than 28 places or 96 bits.
    pub fn to_decimal(self) -> NumericResult<rust_decimal::Decimal> {
        let normalized = self.normalize();
        rust_decimal::Decimal::try_from_i128_with_scale(normalized.mantissa, normalized.places)
            .map_err(|_| NumericError::PrecisionLoss)
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl std::str::FromStr for ScaledDecimal {
    type Err = NumericError;

    /// Parse a canonical decimal literal.
    ///
    /// Accepts an optional sign, digits, and at most one `.`; either side of
    /// the point may be empty but not both. Grouping separators and exponent
    /// notation are rejected.
    ///
    /// # Examples
    /// - "123" -> 123
    /// - "-0.050" -> -0.050 (places = 3)
    /// - ".5" -> 0.5
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (is_negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (int_str, frac_str) = match body.split_once('.') {
            Some((int_str, frac_str)) => (int_str, frac_str),
            None => (body, ""),
        };

        if int_str.is_empty() && frac_str.is_empty() {
            return Err(NumericError::InvalidInput);
        }

        let mut mantissa: i128 = 0;
        for c in int_str.chars().chain(frac_str.chars()) {
            let digit = c.to_digit(10).ok_or(NumericError::InvalidInput)?;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit)))
                .ok_or(NumericError::Overflow)?;
        }

        if is_negative {
            mantissa = -mantissa;
        }

        Ok(Self::from_raw(mantissa, frac_str.len() as u32))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> ScaledDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(ScaledDecimal::ZERO.mantissa(), 0);
        assert_eq!(ScaledDecimal::ONE.to_string(), "1");
        assert_eq!(ScaledDecimal::HUNDRED.to_string(), "100");
    }

    #[test]
    fn test_from_str() {
        let x = d("123.456");
        assert_eq!(x.mantissa(), 123_456);
        assert_eq!(x.places(), 3);

        let y = d("-0.050");
        assert!(y.is_negative());
        assert_eq!(y.places(), 3);
        assert_eq!(y.to_string(), "-0.050");

        assert_eq!(d(".5").to_string(), "0.5");
        assert_eq!(d("5.").to_string(), "5");
        assert_eq!(d("+7").to_string(), "7");
    }

    #[test]
    fn test_from_str_invalid() {
        for input in ["", "-", ".", "1.2.3", "1,234", "1e3", "abc", "--1"] {
            let result: Result<ScaledDecimal, _> = input.parse();
            assert_eq!(result, Err(NumericError::InvalidInput), "input {input:?}");
        }

        let result: Result<ScaledDecimal, _> = "1".repeat(40).parse();
        assert_eq!(result, Err(NumericError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(ScaledDecimal::from_raw(5, 2).to_string(), "0.05");
        assert_eq!(ScaledDecimal::from_raw(-5, 2).to_string(), "-0.05");
        assert_eq!(ScaledDecimal::from_raw(1275, 2).to_string(), "12.75");
        assert_eq!(ScaledDecimal::from_integer(-42).to_string(), "-42");
    }

    #[test]
    fn test_checked_add_is_exact() {
        assert_eq!(d("0.1").checked_add(d("0.2")).unwrap().to_string(), "0.3");
        assert_eq!(d("10.5").checked_add(d("2.25")).unwrap().to_string(), "12.75");
        assert_eq!(d("1.005").checked_add(d("-1")).unwrap().to_string(), "0.005");
        assert_eq!(d("0.7").checked_add(d("0.3")).unwrap().to_string(), "1");
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(d("0.3").checked_sub(d("0.1")).unwrap().to_string(), "0.2");
        assert_eq!(d("1").checked_sub(d("1.25")).unwrap().to_string(), "-0.25");
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(d("1.1").checked_mul(d("1.1")).unwrap().to_string(), "1.21");
        assert_eq!(d("0.5").checked_mul(d("0.2")).unwrap().to_string(), "0.1");
        assert_eq!(d("-2.5").checked_mul(d("4")).unwrap().to_string(), "-10");
    }

    #[test]
    fn test_checked_mul_overflow() {
        let large = ScaledDecimal::from_raw(i128::MAX / 2, 0);
        assert_eq!(large.checked_mul(d("3")), Err(NumericError::Overflow));
    }

    #[test]
    fn test_checked_div() {
        assert_eq!(d("1").checked_div(d("4")).unwrap().to_string(), "0.25");
        assert_eq!(d("0.3").checked_div(d("0.1")).unwrap().to_string(), "3");
        assert_eq!(
            d("1").checked_div(d("3")).unwrap().to_string(),
            "0.333333333333333333"
        );
        assert_eq!(
            d("2").checked_div(d("3")).unwrap().to_string(),
            "0.666666666666666667"
        );
        assert_eq!(
            d("-2").checked_div(d("3")).unwrap().to_string(),
            "-0.666666666666666667"
        );
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert_eq!(d("1").checked_div(d("0.00")), Err(NumericError::DivisionByZero));
    }

    #[test]
    fn test_checked_div_lowers_precision_for_wide_dividends() {
        let wide = d("1234567890123456789012");
        let result = wide.checked_div(d("1")).unwrap();
        assert_eq!(result, wide);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(d("2.5").round_to(0, RoundingMode::Round).unwrap().to_string(), "3");
        assert_eq!(d("-2.5").round_to(0, RoundingMode::Round).unwrap().to_string(), "-3");
        assert_eq!(d("1.005").round_to(2, RoundingMode::Round).unwrap().to_string(), "1.01");
        assert_eq!(d("1.004").round_to(2, RoundingMode::Round).unwrap().to_string(), "1");
    }

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(d("1.239").round_to(2, RoundingMode::Floor).unwrap().to_string(), "1.23");
        assert_eq!(d("-1.231").round_to(2, RoundingMode::Floor).unwrap().to_string(), "-1.24");
        assert_eq!(d("1.231").round_to(2, RoundingMode::Ceil).unwrap().to_string(), "1.24");
        assert_eq!(d("-1.239").round_to(2, RoundingMode::Ceil).unwrap().to_string(), "-1.23");
    }

    #[test]
    fn test_round_keeps_values_that_fit() {
        let x = d("12.5");
        assert_eq!(x.round_to(2, RoundingMode::Round).unwrap().places(), 1);
    }

    #[test]
    fn test_equality_ignores_trailing_zeros() {
        assert_eq!(d("1.50"), d("1.5"));
        assert_ne!(d("1.50"), d("1.05"));
        assert!(d("1.5") > d("1.49"));
        assert!(d("-3") < d("0.001"));
    }

    #[test]
    fn test_from_decimal() {
        use rust_decimal::Decimal;

        let x = ScaledDecimal::from_decimal(Decimal::new(12345, 2));
        assert_eq!(x.to_string(), "123.45");
    }

    #[test]
    fn test_to_decimal() {
        let x = d("123.4500");
        assert_eq!(x.to_decimal().unwrap().to_string(), "123.45");

        let too_fine = ScaledDecimal::from_raw(1, 30);
        assert_eq!(too_fine.to_decimal(), Err(NumericError::PrecisionLoss));
    }

    #[test]
    fn test_negation_and_abs() {
        let x = d("-4.2");
        assert_eq!((-x).to_string(), "4.2");
        assert_eq!(x.abs().unwrap().to_string(), "4.2");
        assert_eq!(
            ScaledDecimal::from_raw(i128::MIN, 0).checked_neg(),
            Err(NumericError::Overflow)
        );
    }
}
