// ============================================================================
// Decimal Calculator
// Locale-aware facade over ScaledDecimal that never surfaces errors
// ============================================================================

use crate::domain::{NumberFormat, Separators};
use crate::interfaces::ValueLookup;
use crate::numeric::{RoundingMode, ScaledDecimal};

/// An arithmetic operand: a number, or text in the active convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a> {
    Number(ScaledDecimal),
    Text(&'a str),
}

impl From<ScaledDecimal> for Operand<'_> {
    fn from(value: ScaledDecimal) -> Self {
        Operand::Number(value)
    }
}

impl From<i64> for Operand<'_> {
    fn from(value: i64) -> Self {
        Operand::Number(ScaledDecimal::from_integer(value))
    }
}

impl From<rust_decimal::Decimal> for Operand<'_> {
    fn from(value: rust_decimal::Decimal) -> Self {
        Operand::Number(ScaledDecimal::from_decimal(value))
    }
}

impl<'a> From<&'a str> for Operand<'a> {
    fn from(value: &'a str) -> Self {
        Operand::Text(value)
    }
}

impl<'a> From<&'a String> for Operand<'a> {
    fn from(value: &'a String) -> Self {
        Operand::Text(value.as_str())
    }
}

/// Outcome of resolving an operand that may reference another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Value(ScaledDecimal),
    /// Neither a literal nor a reference to a numeric field
    Unresolved,
}

impl Resolution {
    pub fn value(self) -> Option<ScaledDecimal> {
        match self {
            Resolution::Value(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }
}

/// Term of a [`Calculator::blend_sum`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendTerm<'a> {
    Operand(Operand<'a>),
    /// Sign applied to every following operand: `true` adds, `false` subtracts
    Polarity(bool),
}

impl<'a> BlendTerm<'a> {
    pub fn operand(operand: impl Into<Operand<'a>>) -> Self {
        BlendTerm::Operand(operand.into())
    }
}

/// Exact decimal arithmetic over field text.
///
/// Text operands are trimmed, stripped of grouping characters and have the
/// decimal separator normalized before parsing. Operands that do not parse
/// are skipped or replaced according to each operation's policy; no
/// operation panics or returns an error.
///
/// # Example
/// ```
/// use decimal_field::engine::Calculator;
/// use decimal_field::domain::NumberFormat;
///
/// let calc = Calculator::for_format(NumberFormat::En);
/// assert_eq!(calc.sum(["0.1", "0.2"]).to_string(), "0.3");
/// assert_eq!(calc.sum(["1,000.5", "abc", "2"]).to_string(), "1002.5");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator {
    separators: Separators,
}

impl Calculator {
    pub fn new(separators: Separators) -> Self {
        Self { separators }
    }

    pub fn for_format(format: NumberFormat) -> Self {
        Self::new(format.separators())
    }

    #[inline]
    pub fn separators(&self) -> &Separators {
        &self.separators
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Text in canonical form: trimmed, no grouping, `.` as decimal point.
    pub fn canonicalize(&self, text: &str) -> String {
        text.trim()
            .chars()
            .filter(|&c| !self.separators.is_grouping(c))
            .map(|c| if self.separators.is_decimal(c) { '.' } else { c })
            .collect()
    }

    /// Parse field text in the active convention.
    pub fn parse(&self, text: &str) -> Option<ScaledDecimal> {
        self.canonicalize(text).parse().ok()
    }

    #[inline]
    pub fn is_numeric(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    pub fn mix_to_number<'a>(&self, operand: impl Into<Operand<'a>>) -> Option<ScaledDecimal> {
        match operand.into() {
            Operand::Number(value) => Some(value),
            Operand::Text(text) => self.parse(text),
        }
    }

    /// Like [`mix_to_number`](Self::mix_to_number), but an unparsable text
    /// operand is treated as a field reference and resolved once through
    /// `lookup`. The referenced text is parsed as a literal only.
    pub fn resolve<'a, L>(&self, operand: impl Into<Operand<'a>>, lookup: &L) -> Resolution
    where
        L: ValueLookup + ?Sized,
    {
        let operand = operand.into();
        if let Some(value) = self.mix_to_number(operand) {
            return Resolution::Value(value);
        }

        let Operand::Text(reference) = operand else {
            return Resolution::Unresolved;
        };
        let reference = reference.trim();
        if reference.is_empty() {
            return Resolution::Unresolved;
        }

        lookup
            .lookup(reference)
            .and_then(|text| self.parse(&text))
            .map_or(Resolution::Unresolved, Resolution::Value)
    }

    /// Numeric equality; two unparsable operands also compare equal.
    pub fn are_same_number<'a, 'b>(
        &self,
        a: impl Into<Operand<'a>>,
        b: impl Into<Operand<'b>>,
    ) -> bool {
        self.mix_to_number(a) == self.mix_to_number(b)
    }

    // ========================================================================
    // Sums
    // ========================================================================

    /// Sum of all parsable operands; zero when none parse.
    pub fn sum<'a, I>(&self, operands: I) -> ScaledDecimal
    where
        I: IntoIterator,
        I::Item: Into<Operand<'a>>,
    {
        self.blend_sum(operands.into_iter().map(|operand| BlendTerm::Operand(operand.into())))
    }

    /// Signed sum: polarity terms flip how the following operands count.
    ///
    /// `[a, Polarity(false), b, c]` computes `a - b - c`.
    pub fn blend_sum<'a, I>(&self, terms: I) -> ScaledDecimal
    where
        I: IntoIterator<Item = BlendTerm<'a>>,
    {
        let mut total = ScaledDecimal::ZERO;
        let mut adding = true;

        for term in terms {
            let operand = match term {
                BlendTerm::Polarity(positive) => {
                    adding = positive;
                    continue;
                },
                BlendTerm::Operand(operand) => operand,
            };
            let Some(value) = self.mix_to_number(operand) else {
                continue;
            };

            let next = if adding {
                total.checked_add(value)
            } else {
                total.checked_sub(value)
            };
            match next {
                Ok(next) => total = next,
                Err(err) => tracing::trace!(%err, %value, "sum operand skipped"),
            }
        }

        total
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Product of the parsable operands; `None` when nothing parses.
    pub fn product<'a, I>(&self, operands: I) -> Option<ScaledDecimal>
    where
        I: IntoIterator,
        I::Item: Into<Operand<'a>>,
    {
        let mut product: Option<ScaledDecimal> = None;

        for operand in operands {
            let Some(value) = self.mix_to_number(operand) else {
                continue;
            };
            let acc = product.unwrap_or(ScaledDecimal::ONE);
            match acc.checked_mul(value) {
                Ok(next) => product = Some(next),
                Err(err) => tracing::trace!(%err, %value, "product operand skipped"),
            }
        }

        product
    }

    /// Product where any unparsable operand makes the result zero.
    ///
    /// An empty operand list yields one.
    pub fn product_notice_null<'a, I>(&self, operands: I) -> ScaledDecimal
    where
        I: IntoIterator,
        I::Item: Into<Operand<'a>>,
    {
        let mut product = ScaledDecimal::ONE;

        for operand in operands {
            let Some(value) = self.mix_to_number(operand) else {
                return ScaledDecimal::ZERO;
            };
            match product.checked_mul(value) {
                Ok(next) => product = next,
                Err(err) => {
                    tracing::trace!(%err, "product overflowed");
                    return ScaledDecimal::ZERO;
                },
            }
        }

        product
    }

    // ========================================================================
    // Division and Rounding
    // ========================================================================

    /// `dividend / divisor`; zero on a zero divisor, unparsable operand or
    /// overflow.
    pub fn quotient<'a, 'b>(
        &self,
        dividend: impl Into<Operand<'a>>,
        divisor: impl Into<Operand<'b>>,
    ) -> ScaledDecimal {
        let (Some(dividend), Some(divisor)) =
            (self.mix_to_number(dividend), self.mix_to_number(divisor))
        else {
            return ScaledDecimal::ZERO;
        };

        dividend.checked_div(divisor).unwrap_or_else(|err| {
            tracing::trace!(%err, %dividend, %divisor, "quotient replaced by zero");
            ScaledDecimal::ZERO
        })
    }

    /// Round half away from zero at `places`.
    pub fn round<'a>(&self, value: impl Into<Operand<'a>>, places: u32) -> Option<ScaledDecimal> {
        self.round_with(value, places, RoundingMode::Round)
    }

    pub fn floor<'a>(&self, value: impl Into<Operand<'a>>, places: u32) -> Option<ScaledDecimal> {
        self.round_with(value, places, RoundingMode::Floor)
    }

    pub fn ceil<'a>(&self, value: impl Into<Operand<'a>>, places: u32) -> Option<ScaledDecimal> {
        self.round_with(value, places, RoundingMode::Ceil)
    }

    /// Round with an explicit mode; `None` when the operand does not parse.
    pub fn round_with<'a>(
        &self,
        value: impl Into<Operand<'a>>,
        places: u32,
        mode: RoundingMode,
    ) -> Option<ScaledDecimal> {
        let value = self.mix_to_number(value)?;
        Some(value.round_to(places, mode).unwrap_or(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::MemoryHost;

    fn en() -> Calculator {
        Calculator::for_format(NumberFormat::En)
    }

    fn dec(s: &str) -> ScaledDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_sum_is_exact() {
        let calc = en();
        assert_eq!(calc.sum(["0.1", "0.2"]).to_string(), "0.3");
        assert_eq!(calc.sum(["10.5", "2.25"]).to_string(), "12.75");
        assert_eq!(
            calc.sum(["123456789.123456", "0.000001"]).to_string(),
            "123456789.123457"
        );
    }

    #[test]
    fn test_sum_skips_unparsable() {
        let calc = en();
        assert_eq!(calc.sum(["5", "", "x", "-2"]).to_string(), "3");
        assert_eq!(calc.sum(Vec::<&str>::new()), ScaledDecimal::ZERO);
    }

    #[test]
    fn test_sum_with_grouping() {
        assert_eq!(en().sum(["1,000", "2,500.5"]).to_string(), "3500.5");

        let es = Calculator::for_format(NumberFormat::Es);
        assert_eq!(es.sum(["1.000,5", "0,5"]).to_string(), "1001");

        let iso = Calculator::for_format(NumberFormat::Iso);
        assert_eq!(iso.sum(["1 000.25", " 3 "]).to_string(), "1003.25");
    }

    #[test]
    fn test_blend_sum() {
        let calc = en();
        let total = calc.blend_sum([
            BlendTerm::operand("10"),
            BlendTerm::Polarity(false),
            BlendTerm::operand("2.5"),
            BlendTerm::operand("0.5"),
            BlendTerm::Polarity(true),
            BlendTerm::operand(1i64),
        ]);
        assert_eq!(total.to_string(), "8");
    }

    #[test]
    fn test_product_policies() {
        let calc = en();
        assert_eq!(calc.product(["2", "x", "1.5"]), Some(dec("3")));
        assert_eq!(calc.product(["x", ""]), None);

        assert_eq!(calc.product_notice_null(["2", "1.5"]).to_string(), "3");
        assert_eq!(calc.product_notice_null(["2", "x"]), ScaledDecimal::ZERO);
        assert_eq!(
            calc.product_notice_null(Vec::<&str>::new()),
            ScaledDecimal::ONE
        );
    }

    #[test]
    fn test_quotient() {
        let calc = en();
        assert_eq!(calc.quotient("1", "4").to_string(), "0.25");
        assert_eq!(calc.quotient("10", "0"), ScaledDecimal::ZERO);
        assert_eq!(calc.quotient("", "3"), ScaledDecimal::ZERO);
        assert_eq!(
            calc.quotient("2", "3").to_string(),
            "0.666666666666666667"
        );
    }

    #[test]
    fn test_rounding_modes() {
        let calc = en();
        assert_eq!(calc.round("2.345", 2), Some(dec("2.35")));
        assert_eq!(calc.round("-2.345", 2), Some(dec("-2.35")));
        assert_eq!(calc.floor("2.349", 2), Some(dec("2.34")));
        assert_eq!(calc.floor("-2.341", 2), Some(dec("-2.35")));
        assert_eq!(calc.ceil("2.341", 2), Some(dec("2.35")));
        assert_eq!(calc.ceil("-2.349", 2), Some(dec("-2.34")));
        assert_eq!(calc.round("1.5", 0), Some(dec("2")));
        assert_eq!(calc.round("abc", 0), None);
    }

    #[test]
    fn test_mix_to_number() {
        let calc = en();
        assert_eq!(calc.mix_to_number(" 1,234.50 "), Some(dec("1234.5")));
        assert_eq!(calc.mix_to_number(7i64), Some(dec("7")));
        assert_eq!(
            calc.mix_to_number(rust_decimal::Decimal::new(125, 2)),
            Some(dec("1.25"))
        );
        assert_eq!(calc.mix_to_number("1.2.3"), None);
        assert_eq!(calc.mix_to_number("-"), None);
    }

    #[test]
    fn test_resolve_reference() {
        let mut host = MemoryHost::new();
        host.insert("price", "1,250.75").insert("label", "n/a");

        let calc = en();
        assert_eq!(
            calc.resolve("3", &host),
            Resolution::Value(dec("3"))
        );
        assert_eq!(
            calc.resolve("#price", &host),
            Resolution::Value(dec("1250.75"))
        );
        assert_eq!(calc.resolve("#label", &host), Resolution::Unresolved);
        assert_eq!(calc.resolve("#missing", &host), Resolution::Unresolved);
        assert_eq!(calc.resolve("  ", &host).value(), None);
    }

    #[test]
    fn test_are_same_number() {
        let calc = en();
        assert!(calc.are_same_number("1.50", "1.5"));
        assert!(calc.are_same_number("1,000", 1000i64));
        assert!(!calc.are_same_number("1", "2"));
        assert!(calc.are_same_number("x", ""));
    }
}
