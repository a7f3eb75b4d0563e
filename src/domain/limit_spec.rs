// ============================================================================
// Limit Specification
// Per-field digit budget and sign policy
// ============================================================================

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integral digits granted when a descriptor is missing or unreadable.
pub const DEFAULT_INTEGRAL_DIGITS: u32 = 9;

/// Widest budget (integral plus fractional digits) a field may declare.
/// Values are computed on an i128 mantissa, which holds 38 full digits.
pub const MAX_BUDGET_DIGITS: u64 = 38;

/// Resolved digit budget of a field.
///
/// Parsed from a descriptor of the form `[-]INTEGRAL[.FRACTIONAL]`, e.g.
/// `-5.2` allows a sign, five integral digits and two fractional digits.
/// Budgets wider than [`MAX_BUDGET_DIGITS`] are refused when the field is
/// registered (see [`LimitSpec::requested_digits`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LimitSpec {
    /// Maximum digits before the decimal separator (always >= 1)
    pub integral: u32,
    /// Maximum digits after the separator; `None` disables fractional input
    pub fractional: Option<u32>,
    /// Whether a leading minus sign may be entered
    pub allow_minus: bool,
}

impl Default for LimitSpec {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LimitSpec {
    /// `{integral: 9, fractional: none, allow_minus: false}`
    pub const DEFAULT: Self = Self {
        integral: DEFAULT_INTEGRAL_DIGITS,
        fractional: None,
        allow_minus: false,
    };

    /// Create a spec, coercing a zero integral budget to the default and a
    /// zero fractional budget to "no fractional input".
    pub fn new(integral: u32, fractional: Option<u32>, allow_minus: bool) -> Self {
        Self {
            integral: if integral == 0 {
                DEFAULT_INTEGRAL_DIGITS
            } else {
                integral
            },
            fractional: fractional.filter(|&digits| digits > 0),
            allow_minus,
        }
    }

    /// Resolve an optional descriptor; absent means default.
    pub fn resolve(descriptor: Option<&str>) -> Self {
        descriptor.map_or(Self::DEFAULT, Self::from_descriptor)
    }

    /// Parse a `[-]INTEGRAL[.FRACTIONAL]` descriptor.
    ///
    /// Never fails: blank input, non-numeric input, a leading or trailing
    /// separator, a minus anywhere but the front, or a descriptor granting no
    /// digits at all (`0`, `-0`, `-0.0`) all resolve to [`LimitSpec::DEFAULT`].
    /// An integral budget of zero next to a real fractional budget (`0.2`)
    /// keeps the fractional budget and gets the default integral budget.
    pub fn from_descriptor(descriptor: &str) -> Self {
        Self::parse_descriptor(descriptor.trim()).unwrap_or(Self::DEFAULT)
    }

    /// Total digits a well-formed descriptor asks for, counting a zero
    /// integral part as the default budget. Digit counts too large to read
    /// saturate. `None` for descriptors that resolve to the default.
    pub fn requested_digits(descriptor: &str) -> Option<u64> {
        let (_, int_str, frac_str) = split_descriptor(descriptor.trim());
        let integral = parse_width(int_str)?;
        let fractional = match frac_str {
            Some(frac) => parse_width(frac)?,
            None => 0,
        };

        match (integral, fractional) {
            (0, 0) => None,
            (0, fractional) => Some(fractional.saturating_add(DEFAULT_INTEGRAL_DIGITS.into())),
            (integral, fractional) => Some(integral.saturating_add(fractional)),
        }
    }

    fn parse_descriptor(source: &str) -> Option<Self> {
        let (allow_minus, int_str, frac_str) = split_descriptor(source);
        let integral = parse_digits(int_str)?;
        let fractional = match frac_str {
            Some(frac) => Some(parse_digits(frac)?).filter(|&digits| digits > 0),
            None => None,
        };

        if integral == 0 && fractional.is_none() {
            return None;
        }

        Some(Self::new(integral, fractional, allow_minus))
    }

    // ========================================================================
    // Budget Queries
    // ========================================================================

    /// Integral budget as a character count.
    #[inline]
    pub fn integral_budget(&self) -> usize {
        self.integral as usize
    }

    /// Fractional budget as a character count (zero when disabled).
    #[inline]
    pub fn fractional_budget(&self) -> usize {
        self.fractional.unwrap_or(0) as usize
    }

    #[inline]
    pub fn allows_fraction(&self) -> bool {
        self.fractional.is_some()
    }

    /// Whether runs of the given lengths fit the budget.
    #[inline]
    pub fn fits(&self, integral_len: usize, fractional_len: usize) -> bool {
        integral_len <= self.integral_budget() && fractional_len <= self.fractional_budget()
    }
}

/// Sign flag, integral run and optional fractional run of a descriptor.
fn split_descriptor(source: &str) -> (bool, &str, Option<&str>) {
    let (allow_minus, abs) = match source.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, source),
    };

    match abs.split_once('.') {
        Some((int_str, frac_str)) => (allow_minus, int_str, Some(frac_str)),
        None => (allow_minus, abs, None),
    }
}

fn is_digit_run(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Non-empty ASCII digit run as u32.
fn parse_digits(s: &str) -> Option<u32> {
    if !is_digit_run(s) {
        return None;
    }
    s.parse().ok()
}

/// Non-empty ASCII digit run as u64, saturating.
fn parse_width(s: &str) -> Option<u64> {
    if !is_digit_run(s) {
        return None;
    }
    Some(s.parse().unwrap_or(u64::MAX))
}
