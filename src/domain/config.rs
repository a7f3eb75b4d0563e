// ============================================================================
// Field Configuration
// Per-field options consumed by the validators, formatter and evaluator
// ============================================================================

use super::limit_spec::{LimitSpec, MAX_BUDGET_DIGITS};
use crate::numeric::RoundingMode;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Attribute Names
// ============================================================================

/// Attribute names understood by [`FieldConfig::from_attributes`].
pub mod attr {
    pub const MAX_LENGTH: &str = "data-max-length";
    pub const DISABLE_AUTOFILL: &str = "data-disable-autofill";
    pub const DISABLE_AUTO_COMMA: &str = "data-disable-auto-comma";
    pub const DISABLE_SMART_MINUS: &str = "data-disable-smart-minus";
    pub const DISABLE_INIT_REFRESH: &str = "data-disable-init-refresh";
    pub const HIGHLIGHT_MINUS: &str = "data-highlight-minus";
    pub const HORIZONTAL_ALIGN: &str = "data-horizontal-align";
    pub const SUM: &str = "data-sum";
    pub const PRODUCT: &str = "data-product";
    pub const DIFFERENCE: &str = "data-difference";
    pub const QUOTIENT: &str = "data-quotient";
    pub const PERCENT: &str = "data-percent";
    pub const CEIL: &str = "data-ceil";
    pub const FLOOR: &str = "data-floor";
    pub const NAME: &str = "name";
}

/// Marker color used when a highlight is requested without a valid color.
pub const DEFAULT_MINUS_COLOR: &str = "#FF0000";

// ============================================================================
// Configuration Errors
// ============================================================================

/// Fatal derived-field configuration errors.
///
/// These are developer mistakes in the page setup and are surfaced at
/// registration instead of being swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A two-operand operation was given the wrong number of selectors
    SelectorCount {
        operation: Operation,
        expected: usize,
        received: usize,
    },
    /// The minuend/dividend selector matched zero or several fields
    AmbiguousPrimary {
        operation: Operation,
        selector: String,
        received: usize,
    },
    /// A selector was blank
    EmptySelector { operation: Operation },
    /// The limit descriptor asks for more digits than a value can hold
    BudgetTooWide { descriptor: String, digits: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SelectorCount {
                operation,
                expected,
                received,
            } => write!(
                f,
                "invalid number of selectors for {}: expected {}, received {}",
                operation, expected, received
            ),
            ConfigError::AmbiguousPrimary {
                operation,
                selector,
                received,
            } => write!(
                f,
                "{} needs exactly one {} field, selector {:?} matched {}",
                operation,
                operation.primary_role(),
                selector,
                received
            ),
            ConfigError::EmptySelector { operation } => {
                write!(f, "empty selector in {} descriptor", operation)
            },
            ConfigError::BudgetTooWide { descriptor, digits } => write!(
                f,
                "limit descriptor {:?} asks for {} digits, at most {} are supported",
                descriptor, digits, MAX_BUDGET_DIGITS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type alias for configuration setup
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// Derived-Field Descriptors
// ============================================================================

/// Arithmetic operation of a derived field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operation {
    /// Sum of every field matched by one selector
    Sum,
    /// Product of every field matched by one selector
    Product,
    /// `minuend - sum(subtrahends)`
    Difference,
    /// `dividend / product(divisors)`
    Quotient,
    /// `dividend * 100 / product(divisors)`
    Percent,
}

impl Operation {
    /// Operations taking a `primary,secondary` selector pair.
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Operation::Difference | Operation::Quotient | Operation::Percent
        )
    }

    pub const fn attribute(self) -> &'static str {
        match self {
            Operation::Sum => attr::SUM,
            Operation::Product => attr::PRODUCT,
            Operation::Difference => attr::DIFFERENCE,
            Operation::Quotient => attr::QUOTIENT,
            Operation::Percent => attr::PERCENT,
        }
    }

    fn primary_role(self) -> &'static str {
        match self {
            Operation::Difference => "minuend",
            _ => "dividend",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Sum => "sum",
            Operation::Product => "product",
            Operation::Difference => "difference",
            Operation::Quotient => "quotient",
            Operation::Percent => "percent",
        };
        f.write_str(name)
    }
}

/// Unresolved derived-field declaration as written on the target field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivedDescriptor {
    pub operation: Operation,
    /// One selector, or `primary,secondary` for binary operations
    pub selectors: String,
    pub rounding: RoundingMode,
}

impl DerivedDescriptor {
    pub fn new(operation: Operation, selectors: impl Into<String>) -> Self {
        Self {
            operation,
            selectors: selectors.into(),
            rounding: RoundingMode::Round,
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }
}

// ============================================================================
// Presentation Options
// ============================================================================

/// Negative-value marker applied when a field settles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HighlightMinus {
    #[default]
    Off,
    /// Normalized `#rgb` / `#rrggbb` color
    Color(String),
}

impl HighlightMinus {
    /// Parse the highlight attribute: absent is off, a 3/6-digit hex color
    /// (with or without `#`) is used as given, anything else gets the default.
    pub fn from_attribute(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return HighlightMinus::Off;
        };
        let value = value.trim();
        let hex = value.strip_prefix('#').unwrap_or(value);
        let valid = matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
        if valid {
            HighlightMinus::Color(format!("#{}", hex))
        } else {
            HighlightMinus::Color(DEFAULT_MINUS_COLOR.to_string())
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            HighlightMinus::Off => None,
            HighlightMinus::Color(color) => Some(color),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, HighlightMinus::Color(_))
    }
}

/// Text alignment requested for the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HorizontalAlign {
    Left,
    Center,
    #[default]
    Right,
    Inherit,
}

impl HorizontalAlign {
    /// Unknown or absent values fall back to right alignment.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("left") => HorizontalAlign::Left,
            Some("center") => HorizontalAlign::Center,
            Some("inherit") => HorizontalAlign::Inherit,
            _ => HorizontalAlign::Right,
        }
    }

    pub const fn as_css(self) -> &'static str {
        match self {
            HorizontalAlign::Left => "left",
            HorizontalAlign::Center => "center",
            HorizontalAlign::Right => "right",
            HorizontalAlign::Inherit => "inherit",
        }
    }
}

// ============================================================================
// Field Configuration
// ============================================================================

/// Complete configuration of one numeric field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldConfig {
    /// Limit descriptor (`[-]INTEGRAL[.FRACTIONAL]`); `None` leaves the
    /// field unmanaged by the keystroke validator
    pub max_length: Option<String>,

    /// Keep the fractional run as typed instead of padding it on settle
    pub disable_autofill: bool,

    /// Never insert grouping separators
    pub disable_auto_comma: bool,

    /// Minus key inserts a literal sign instead of toggling the value's sign
    pub disable_smart_minus: bool,

    /// Skip settling during the initialization sweep
    pub disable_init_refresh: bool,

    pub highlight_minus: HighlightMinus,

    pub horizontal_align: HorizontalAlign,

    /// Name shared by fields that form one logical input group
    pub group: Option<String>,

    /// Makes this field a derived field
    pub derived: Option<DerivedDescriptor>,
}

impl FieldConfig {
    /// Create a managed field with the given limit descriptor
    pub fn new(max_length: impl Into<String>) -> Self {
        Self {
            max_length: Some(max_length.into()),
            ..Self::default()
        }
    }

    /// Create an unmanaged field that only receives derived values
    pub fn derived(descriptor: DerivedDescriptor) -> Self {
        Self {
            derived: Some(descriptor),
            ..Self::default()
        }
    }

    /// Builder method: Disable fractional autofill
    pub fn without_autofill(mut self) -> Self {
        self.disable_autofill = true;
        self
    }

    /// Builder method: Disable grouping separators
    pub fn without_auto_comma(mut self) -> Self {
        self.disable_auto_comma = true;
        self
    }

    /// Builder method: Disable smart minus
    pub fn without_smart_minus(mut self) -> Self {
        self.disable_smart_minus = true;
        self
    }

    /// Builder method: Skip the initial refresh
    pub fn without_init_refresh(mut self) -> Self {
        self.disable_init_refresh = true;
        self
    }

    /// Builder method: Highlight negative values
    pub fn with_highlight_minus(mut self, color: Option<&str>) -> Self {
        self.highlight_minus = HighlightMinus::from_attribute(Some(color.unwrap_or_default()));
        self
    }

    /// Builder method: Set text alignment
    pub fn with_horizontal_align(mut self, align: HorizontalAlign) -> Self {
        self.horizontal_align = align;
        self
    }

    /// Builder method: Set the group name
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder method: Declare a derived value
    pub fn with_derived(mut self, descriptor: DerivedDescriptor) -> Self {
        self.derived = Some(descriptor);
        self
    }

    /// Build a configuration from element attributes.
    ///
    /// Boolean flags count as set when present, whatever their value. When
    /// several derived attributes are present the first in
    /// sum/product/difference/quotient/percent order wins; `data-ceil` takes
    /// precedence over `data-floor`.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attributes: Vec<(&str, &str)> = attributes.into_iter().collect();
        let get = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        };
        let has = |name: &str| get(name).is_some();

        let rounding = if has(attr::CEIL) {
            RoundingMode::Ceil
        } else if has(attr::FLOOR) {
            RoundingMode::Floor
        } else {
            RoundingMode::Round
        };

        let derived = [
            Operation::Sum,
            Operation::Product,
            Operation::Difference,
            Operation::Quotient,
            Operation::Percent,
        ]
        .into_iter()
        .find_map(|operation| {
            get(operation.attribute())
                .map(|selectors| DerivedDescriptor::new(operation, selectors).with_rounding(rounding))
        });

        Self {
            max_length: get(attr::MAX_LENGTH).map(str::to_string),
            disable_autofill: has(attr::DISABLE_AUTOFILL),
            disable_auto_comma: has(attr::DISABLE_AUTO_COMMA),
            disable_smart_minus: has(attr::DISABLE_SMART_MINUS),
            disable_init_refresh: has(attr::DISABLE_INIT_REFRESH),
            highlight_minus: HighlightMinus::from_attribute(get(attr::HIGHLIGHT_MINUS)),
            horizontal_align: HorizontalAlign::from_attribute(get(attr::HORIZONTAL_ALIGN)),
            group: get(attr::NAME).map(str::to_string),
            derived,
        }
    }

    /// Parse a configuration from its JSON interchange form.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the keystroke validator and focus/blur handling apply.
    #[inline]
    pub fn is_managed(&self) -> bool {
        self.max_length.is_some()
    }

    #[inline]
    pub fn autofill(&self) -> bool {
        !self.disable_autofill
    }

    #[inline]
    pub fn auto_comma(&self) -> bool {
        !self.disable_auto_comma
    }

    #[inline]
    pub fn smart_minus(&self) -> bool {
        !self.disable_smart_minus
    }

    /// Resolve the digit budget from the limit descriptor.
    pub fn limit_spec(&self) -> LimitSpec {
        LimitSpec::resolve(self.max_length.as_deref())
    }

    /// Validate the parts of the configuration that need no host lookup
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(max_length) = &self.max_length {
            match LimitSpec::requested_digits(max_length) {
                Some(digits) if digits > MAX_BUDGET_DIGITS => {
                    return Err(ConfigError::BudgetTooWide {
                        descriptor: max_length.clone(),
                        digits,
                    });
                },
                _ => {},
            }
        }
        if let Some(descriptor) = &self.derived {
            super::binding::split_selectors(descriptor)?;
        }
        Ok(())
    }
}
