// ============================================================================
// Domain Models Module
// Field configuration, digit budgets, edit state and number formats
// ============================================================================

pub mod binding;
pub mod config;
pub mod edit;
pub mod field;
pub mod limit_spec;
pub mod locale;

pub use binding::{DerivedFieldBinding, Selectors};
pub use config::{
    ConfigError, ConfigResult, DerivedDescriptor, FieldConfig, HighlightMinus, HorizontalAlign,
    Operation, DEFAULT_MINUS_COLOR,
};
pub use edit::{DigitRuns, EditState, Key, KeyClass, KeyInput, Selection};
pub use field::FieldId;
pub use limit_spec::{LimitSpec, DEFAULT_INTEGRAL_DIGITS, MAX_BUDGET_DIGITS};
pub use locale::{NumberFormat, Separators, UnknownNumberFormat, MINUS};
