// ============================================================================
// Decimal Field Library
// Digit-budgeted numeric input fields with exact decimal arithmetic
// ============================================================================

//! # Decimal Field
//!
//! Headless controller for numeric text fields that enforces a per-field digit
//! budget while the user types, formats values for display, and keeps derived
//! fields (sums, products, differences, quotients, percentages) in sync using
//! exact decimal arithmetic.
//!
//! ## Features
//!
//! - **Keystroke validation** against `[-]INTEGRAL[.FRACTIONAL]` budgets
//! - **Smart minus**: the minus key toggles the sign of the whole value
//! - **Display formatting** with grouping and fractional padding on blur
//! - **Derived fields** recomputed whenever a source field changes
//! - **Exact arithmetic**: `0.1 + 0.2 == 0.3`, no binary floating point
//! - **Runtime locale switch** between ISO, EN and ES separator conventions
//!
//! ## Example
//!
//! ```rust
//! use decimal_field::prelude::*;
//! use std::sync::Arc;
//!
//! let mut host = MemoryHost::new();
//! host.insert_with("a", "10.5", &["line"], None)
//!     .insert_with("b", "2.25", &["line"], None)
//!     .insert("total", "");
//!
//! let mut controller = FieldController::new(NumberFormat::En, Arc::new(NoOpEventHandler));
//! for id in ["a", "b"] {
//!     controller
//!         .register_field(Some(FieldId::new(id)), FieldConfig::new("5.2"), &mut host)
//!         .unwrap();
//! }
//! controller
//!     .register_field(
//!         Some(FieldId::new("total")),
//!         FieldConfig::new("7.2").with_derived(DerivedDescriptor::new(Operation::Sum, ".line")),
//!         &mut host,
//!     )
//!     .unwrap();
//!
//! // A sixth integral digit is refused
//! host.set_value(&FieldId::new("a"), "12345");
//! assert!(!controller.on_key_down(&FieldId::new("a"), KeyInput::char('6'), &host));
//!
//! host.set_value(&FieldId::new("a"), "10.5");
//! controller.on_change(&FieldId::new("a"), &mut host);
//! assert_eq!(host.value(&FieldId::new("total")).unwrap(), "12.75");
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ConfigError, DerivedDescriptor, EditState, FieldConfig, FieldId, HighlightMinus,
        HorizontalAlign, Key, KeyInput, LimitSpec, NumberFormat, Operation, Selection,
        Separators,
    };
    pub use crate::engine::{
        Calculator, FieldContext, FieldController, FieldControllerBuilder, Formatter,
        KeystrokeValidator,
    };
    pub use crate::interfaces::{
        EventHandler, FieldEvent, FieldHost, LoggingEventHandler, MemoryHost, NoOpEventHandler,
        ValueLookup,
    };
    pub use crate::numeric::{RoundingMode, ScaledDecimal};
}
