// ============================================================================
// Engine Module
// Keystroke validation, formatting, arithmetic and derived-field evaluation
// ============================================================================

mod arithmetic;
mod controller;
mod derived;
mod formatter;
mod keystroke;
mod registry;
mod scheduler;
mod selection;

pub mod factory;

pub use arithmetic::{BlendTerm, Calculator, Operand, Resolution};
pub use controller::FieldController;
pub use derived::{cap_to_budget, DerivedEvaluator, DerivedUpdate};
pub use factory::FieldControllerBuilder;
pub use formatter::{Formatter, Settled};
pub use keystroke::{is_paste_valid, KeyDecision, KeystrokeValidator};
pub use registry::{FieldContext, FieldRegistry};
pub use scheduler::{Rewrite, RewriteQueue};
pub use selection::SelectionValidator;
