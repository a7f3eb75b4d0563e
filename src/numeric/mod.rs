// ============================================================================
// Numeric Module
// Scale-then-operate decimal arithmetic
// ============================================================================
//
// This module provides:
// - ScaledDecimal: exact decimal with a runtime place count
// - RoundingMode: nearest / floor / ceil at a given place count
// - NumericError: Error types for arithmetic operations
//
// Design principles:
// - No floating-point operations
// - All arithmetic returns Result (no panics)
// - Operands are aligned to a shared power of ten before any integer op

mod errors;
mod scaled_decimal;

pub use errors::{NumericError, NumericResult};
pub use scaled_decimal::{RoundingMode, ScaledDecimal, QUOTIENT_PLACES};
