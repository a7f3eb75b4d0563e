// ============================================================================
// Derived-Field Binding
// Target field, operation and source selectors of a computed value
// ============================================================================

use super::config::{ConfigError, ConfigResult, DerivedDescriptor, Operation};
use super::field::FieldId;
use crate::numeric::RoundingMode;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selector list of a binding: one entry for sum/product, two otherwise.
pub type Selectors = SmallVec<[String; 2]>;

/// A derived field wired to its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivedFieldBinding {
    pub target: FieldId,
    pub operation: Operation,
    pub sources: Selectors,
    pub rounding: RoundingMode,
}

impl DerivedFieldBinding {
    /// Bind a descriptor to its target field.
    ///
    /// # Errors
    /// `SelectorCount` when a binary operation does not have exactly two
    /// selectors, `EmptySelector` for blank selectors. Whether the primary
    /// selector matches exactly one field is checked by the evaluator, which
    /// can see the host.
    pub fn new(target: FieldId, descriptor: &DerivedDescriptor) -> ConfigResult<Self> {
        Ok(Self {
            target,
            operation: descriptor.operation,
            sources: split_selectors(descriptor)?,
            rounding: descriptor.rounding,
        })
    }

    /// Minuend/dividend selector, or the only selector of sum/product.
    pub fn primary(&self) -> &str {
        &self.sources[0]
    }

    /// Subtrahend/divisor selector of a binary operation.
    pub fn secondary(&self) -> Option<&str> {
        self.sources.get(1).map(String::as_str)
    }
}

/// Split a descriptor's selector text per its operation.
///
/// Sum and product keep the text whole, since one selector may itself be a
/// comma-separated union.
pub(crate) fn split_selectors(descriptor: &DerivedDescriptor) -> ConfigResult<Selectors> {
    let operation = descriptor.operation;
    let mut sources = Selectors::new();

    if operation.is_binary() {
        let parts: Vec<&str> = descriptor.selectors.split(',').collect();
        if parts.len() != 2 {
            return Err(ConfigError::SelectorCount {
                operation,
                expected: 2,
                received: parts.len(),
            });
        }
        sources.extend(parts.into_iter().map(|part| part.trim().to_string()));
    } else {
        sources.push(descriptor.selectors.trim().to_string());
    }

    if sources.iter().any(String::is_empty) {
        return Err(ConfigError::EmptySelector { operation });
    }

    Ok(sources)
}
