// ============================================================================
// Selection-Replace Validator
// Guards deletions that would merge the fraction into the integral run
// ============================================================================

use crate::domain::{EditState, LimitSpec, Separators};

/// Decides whether removing the current selection keeps the integral run
/// within budget.
///
/// Removing a selection that spans the decimal separator joins whatever
/// digits remain into one integral run.
#[derive(Debug, Clone, Copy)]
pub struct SelectionValidator<'a> {
    spec: &'a LimitSpec,
    separators: &'a Separators,
}

impl<'a> SelectionValidator<'a> {
    pub fn new(spec: &'a LimitSpec, separators: &'a Separators) -> Self {
        Self { spec, separators }
    }

    pub fn validate(&self, state: &EditState) -> bool {
        let selection = state.selection;
        if selection.is_empty() {
            return true;
        }
        if !state.selected().contains(self.separators.decimal) {
            return true;
        }

        let remaining = state
            .text
            .chars()
            .enumerate()
            .filter(|&(i, c)| c.is_ascii_digit() && !(selection.start..selection.end).contains(&i))
            .count();

        remaining <= self.spec.integral_budget()
    }
}
