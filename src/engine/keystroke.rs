// ============================================================================
// Keystroke Validator
// Accept/reject decision for one key-down against a field's digit budget
// ============================================================================

use crate::domain::{EditState, Key, KeyClass, KeyInput, LimitSpec, Separators, MINUS};
use crate::engine::scheduler::Rewrite;
use crate::engine::selection::SelectionValidator;

/// Outcome of validating a key-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDecision {
    /// Whether the host should perform the key's native action
    pub accept: bool,

    /// Corrective rewrite to run once the event has finished
    pub rewrite: Option<Rewrite>,
}

impl KeyDecision {
    #[inline]
    pub fn accept() -> Self {
        Self {
            accept: true,
            rewrite: None,
        }
    }

    #[inline]
    pub fn reject() -> Self {
        Self {
            accept: false,
            rewrite: None,
        }
    }

    #[inline]
    fn from_bool(accept: bool) -> Self {
        if accept {
            Self::accept()
        } else {
            Self::reject()
        }
    }

    pub fn with_rewrite(mut self, rewrite: Rewrite) -> Self {
        self.rewrite = Some(rewrite);
        self
    }
}

/// Validates key-downs for one field.
///
/// The decision is made on the text and selection *before* the key's native
/// action. Rejections that need a different edit instead (sign toggle,
/// `0.` insertion) carry it as a deferred [`Rewrite::Replace`].
///
/// # Example
/// ```
/// use decimal_field::domain::{EditState, KeyInput, LimitSpec, NumberFormat};
/// use decimal_field::engine::KeystrokeValidator;
///
/// let spec = LimitSpec::new(3, None, false);
/// let separators = NumberFormat::En.separators();
/// let validator = KeystrokeValidator::new(&spec, &separators);
///
/// assert!(validator.validate(&EditState::with_caret("12", 2), KeyInput::char('3')).accept);
/// assert!(!validator.validate(&EditState::with_caret("123", 3), KeyInput::char('4')).accept);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KeystrokeValidator<'a> {
    spec: &'a LimitSpec,
    separators: &'a Separators,
    smart_minus: bool,
}

impl<'a> KeystrokeValidator<'a> {
    pub fn new(spec: &'a LimitSpec, separators: &'a Separators) -> Self {
        Self {
            spec,
            separators,
            smart_minus: true,
        }
    }

    /// Builder method: toggle the value's sign on minus (default) or insert
    /// a literal sign
    pub fn with_smart_minus(mut self, smart_minus: bool) -> Self {
        self.smart_minus = smart_minus;
        self
    }

    pub fn validate(&self, state: &EditState, input: KeyInput) -> KeyDecision {
        if input.ctrl {
            return self.combination(state, input.key);
        }

        match input.key.classify(self.separators) {
            KeyClass::None => KeyDecision::reject(),
            KeyClass::Minus => self.minus(state),
            KeyClass::Separator => self.separator(state),
            KeyClass::Digit => KeyDecision::from_bool(self.digit(state)),
            KeyClass::Navigation => KeyDecision::from_bool(self.navigation(state, input.key)),
        }
    }

    fn combination(&self, state: &EditState, key: Key) -> KeyDecision {
        match key {
            Key::Char('v' | 'V') => KeyDecision::accept().with_rewrite(Rewrite::VerifyPaste {
                original: state.clone(),
            }),
            Key::Char('x' | 'X') => KeyDecision::from_bool(self.selection().validate(state)),
            _ => KeyDecision::accept(),
        }
    }

    fn selection(&self) -> SelectionValidator<'a> {
        SelectionValidator::new(self.spec, self.separators)
    }

    // ========================================================================
    // Key Classes
    // ========================================================================

    fn minus(&self, state: &EditState) -> KeyDecision {
        if !self.spec.allow_minus {
            return KeyDecision::reject();
        }

        if !self.smart_minus {
            let accept = state.covers_all() || (!state.has_sign() && state.cursor() == 0);
            return KeyDecision::from_bool(accept);
        }

        let cursor = state.cursor();
        let (text, cursor) = if state.has_sign() {
            (state.unsigned().to_string(), cursor.saturating_sub(1))
        } else {
            (format!("{}{}", MINUS, state.text), cursor + 1)
        };
        KeyDecision::reject().with_rewrite(Rewrite::Replace { text, cursor })
    }

    fn separator(&self, state: &EditState) -> KeyDecision {
        if !self.spec.allows_fraction() {
            return KeyDecision::reject();
        }

        let decimal = self.separators.decimal;
        if state.covers_all() {
            return KeyDecision::reject().with_rewrite(Rewrite::Replace {
                text: format!("0{}", decimal),
                cursor: 2,
            });
        }

        let cursor = state.cursor();
        if state.has_separator(self.separators) || (state.has_sign() && cursor == 0) {
            return KeyDecision::reject();
        }

        let (left, right) = state.split_at_cursor();
        let sign = if left.starts_with(MINUS) { &left[..MINUS.len_utf8()] } else { "" };
        let left_digits = left[sign.len()..].chars().count();
        let right_digits = right.chars().count();
        let fits = self.spec.fits(left_digits, right_digits);

        let integral_start = if state.has_sign() { 1 } else { 0 };
        if cursor == integral_start {
            if !fits {
                return KeyDecision::reject();
            }
            return KeyDecision::reject().with_rewrite(Rewrite::Replace {
                text: format!("{}0{}{}", left, decimal, right),
                cursor: cursor + 2,
            });
        }

        KeyDecision::from_bool(fits)
    }

    fn digit(&self, state: &EditState) -> bool {
        if state.covers_all() {
            return true;
        }

        let cursor = state.cursor();
        if state.has_sign() && cursor == 0 {
            return false;
        }

        let runs = state.runs(self.separators);
        match state.separator_index(self.separators) {
            None => runs.integral < self.spec.integral_budget(),
            Some(dot) if cursor <= dot => runs.integral < self.spec.integral_budget(),
            Some(_) => runs.fractional < self.spec.fractional_budget(),
        }
    }

    fn navigation(&self, state: &EditState, key: Key) -> bool {
        if state.covers_all() {
            return true;
        }

        let deletes_forward = match key {
            Key::Backspace => false,
            Key::Delete => true,
            _ => return true,
        };

        if !state.selection.is_empty() {
            return self.selection().validate(state);
        }

        let Some(dot) = state.separator_index(self.separators) else {
            return true;
        };
        let at_separator = if deletes_forward {
            state.cursor() == dot
        } else {
            state.cursor() == dot + 1
        };

        !(at_separator && state.runs(self.separators).total() > self.spec.integral_budget())
    }
}

// ============================================================================
// Paste Verification
// ============================================================================

/// Whether text left by a paste is admissible for the budget: digits only,
/// at most one decimal separator (when fractions are allowed), at most one
/// leading minus (when signs are allowed), and both runs within budget.
pub fn is_paste_valid(text: &str, spec: &LimitSpec, separators: &Separators) -> bool {
    let mut seen_separator = false;

    for (i, c) in text.chars().enumerate() {
        if c == MINUS {
            if !spec.allow_minus || i != 0 {
                return false;
            }
        } else if separators.is_decimal(c) {
            if !spec.allows_fraction() || seen_separator {
                return false;
            }
            seen_separator = true;
        } else if !c.is_ascii_digit() {
            return false;
        }
    }

    let runs = EditState::with_caret(text, 0).runs(separators);
    spec.fits(runs.integral, runs.fractional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NumberFormat, Selection};

    fn en() -> Separators {
        NumberFormat::En.separators()
    }

    fn check(spec: &LimitSpec, state: &EditState, input: KeyInput) -> KeyDecision {
        let separators = en();
        KeystrokeValidator::new(spec, &separators).validate(state, input)
    }

    fn replace(text: &str, cursor: usize) -> Option<Rewrite> {
        Some(Rewrite::Replace {
            text: text.to_string(),
            cursor,
        })
    }

    #[test]
    fn test_rejects_foreign_characters() {
        let spec = LimitSpec::new(5, Some(2), true);
        let state = EditState::with_caret("12", 2);
        assert!(!check(&spec, &state, KeyInput::char('a')).accept);
        assert!(!check(&spec, &state, KeyInput::char(',')).accept);
        assert!(!check(&spec, &state, KeyInput::plain(Key::Other)).accept);
    }

    #[test]
    fn test_integral_budget() {
        let spec = LimitSpec::new(5, Some(2), false);
        assert!(check(&spec, &EditState::with_caret("1234", 4), KeyInput::char('5')).accept);
        assert!(!check(&spec, &EditState::with_caret("12345", 5), KeyInput::char('6')).accept);
        // integral run full, typing into the fraction is still fine
        assert!(check(&spec, &EditState::with_caret("12345.", 6), KeyInput::char('6')).accept);
        assert!(!check(&spec, &EditState::with_caret("12345.6", 2), KeyInput::char('6')).accept);
    }

    #[test]
    fn test_fractional_budget() {
        let spec = LimitSpec::new(5, Some(2), false);
        assert!(check(&spec, &EditState::with_caret("1.2", 3), KeyInput::char('3')).accept);
        assert!(!check(&spec, &EditState::with_caret("1.23", 4), KeyInput::char('4')).accept);
        assert!(check(&spec, &EditState::with_caret("1.23", 1), KeyInput::char('4')).accept);
    }

    #[test]
    fn test_digit_with_whole_selection() {
        let spec = LimitSpec::new(2, None, false);
        let state = EditState::new("99", Selection::new(0, 2));
        assert!(check(&spec, &state, KeyInput::char('1')).accept);
    }

    #[test]
    fn test_digit_in_front_of_sign() {
        let spec = LimitSpec::new(5, None, true);
        assert!(!check(&spec, &EditState::with_caret("-12", 0), KeyInput::char('1')).accept);
        assert!(check(&spec, &EditState::with_caret("-12", 1), KeyInput::char('1')).accept);
    }

    #[test]
    fn test_smart_minus_toggles() {
        let spec = LimitSpec::new(5, None, true);

        let decision = check(&spec, &EditState::with_caret("123", 1), KeyInput::char('-'));
        assert!(!decision.accept);
        assert_eq!(decision.rewrite, replace("-123", 2));

        let decision = check(&spec, &EditState::with_caret("-123", 2), KeyInput::char('-'));
        assert_eq!(decision.rewrite, replace("123", 1));

        let decision = check(&spec, &EditState::with_caret("-123", 0), KeyInput::char('-'));
        assert_eq!(decision.rewrite, replace("123", 0));

        let decision = check(&spec, &EditState::with_caret("", 0), KeyInput::char('-'));
        assert_eq!(decision.rewrite, replace("-", 1));
    }

    #[test]
    fn test_minus_without_sign_budget() {
        let spec = LimitSpec::new(5, None, false);
        let decision = check(&spec, &EditState::with_caret("123", 0), KeyInput::char('-'));
        assert_eq!(decision, KeyDecision::reject());
    }

    #[test]
    fn test_literal_minus() {
        let spec = LimitSpec::new(5, None, true);
        let separators = en();
        let validator = KeystrokeValidator::new(&spec, &separators).with_smart_minus(false);

        assert!(validator.validate(&EditState::with_caret("12", 0), KeyInput::char('-')).accept);
        assert!(!validator.validate(&EditState::with_caret("12", 1), KeyInput::char('-')).accept);
        assert!(!validator.validate(&EditState::with_caret("-12", 0), KeyInput::char('-')).accept);
        assert!(validator
            .validate(&EditState::new("-12", Selection::new(0, 3)), KeyInput::char('-'))
            .accept);
    }

    #[test]
    fn test_separator_rules() {
        let spec = LimitSpec::new(3, Some(2), true);

        // no fractional budget
        let integral_only = LimitSpec::new(3, None, false);
        assert!(!check(&integral_only, &EditState::with_caret("1", 1), KeyInput::char('.')).accept);

        // already present
        assert!(!check(&spec, &EditState::with_caret("1.2", 1), KeyInput::char('.')).accept);

        // in front of the sign
        assert!(!check(&spec, &EditState::with_caret("-12", 0), KeyInput::char('.')).accept);

        // runs must fit
        assert!(check(&spec, &EditState::with_caret("123", 3), KeyInput::char('.')).accept);
        assert!(check(&spec, &EditState::with_caret("123", 1), KeyInput::char('.')).accept);
        assert!(!check(&spec, &EditState::with_caret("1234", 1), KeyInput::char('.')).accept);
        assert!(!check(&spec, &EditState::with_caret("123", 0), KeyInput::char('.')).accept);
    }

    #[test]
    fn test_separator_whole_selection() {
        let spec = LimitSpec::new(3, Some(2), false);
        let decision = check(&spec, &EditState::new("12", Selection::new(0, 2)), KeyInput::char('.'));
        assert!(!decision.accept);
        assert_eq!(decision.rewrite, replace("0.", 2));
    }

    #[test]
    fn test_separator_at_integral_start() {
        let spec = LimitSpec::new(3, Some(2), true);

        let decision = check(&spec, &EditState::with_caret("5", 0), KeyInput::char('.'));
        assert!(!decision.accept);
        assert_eq!(decision.rewrite, replace("0.5", 2));

        let decision = check(&spec, &EditState::with_caret("-5", 1), KeyInput::char('.'));
        assert_eq!(decision.rewrite, replace("-0.5", 3));
    }

    #[test]
    fn test_separator_es_convention() {
        let spec = LimitSpec::new(3, Some(2), false);
        let separators = NumberFormat::Es.separators();
        let validator = KeystrokeValidator::new(&spec, &separators);
        assert!(validator.validate(&EditState::with_caret("12", 2), KeyInput::char(',')).accept);
        assert!(!validator.validate(&EditState::with_caret("12", 2), KeyInput::char('.')).accept);
    }

    #[test]
    fn test_merge_guard_on_delete() {
        let spec = LimitSpec::new(3, Some(2), false);
        let state = EditState::with_caret("123.45", 4);
        assert!(!check(&spec, &state, KeyInput::plain(Key::Backspace)).accept);

        let state = EditState::with_caret("123.45", 3);
        assert!(!check(&spec, &state, KeyInput::plain(Key::Delete)).accept);
        assert!(check(&spec, &state, KeyInput::plain(Key::Backspace)).accept);

        let short = EditState::with_caret("1.2", 2);
        assert!(check(&spec, &short, KeyInput::plain(Key::Backspace)).accept);
    }

    #[test]
    fn test_navigation_keys_accept() {
        let spec = LimitSpec::new(1, Some(1), false);
        let state = EditState::with_caret("1.2", 2);
        for key in [Key::ArrowLeft, Key::Home, Key::Tab, Key::Enter, Key::F5] {
            assert!(check(&spec, &state, KeyInput::plain(key)).accept);
        }
    }

    #[test]
    fn test_ctrl_combinations() {
        let spec = LimitSpec::new(1, Some(2), false);
        let state = EditState::new("12.34", Selection::new(1, 4));

        let paste = check(&spec, &state, KeyInput::ctrl(Key::Char('v')));
        assert!(paste.accept);
        assert_eq!(
            paste.rewrite,
            Some(Rewrite::VerifyPaste {
                original: state.clone()
            })
        );

        // cutting "2.3" leaves "14" against an integral budget of 1
        assert!(!check(&spec, &state, KeyInput::ctrl(Key::Char('x'))).accept);
        assert!(check(&spec, &state, KeyInput::ctrl(Key::Char('c'))).accept);
    }

    #[test]
    fn test_paste_validity() {
        let separators = en();
        let spec = LimitSpec::new(3, Some(2), true);
        assert!(is_paste_valid("-123.45", &spec, &separators));
        assert!(is_paste_valid("", &spec, &separators));
        assert!(!is_paste_valid("1234", &spec, &separators));
        assert!(!is_paste_valid("1.234", &spec, &separators));
        assert!(!is_paste_valid("1-2", &spec, &separators));
        assert!(!is_paste_valid("--1", &spec, &separators));
        assert!(!is_paste_valid("1.2.3", &spec, &separators));
        assert!(!is_paste_valid("1,2", &spec, &separators));
        assert!(!is_paste_valid("12a", &spec, &separators));

        let unsigned = LimitSpec::new(3, None, false);
        assert!(!is_paste_valid("-1", &unsigned, &separators));
        assert!(!is_paste_valid("1.", &unsigned, &separators));
    }
}
