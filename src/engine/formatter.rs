// ============================================================================
// Presentation Formatter
// Editing form <-> display form of field text
// ============================================================================

use crate::domain::edit::char_slice;
use crate::domain::{EditState, FieldConfig, LimitSpec, Selection, Separators, MINUS};
use crate::engine::arithmetic::Calculator;

/// Result of settling a field for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub text: String,
    /// Negative-value marker to show, if the field asks for one
    pub marker: Option<String>,
}

/// Text transforms between the editing and display forms of a value.
///
/// Every transform is the identity on text that does not parse as a number,
/// so partially typed or blank fields pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    calculator: Calculator,
}

impl Formatter {
    pub fn new(separators: Separators) -> Self {
        Self {
            calculator: Calculator::new(separators),
        }
    }

    #[inline]
    pub fn separators(&self) -> &Separators {
        self.calculator.separators()
    }

    #[inline]
    fn is_numeric(&self, text: &str) -> bool {
        self.calculator.is_numeric(text)
    }

    // ========================================================================
    // Primitive Transforms
    // ========================================================================

    /// Remove superfluous leading zeros: `"007"` -> `"7"`, `"-.5"` -> `"-0.5"`.
    pub fn drain_integral(&self, text: &str) -> String {
        if !self.is_numeric(text) {
            return text.to_string();
        }

        let trimmed = text.trim();
        let (sign, abs) = split_sign(trimmed);
        let grouping = self.separators().grouping;
        let digits = abs.trim_start_matches(|c| c == '0' || c == grouping);

        if digits.is_empty() || digits.starts_with(self.separators().decimal) {
            format!("{}0{}", sign, digits)
        } else {
            format!("{}{}", sign, digits)
        }
    }

    /// Remove trailing fractional zeros, and the separator if nothing is left.
    pub fn drain_fractional(&self, text: &str) -> String {
        if !self.is_numeric(text) {
            return text.to_string();
        }

        let trimmed = text.trim();
        let Some((int_part, frac_part)) = trimmed.split_once(self.separators().decimal) else {
            return trimmed.to_string();
        };

        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}{}{}", int_part, self.separators().decimal, frac_part)
        }
    }

    /// Pad the fractional run with zeros up to `digits`. Never truncates.
    pub fn fill_fractional(&self, text: &str, digits: Option<u32>) -> String {
        let digits = digits.unwrap_or(0) as usize;
        if digits == 0 || !self.is_numeric(text) {
            return text.to_string();
        }

        let trimmed = text.trim();
        let (int_part, frac_part) = trimmed
            .split_once(self.separators().decimal)
            .unwrap_or((trimmed, ""));
        format!(
            "{}{}{:0<width$}",
            int_part,
            self.separators().decimal,
            frac_part,
            width = digits
        )
    }

    /// Insert grouping separators every three integral digits.
    pub fn dress_number(&self, text: &str) -> String {
        if !self.is_numeric(text) {
            return text.to_string();
        }

        let undressed = self.undress_number(text);
        let separators = self.separators();
        let (int_part, frac_part) = match undressed.split_once(separators.decimal) {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (undressed.as_str(), None),
        };

        let lead = int_part
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(int_part.len());
        let (prefix, digits) = int_part.split_at(lead);

        let mut dressed = String::with_capacity(undressed.len() + digits.len() / 3);
        dressed.push_str(prefix);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                dressed.push(separators.grouping);
            }
            dressed.push(c);
        }
        if let Some(frac_part) = frac_part {
            dressed.push(separators.decimal);
            dressed.push_str(frac_part);
        }
        dressed
    }

    /// Remove grouping separators.
    pub fn undress_number(&self, text: &str) -> String {
        if !self.is_numeric(text) {
            return text.to_string();
        }

        let grouping = self.separators().grouping;
        text.trim().chars().filter(|&c| c != grouping).collect()
    }

    // ========================================================================
    // Field Transitions
    // ========================================================================

    /// Display form of a value: leading zeros drained, fraction padded to
    /// the budget, grouping inserted, per the field's options.
    pub fn settle(&self, text: &str, spec: &LimitSpec, config: &FieldConfig) -> Settled {
        let mut value = self.drain_integral(text);
        if config.autofill() {
            value = self.drain_fractional(&value);
            value = self.fill_fractional(&value, spec.fractional);
        }
        if config.auto_comma() {
            value = self.dress_number(&value);
        }

        let marker = if value.starts_with(MINUS) {
            config.highlight_minus.color().map(str::to_string)
        } else {
            None
        };

        Settled {
            text: value,
            marker,
        }
    }

    /// Editing form of a value.
    pub fn unsettle(&self, text: &str, config: &FieldConfig) -> String {
        let mut value = text.to_string();
        if config.autofill() {
            value = self.drain_fractional(&value);
        }
        if config.auto_comma() {
            value = self.undress_number(&value);
        }
        value
    }

    /// Editing form with the caret moved to where the text before it ended
    /// up after the transform.
    pub fn focus(&self, state: &EditState, config: &FieldConfig) -> EditState {
        let text = self.unsettle(&state.text, config);
        let before = char_slice(&state.text, 0, state.cursor());
        let cursor = self
            .unsettle(before, config)
            .chars()
            .count()
            .min(text.chars().count());

        EditState::new(text, Selection::caret(cursor))
    }

    /// Rewrite numeric text from this convention into `target`'s, without
    /// grouping. Non-numeric text is returned unchanged.
    pub fn translate(&self, text: &str, target: &Formatter) -> String {
        if !self.is_numeric(text) {
            return text.to_string();
        }

        let from = self.separators().decimal;
        let to = target.separators().decimal;
        self.undress_number(text)
            .chars()
            .map(|c| if c == from { to } else { c })
            .collect()
    }

    /// Canonical `.`-separated number text written in this convention.
    pub fn localize(&self, canonical: &str) -> String {
        let decimal = self.separators().decimal;
        canonical
            .chars()
            .map(|c| if c == '.' { decimal } else { c })
            .collect()
    }
}

fn split_sign(text: &str) -> (&str, &str) {
    match text.strip_prefix(MINUS) {
        Some(rest) => (&text[..MINUS.len_utf8()], rest),
        None => ("", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HighlightMinus, NumberFormat};

    fn en() -> Formatter {
        Formatter::new(NumberFormat::En.separators())
    }

    fn es() -> Formatter {
        Formatter::new(NumberFormat::Es.separators())
    }

    #[test]
    fn test_drain_integral() {
        let f = en();
        assert_eq!(f.drain_integral("007"), "7");
        assert_eq!(f.drain_integral("-007.50"), "-7.50");
        assert_eq!(f.drain_integral(".5"), "0.5");
        assert_eq!(f.drain_integral("-.5"), "-0.5");
        assert_eq!(f.drain_integral("000"), "0");
        assert_eq!(f.drain_integral("1,000"), "1,000");
        assert_eq!(f.drain_integral("abc"), "abc");
        assert_eq!(f.drain_integral(""), "");
        assert_eq!(f.drain_integral("-"), "-");
    }

    #[test]
    fn test_drain_fractional() {
        let f = en();
        assert_eq!(f.drain_fractional("1.500"), "1.5");
        assert_eq!(f.drain_fractional("1.000"), "1");
        assert_eq!(f.drain_fractional("1."), "1");
        assert_eq!(f.drain_fractional("100"), "100");
        assert_eq!(es().drain_fractional("2,10"), "2,1");
    }

    #[test]
    fn test_fill_fractional() {
        let f = en();
        assert_eq!(f.fill_fractional("1", Some(2)), "1.00");
        assert_eq!(f.fill_fractional("1.5", Some(3)), "1.500");
        assert_eq!(f.fill_fractional("1.2345", Some(2)), "1.2345");
        assert_eq!(f.fill_fractional("1", None), "1");
        assert_eq!(f.fill_fractional("", Some(2)), "");
        assert_eq!(es().fill_fractional("3", Some(1)), "3,0");
    }

    #[test]
    fn test_dress_and_undress() {
        let f = en();
        assert_eq!(f.dress_number("1234567.891"), "1,234,567.891");
        assert_eq!(f.dress_number("-1234"), "-1,234");
        assert_eq!(f.dress_number("123"), "123");
        assert_eq!(f.dress_number("1,2345"), "12,345");
        assert_eq!(f.dress_number("5."), "5.");
        assert_eq!(f.undress_number("1,234,567.891"), "1234567.891");
        assert_eq!(f.undress_number("1,2,3x"), "1,2,3x");

        assert_eq!(es().dress_number("1234,5"), "1.234,5");

        let iso = Formatter::new(NumberFormat::Iso.separators());
        assert_eq!(iso.dress_number("1234567"), "1 234 567");
        assert_eq!(iso.undress_number("1 234 567"), "1234567");
    }

    #[test]
    fn test_settle() {
        let f = en();
        let spec = LimitSpec::new(7, Some(2), true);
        let config = FieldConfig::new("-7.2").with_highlight_minus(None);

        let settled = f.settle("0001234.5", &spec, &config);
        assert_eq!(settled.text, "1,234.50");
        assert_eq!(settled.marker, None);

        let negative = f.settle("-12.100", &spec, &config);
        assert_eq!(negative.text, "-12.10");
        assert_eq!(negative.marker.as_deref(), Some("#FF0000"));

        assert_eq!(f.settle("", &spec, &config).text, "");
    }

    #[test]
    fn test_settle_respects_options() {
        let f = en();
        let spec = LimitSpec::new(7, Some(2), false);
        let config = FieldConfig::new("7.2")
            .without_autofill()
            .without_auto_comma();
        let settled = f.settle("01234.500", &spec, &config);
        assert_eq!(settled.text, "1234.500");
        assert_eq!(config.highlight_minus, HighlightMinus::Off);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let f = en();
        let spec = LimitSpec::new(9, Some(3), true);
        let config = FieldConfig::new("-9.3");
        let once = f.settle("-001234567.5", &spec, &config).text;
        let twice = f.settle(&once, &spec, &config).text;
        assert_eq!(once, "-1,234,567.500");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_focus_repositions_cursor() {
        let f = en();
        let config = FieldConfig::new("7.2");

        // caret after "1,23"
        let state = EditState::with_caret("1,234.50", 4);
        let focused = f.focus(&state, &config);
        assert_eq!(focused.text, "1234.5");
        assert_eq!(focused.cursor(), 3);

        let at_end = f.focus(&EditState::with_caret("1,234.50", 8), &config);
        assert_eq!(at_end.cursor(), 6);
    }

    #[test]
    fn test_focus_repositions_cursor_es() {
        let f = es();
        let config = FieldConfig::new("-7.2");

        // caret after "-1.23"
        let focused = f.focus(&EditState::with_caret("-1.234,50", 5), &config);
        assert_eq!(focused.text, "-1234,5");
        assert_eq!(focused.cursor(), 4);

        let at_end = f.focus(&EditState::with_caret("-1.234,50", 9), &config);
        assert_eq!(at_end.cursor(), 7);
    }

    #[test]
    fn test_translate() {
        assert_eq!(en().translate("1,234.5", &es()), "1234,5");
        assert_eq!(es().translate("1.234,5", &en()), "1234.5");
        assert_eq!(en().translate("n/a", &es()), "n/a");
    }

    #[test]
    fn test_localize() {
        assert_eq!(es().localize("-12.75"), "-12,75");
        assert_eq!(en().localize("3"), "3");
    }
}
