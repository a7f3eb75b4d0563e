// ============================================================================
// Edit State
// Field text, selection and keyboard input as seen by the validators
// ============================================================================

use super::locale::{Separators, MINUS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Selection
// ============================================================================

/// Selected span in character offsets. A caret is an empty selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection; the bounds are ordered if given reversed.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn caret(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

// ============================================================================
// Edit State
// ============================================================================

/// Lengths of the digit runs on either side of the decimal separator,
/// sign excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitRuns {
    pub integral: usize,
    pub fractional: usize,
}

impl DigitRuns {
    #[inline]
    pub fn total(&self) -> usize {
        self.integral + self.fractional
    }
}

/// Field text together with its selection, captured before an edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EditState {
    pub text: String,
    pub selection: Selection,
}

impl EditState {
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }

    /// Text with the caret at `position`.
    pub fn with_caret(text: impl Into<String>, position: usize) -> Self {
        Self::new(text, Selection::caret(position))
    }

    #[inline]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Caret position: the end of the selection.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    /// True when the selection spans the whole text (including the caret in
    /// an empty field).
    pub fn covers_all(&self) -> bool {
        self.selection.start == 0 && self.selection.end == self.char_len()
    }

    #[inline]
    pub fn has_sign(&self) -> bool {
        self.text.starts_with(MINUS)
    }

    /// Text without its leading sign.
    pub fn unsigned(&self) -> &str {
        self.text.strip_prefix(MINUS).unwrap_or(&self.text)
    }

    /// Character index of the decimal separator, if present.
    pub fn separator_index(&self, separators: &Separators) -> Option<usize> {
        self.text.chars().position(|c| separators.is_decimal(c))
    }

    pub fn has_separator(&self, separators: &Separators) -> bool {
        self.text.contains(separators.decimal)
    }

    /// Lengths of the integral and fractional runs of the unsigned text.
    pub fn runs(&self, separators: &Separators) -> DigitRuns {
        let unsigned = self.unsigned();
        match unsigned.split_once(separators.decimal) {
            Some((int_part, frac_part)) => DigitRuns {
                integral: int_part.chars().count(),
                fractional: frac_part.chars().count(),
            },
            None => DigitRuns {
                integral: unsigned.chars().count(),
                fractional: 0,
            },
        }
    }

    /// The selected text.
    pub fn selected(&self) -> &str {
        char_slice(&self.text, self.selection.start, self.selection.end)
    }

    /// Text before and after the caret.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        let at = byte_offset(&self.text, self.cursor());
        self.text.split_at(at)
    }
}

/// Byte offset of the `index`-th character (clamped to the text length).
pub fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Substring between two character offsets.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(text, start);
    let to = byte_offset(text, end.max(start));
    &text[from..to]
}

// ============================================================================
// Keyboard Input
// ============================================================================

/// A key as reported by the host's key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Key {
    /// A printable character (main block or numeric keypad)
    Char(char),
    Backspace,
    Delete,
    Tab,
    Enter,
    Escape,
    PageUp,
    PageDown,
    Home,
    End,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    F5,
    /// Anything the validator does not recognize
    Other,
}

/// A key-down event with its control modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// Shorthand for an unmodified character key.
    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }
}

/// Validation class of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// Not admissible in a numeric field
    None,
    Minus,
    Separator,
    Digit,
    /// Editing and movement keys that never insert text
    Navigation,
}

impl Key {
    /// Classify the key under the active separator convention.
    ///
    /// Only the convention's decimal character counts as a separator; the
    /// grouping character is never typed by hand.
    pub fn classify(self, separators: &Separators) -> KeyClass {
        match self {
            Key::Char(c) if separators.is_decimal(c) => KeyClass::Separator,
            Key::Char(MINUS) => KeyClass::Minus,
            Key::Char(c) if c.is_ascii_digit() => KeyClass::Digit,
            Key::Char(_) | Key::Other => KeyClass::None,
            Key::Backspace
            | Key::Delete
            | Key::Tab
            | Key::Enter
            | Key::Escape
            | Key::PageUp
            | Key::PageDown
            | Key::Home
            | Key::End
            | Key::ArrowLeft
            | Key::ArrowRight
            | Key::ArrowUp
            | Key::ArrowDown
            | Key::F5 => KeyClass::Navigation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NumberFormat;

    #[test]
    fn test_selection_ordering() {
        let selection = Selection::new(4, 1);
        assert_eq!(selection, Selection { start: 1, end: 4 });
        assert_eq!(selection.len(), 3);
        assert!(Selection::caret(2).is_empty());
    }

    #[test]
    fn test_runs_and_separator() {
        let separators = NumberFormat::En.separators();
        let state = EditState::with_caret("-123.45", 0);
        assert!(state.has_sign());
        assert_eq!(state.separator_index(&separators), Some(4));
        assert_eq!(
            state.runs(&separators),
            DigitRuns {
                integral: 3,
                fractional: 2
            }
        );
    }

    #[test]
    fn test_covers_all() {
        assert!(EditState::new("12", Selection::new(0, 2)).covers_all());
        assert!(EditState::with_caret("", 0).covers_all());
        assert!(!EditState::with_caret("12", 0).covers_all());
    }

    #[test]
    fn test_selected_and_split() {
        let state = EditState::new("12.34", Selection::new(1, 4));
        assert_eq!(state.selected(), "2.3");
        assert_eq!(state.split_at_cursor(), ("12.3", "4"));
    }

    #[test]
    fn test_classify_iso_and_es() {
        let iso = NumberFormat::Iso.separators();
        assert_eq!(Key::Char('.').classify(&iso), KeyClass::Separator);
        assert_eq!(Key::Char(',').classify(&iso), KeyClass::None);
        assert_eq!(Key::Char('7').classify(&iso), KeyClass::Digit);
        assert_eq!(Key::Char('-').classify(&iso), KeyClass::Minus);
        assert_eq!(Key::Home.classify(&iso), KeyClass::Navigation);
        assert_eq!(Key::Char('a').classify(&iso), KeyClass::None);

        let es = NumberFormat::Es.separators();
        assert_eq!(Key::Char(',').classify(&es), KeyClass::Separator);
        assert_eq!(Key::Char('.').classify(&es), KeyClass::None);
    }
}
