// ============================================================================
// Field Host Interface
// The embedder-side binding that owns the actual input elements
// ============================================================================

use crate::domain::edit::{byte_offset, char_slice};
use crate::domain::{EditState, FieldId, HorizontalAlign, Selection};

/// Access to the elements hosting numeric fields.
///
/// The host resolves selectors, reads and writes field text and selection,
/// and applies the visual hints the controller computes. Event wiring stays
/// with the host: it forwards key-down, focus, blur, change and composition
/// events to the [`FieldController`](crate::engine::FieldController).
pub trait FieldHost {
    /// Current text, `None` if the field does not exist.
    fn value(&self, field: &FieldId) -> Option<String>;

    fn set_value(&mut self, field: &FieldId, value: &str);

    fn selection(&self, field: &FieldId) -> Selection;

    fn set_selection(&mut self, field: &FieldId, selection: Selection);

    /// Fields matched by a selector, in document order.
    fn resolve(&self, selector: &str) -> Vec<FieldId>;

    /// Show or clear the negative-value marker.
    fn set_negative_marker(&mut self, _field: &FieldId, _color: Option<&str>) {}

    fn set_alignment(&mut self, _field: &FieldId, _align: HorizontalAlign) {}

    /// Text and selection captured together.
    fn edit_state(&self, field: &FieldId) -> Option<EditState> {
        self.value(field)
            .map(|text| EditState::new(text, self.selection(field)))
    }
}

/// One-hop lookup of a referenced field's text.
pub trait ValueLookup {
    fn lookup(&self, reference: &str) -> Option<String>;
}

impl<T: FieldHost + ?Sized> ValueLookup for T {
    fn lookup(&self, reference: &str) -> Option<String> {
        self.resolve(reference)
            .first()
            .and_then(|field| self.value(field))
    }
}

// ============================================================================
// In-Memory Host
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryField {
    id: FieldId,
    classes: Vec<String>,
    name: Option<String>,
    value: String,
    selection: Selection,
    marker: Option<String>,
    align: Option<HorizontalAlign>,
}

/// Headless [`FieldHost`] holding fields in insertion order.
///
/// Supports `#id`, `.class` and `[name=value]` selectors and comma-separated
/// unions of them. Also simulates the browser's native edits so deferred
/// rewrites can be exercised without a UI.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    fields: Vec<MemoryField>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with the caret at the end of its text.
    pub fn insert(&mut self, id: impl Into<FieldId>, value: &str) -> &mut Self {
        self.insert_with(id, value, &[], None)
    }

    /// Add a field with classes and a group name.
    pub fn insert_with(
        &mut self,
        id: impl Into<FieldId>,
        value: &str,
        classes: &[&str],
        name: Option<&str>,
    ) -> &mut Self {
        self.fields.push(MemoryField {
            id: id.into(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            name: name.map(str::to_string),
            value: value.to_string(),
            selection: Selection::caret(value.chars().count()),
            marker: None,
            align: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn marker(&self, field: &FieldId) -> Option<&str> {
        self.get(field).and_then(|f| f.marker.as_deref())
    }

    pub fn alignment(&self, field: &FieldId) -> Option<HorizontalAlign> {
        self.get(field).and_then(|f| f.align)
    }

    /// Replace the selection with `text` the way a native insertion or paste
    /// would, leaving the caret after the inserted text.
    pub fn native_insert(&mut self, field: &FieldId, text: &str) {
        if let Some(f) = self.get_mut(field) {
            let start = byte_offset(&f.value, f.selection.start);
            let end = byte_offset(&f.value, f.selection.end);
            f.value.replace_range(start..end, text);
            let caret = f.selection.start + text.chars().count();
            f.selection = Selection::caret(caret);
        }
    }

    /// Remove the selection (cut), returning the removed text.
    pub fn native_cut(&mut self, field: &FieldId) -> Option<String> {
        let f = self.get_mut(field)?;
        let removed = char_slice(&f.value, f.selection.start, f.selection.end).to_string();
        let start = byte_offset(&f.value, f.selection.start);
        let end = byte_offset(&f.value, f.selection.end);
        f.value.replace_range(start..end, "");
        f.selection = Selection::caret(f.selection.start);
        Some(removed)
    }

    fn get(&self, field: &FieldId) -> Option<&MemoryField> {
        self.fields.iter().find(|f| &f.id == field)
    }

    fn get_mut(&mut self, field: &FieldId) -> Option<&mut MemoryField> {
        self.fields.iter_mut().find(|f| &f.id == field)
    }

    fn matches(field: &MemoryField, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            field.id.as_str() == id
        } else if let Some(class) = selector.strip_prefix('.') {
            field.classes.iter().any(|c| c == class)
        } else if let Some(name) = selector
            .strip_prefix("[name=")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = name.trim_matches(|c| c == '"' || c == '\'');
            field.name.as_deref() == Some(name)
        } else {
            false
        }
    }
}

impl FieldHost for MemoryHost {
    fn value(&self, field: &FieldId) -> Option<String> {
        self.get(field).map(|f| f.value.clone())
    }

    fn set_value(&mut self, field: &FieldId, value: &str) {
        if let Some(f) = self.get_mut(field) {
            f.value = value.to_string();
            f.selection = Selection::caret(value.chars().count());
        }
    }

    fn selection(&self, field: &FieldId) -> Selection {
        self.get(field).map(|f| f.selection).unwrap_or_default()
    }

    fn set_selection(&mut self, field: &FieldId, selection: Selection) {
        if let Some(f) = self.get_mut(field) {
            let len = f.value.chars().count();
            f.selection = Selection::new(selection.start.min(len), selection.end.min(len));
        }
    }

    fn resolve(&self, selector: &str) -> Vec<FieldId> {
        let parts: Vec<&str> = selector
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        self.fields
            .iter()
            .filter(|f| parts.iter().any(|part| Self::matches(f, part)))
            .map(|f| f.id.clone())
            .collect()
    }

    fn set_negative_marker(&mut self, field: &FieldId, color: Option<&str>) {
        if let Some(f) = self.get_mut(field) {
            f.marker = color.map(str::to_string);
        }
    }

    fn set_alignment(&mut self, field: &FieldId, align: HorizontalAlign) {
        if let Some(f) = self.get_mut(field) {
            f.align = Some(align);
        }
    }
}
