// ============================================================================
// Field Controller
// Routes host events through the validators, formatter and evaluator
// ============================================================================

use crate::domain::{
    ConfigResult, DerivedFieldBinding, FieldConfig, FieldId, KeyInput, NumberFormat, Selection,
};
use crate::engine::arithmetic::Calculator;
use crate::engine::derived::DerivedEvaluator;
use crate::engine::formatter::Formatter;
use crate::engine::keystroke::{is_paste_valid, KeystrokeValidator};
use crate::engine::registry::FieldContext;
use crate::engine::scheduler::{Rewrite, RewriteQueue};
use crate::interfaces::{EventHandler, FieldEvent, FieldHost};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Entry point for every field event the host forwards.
///
/// Key-downs are decided synchronously; corrective edits are queued and run
/// by [`run_deferred`](Self::run_deferred) once the host has committed the
/// native action. Fields without a limit descriptor are unmanaged: every key
/// passes and focus/blur leave them alone, though derived values written to
/// them are still settled.
pub struct FieldController {
    /// Registry and active number format
    context: Arc<FieldContext>,

    /// Derived-field bindings
    evaluator: DerivedEvaluator,

    /// Rewrites waiting for the native action to commit
    rewrites: RewriteQueue,

    /// Text captured when an IME composition started
    compositions: HashMap<FieldId, String>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl FieldController {
    /// Create a controller with an empty registry
    pub fn new(format: NumberFormat, event_handler: Arc<dyn EventHandler>) -> Self {
        Self::with_context(Arc::new(FieldContext::new(format)), event_handler)
    }

    /// Create a controller over an existing context
    pub fn with_context(context: Arc<FieldContext>, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            context,
            evaluator: DerivedEvaluator::new(),
            rewrites: RewriteQueue::new(),
            compositions: HashMap::new(),
            event_handler,
        }
    }

    #[inline]
    pub fn context(&self) -> &Arc<FieldContext> {
        &self.context
    }

    /// Calculator for the active number format
    pub fn calculator(&self) -> Calculator {
        self.context.calculator()
    }

    pub fn formatter(&self) -> Formatter {
        self.context.formatter()
    }

    pub fn bindings(&self) -> &[DerivedFieldBinding] {
        self.evaluator.bindings()
    }

    pub fn pending_rewrites(&self) -> &RewriteQueue {
        &self.rewrites
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a field. A derived descriptor is bound against the host
    /// immediately; nothing is registered if binding fails.
    ///
    /// # Errors
    /// Any [`ConfigError`](crate::domain::ConfigError) of the derived
    /// descriptor.
    pub fn register_field(
        &mut self,
        id: Option<FieldId>,
        config: FieldConfig,
        host: &mut dyn FieldHost,
    ) -> ConfigResult<FieldId> {
        config.validate()?;
        let id = id.unwrap_or_else(FieldId::generate);

        if let Some(descriptor) = &config.derived {
            let binding = DerivedFieldBinding::new(id.clone(), descriptor)?;
            self.evaluator.register(binding, &*host)?;
        }

        if config.is_managed() {
            host.set_alignment(&id, config.horizontal_align);
        }
        Ok(self.context.registry().register(Some(id), config))
    }

    /// Register a field that appeared after initialization and settle it.
    pub fn on_field_inserted(
        &mut self,
        id: Option<FieldId>,
        config: FieldConfig,
        host: &mut dyn FieldHost,
    ) -> ConfigResult<FieldId> {
        let id = self.register_field(id, config, host)?;
        if let Some(event) = self.refresh_field(&id, host) {
            self.event_handler.on_event(event);
        }
        Ok(id)
    }

    /// Settle every registered field that has not opted out.
    pub fn initialize(&mut self, host: &mut dyn FieldHost) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        for id in self.context.registry().field_ids() {
            if let Some(event) = self.refresh_field(&id, host) {
                events.push(event);
            }
        }

        self.event_handler.on_events(events.clone());
        events
    }

    fn refresh_field(&self, id: &FieldId, host: &mut dyn FieldHost) -> Option<FieldEvent> {
        let config = self.context.registry().config(id)?;
        if !config.is_managed() || config.disable_init_refresh {
            return None;
        }
        self.settle_field(id, &config, host)
    }

    // ========================================================================
    // Key Handling
    // ========================================================================

    /// Decide a key-down. Returns whether the host should perform the key's
    /// native action.
    ///
    /// Keys inside a composition span pass unvalidated; the span is undone
    /// when it ends.
    pub fn on_key_down(&mut self, field: &FieldId, input: KeyInput, host: &dyn FieldHost) -> bool {
        let Some(config) = self.managed_config(field) else {
            return true;
        };
        if self.compositions.contains_key(field) {
            return true;
        }
        let Some(state) = host.edit_state(field) else {
            return true;
        };

        let spec = self.context.registry().limit_spec(field);
        let separators = self.context.separators();
        let decision = KeystrokeValidator::new(&spec, &separators)
            .with_smart_minus(config.smart_minus())
            .validate(&state, input);

        if let Some(rewrite) = decision.rewrite {
            self.rewrites.schedule(field.clone(), rewrite);
        }

        if !decision.accept {
            tracing::trace!(field = %field, key = ?input.key, text = %state.text, "key rejected");
            self.event_handler.on_event(FieldEvent::KeyRejected {
                field: field.clone(),
                key: input.key,
                timestamp: Utc::now(),
            });
        }
        decision.accept
    }

    /// Dragging selected text out of a managed field is not allowed.
    pub fn on_drag_start(&self, field: &FieldId, host: &dyn FieldHost) -> bool {
        if self.managed_config(field).is_none() {
            return true;
        }
        host.selection(field).is_empty()
    }

    /// Run every queued rewrite in scheduling order.
    pub fn run_deferred(&mut self, host: &mut dyn FieldHost) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        while let Some((field, rewrite)) = self.rewrites.take() {
            if let Some(event) = self.apply(&field, rewrite, host) {
                events.push(event);
            }
        }

        self.event_handler.on_events(events.clone());
        events
    }

    fn apply(
        &self,
        field: &FieldId,
        rewrite: Rewrite,
        host: &mut dyn FieldHost,
    ) -> Option<FieldEvent> {
        match rewrite {
            Rewrite::Replace { text, cursor } => {
                host.set_value(field, &text);
                host.set_selection(field, Selection::caret(cursor));
                tracing::debug!(field = %field, value = %text, cursor, "rewrite applied");
                Some(FieldEvent::RewriteApplied {
                    field: field.clone(),
                    value: text,
                    timestamp: Utc::now(),
                })
            },
            Rewrite::VerifyPaste { original } => {
                let pasted = host.value(field)?;
                let spec = self.context.registry().limit_spec(field);
                if is_paste_valid(&pasted, &spec, &self.context.separators()) {
                    return None;
                }

                host.set_value(field, &original.text);
                host.set_selection(field, original.selection);
                tracing::debug!(field = %field, rejected = %pasted, "paste rolled back");
                Some(FieldEvent::PasteRolledBack {
                    field: field.clone(),
                    rejected: pasted,
                    timestamp: Utc::now(),
                })
            },
            Rewrite::Unsettle => {
                let config = self.managed_config(field)?;
                let state = host.edit_state(field)?;
                let focused = self.formatter().focus(&state, &config);
                if focused == state {
                    return None;
                }

                host.set_value(field, &focused.text);
                host.set_selection(field, focused.selection);
                Some(FieldEvent::RewriteApplied {
                    field: field.clone(),
                    value: focused.text,
                    timestamp: Utc::now(),
                })
            },
        }
    }

    // ========================================================================
    // Focus, Blur, Change
    // ========================================================================

    /// Clear the negative marker and queue the switch to the editing form.
    pub fn on_focus(&mut self, field: &FieldId, host: &mut dyn FieldHost) {
        let Some(config) = self.managed_config(field) else {
            return;
        };
        if config.highlight_minus.is_enabled() {
            host.set_negative_marker(field, None);
        }
        self.rewrites.schedule(field.clone(), Rewrite::Unsettle);
    }

    /// Settle the field for display.
    pub fn on_blur(&mut self, field: &FieldId, host: &mut dyn FieldHost) -> Option<FieldEvent> {
        let config = self.managed_config(field)?;
        let event = self.settle_field(field, &config, host)?;
        self.event_handler.on_event(event.clone());
        Some(event)
    }

    /// Recompute the derived fields downstream of a changed field.
    pub fn on_change(&mut self, field: &FieldId, host: &mut dyn FieldHost) -> Vec<FieldEvent> {
        self.on_changes(std::slice::from_ref(field), host)
    }

    /// Recompute once for a batch of changed fields.
    pub fn on_changes(&mut self, fields: &[FieldId], host: &mut dyn FieldHost) -> Vec<FieldEvent> {
        let events: Vec<FieldEvent> = self
            .evaluator
            .propagate(fields, host, &self.context)
            .into_iter()
            .map(|update| FieldEvent::DerivedRecomputed {
                field: update.target,
                operation: update.operation,
                value: update.value,
                timestamp: Utc::now(),
            })
            .collect();

        self.event_handler.on_events(events.clone());
        events
    }

    // ========================================================================
    // Composition
    // ========================================================================

    pub fn on_composition_start(&mut self, field: &FieldId, host: &dyn FieldHost) {
        if self.managed_config(field).is_none() {
            return;
        }
        if let Some(text) = host.value(field) {
            self.compositions.insert(field.clone(), text);
        }
    }

    /// Restore the text captured at composition start; composed input never
    /// reaches a numeric field.
    pub fn on_composition_end(&mut self, field: &FieldId, host: &mut dyn FieldHost) {
        if let Some(text) = self.compositions.remove(field) {
            self.rewrites.cancel(field);
            host.set_value(field, &text);
        }
    }

    // ========================================================================
    // Number Format
    // ========================================================================

    /// Switch the separator convention, translating every registered field's
    /// text and re-settling the fields that take part in initialization.
    /// Text that carried grouping keeps it in the new convention.
    pub fn set_number_format(
        &mut self,
        format: NumberFormat,
        host: &mut dyn FieldHost,
    ) -> Vec<FieldEvent> {
        let previous = self.context.set_format(format);
        let from = Formatter::new(previous.separators());
        let to = self.formatter();

        let mut events = Vec::new();
        for id in self.context.registry().field_ids() {
            let Some(text) = host.value(&id) else {
                continue;
            };
            let mut translated = from.translate(&text, &to);
            if text.chars().any(|c| from.separators().is_grouping(c)) {
                translated = to.dress_number(&translated);
            }
            if translated != text {
                host.set_value(&id, &translated);
            }
            if let Some(event) = self.refresh_field(&id, host) {
                events.push(event);
            }
        }

        tracing::debug!(%previous, %format, "number format switched");
        events.push(FieldEvent::FormatChanged {
            format,
            timestamp: Utc::now(),
        });
        self.event_handler.on_events(events.clone());
        events
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn managed_config(&self, field: &FieldId) -> Option<FieldConfig> {
        self.context
            .registry()
            .config(field)
            .filter(FieldConfig::is_managed)
    }

    fn settle_field(
        &self,
        id: &FieldId,
        config: &FieldConfig,
        host: &mut dyn FieldHost,
    ) -> Option<FieldEvent> {
        let text = host.value(id)?;
        let spec = self.context.registry().limit_spec(id);
        let settled = self.formatter().settle(&text, &spec, config);

        if settled.text != text {
            host.set_value(id, &settled.text);
        }
        if config.highlight_minus.is_enabled() {
            host.set_negative_marker(id, settled.marker.as_deref());
        }

        Some(FieldEvent::Settled {
            field: id.clone(),
            value: settled.text,
            timestamp: Utc::now(),
        })
    }
}

impl std::fmt::Debug for FieldController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldController")
            .field("context", &self.context)
            .field("evaluator", &self.evaluator)
            .field("rewrites", &self.rewrites)
            .finish_non_exhaustive()
    }
}
