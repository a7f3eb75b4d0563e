// ============================================================================
// Controller Factory
// Creates field controllers with their fields registered and settled
// ============================================================================

use crate::domain::{ConfigResult, FieldConfig, FieldId, NumberFormat};
use crate::engine::FieldController;
use crate::interfaces::{EventHandler, FieldHost, NoOpEventHandler};
use std::sync::Arc;

/// Builder for a [`FieldController`] with its fields declared up front.
///
/// Fields are registered in declaration order when [`build`](Self::build)
/// runs, so derived fields may be declared before or after their sources
/// as long as the sources exist in the host.
///
/// # Example
/// ```
/// use decimal_field::prelude::*;
/// use decimal_field::engine::FieldControllerBuilder;
///
/// let mut host = MemoryHost::new();
/// host.insert("price", "1500");
///
/// let controller = FieldControllerBuilder::new()
///     .number_format(NumberFormat::En)
///     .field("price", FieldConfig::new("7.2"))
///     .build(&mut host)
///     .unwrap();
///
/// assert_eq!(host.value(&FieldId::new("price")).unwrap(), "1,500.00");
/// assert_eq!(controller.context().registry().len(), 1);
/// ```
pub struct FieldControllerBuilder {
    format: NumberFormat,
    event_handler: Arc<dyn EventHandler>,
    fields: Vec<(Option<FieldId>, FieldConfig)>,
    initialize: bool,
}

impl Default for FieldControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldControllerBuilder {
    pub fn new() -> Self {
        Self {
            format: NumberFormat::default(),
            event_handler: Arc::new(NoOpEventHandler),
            fields: Vec::new(),
            initialize: true,
        }
    }

    // ========================================================================
    // Format Configuration
    // ========================================================================

    /// Use an explicit separator convention
    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Pick the convention from a language tag such as `"de"` or `"en-US"`
    pub fn language(mut self, tag: &str) -> Self {
        self.format = NumberFormat::from_language(tag);
        self
    }

    // ========================================================================
    // Fields and Events
    // ========================================================================

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Declare a field under a known identity
    pub fn field(mut self, id: impl Into<FieldId>, config: FieldConfig) -> Self {
        self.fields.push((Some(id.into()), config));
        self
    }

    /// Declare a field whose identity is generated
    pub fn anonymous_field(mut self, config: FieldConfig) -> Self {
        self.fields.push((None, config));
        self
    }

    /// Skip the initial settle sweep
    pub fn without_initialization(mut self) -> Self {
        self.initialize = false;
        self
    }

    /// Register every declared field and run the initial sweep.
    ///
    /// # Errors
    /// The first [`ConfigError`](crate::domain::ConfigError) raised while
    /// registering.
    pub fn build(self, host: &mut dyn FieldHost) -> ConfigResult<FieldController> {
        let mut controller = FieldController::new(self.format, self.event_handler);
        for (id, config) in self.fields {
            controller.register_field(id, config, host)?;
        }

        if self.initialize {
            controller.initialize(host);
        }
        Ok(controller)
    }
}
