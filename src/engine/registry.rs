// ============================================================================
// Field Registry
// Field identity -> configuration and resolved digit budget
// ============================================================================

use crate::domain::{FieldConfig, FieldId, LimitSpec, NumberFormat, Separators};
use crate::engine::arithmetic::Calculator;
use crate::engine::formatter::Formatter;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Registered fields and their resolved [`LimitSpec`]s.
///
/// Specs are resolved eagerly on registration and lazily again after an
/// invalidation; resolution is deterministic, so recomputing a missing entry
/// is always safe.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    /// Registration order, used by initialization sweeps
    order: RwLock<Vec<FieldId>>,

    configs: RwLock<HashMap<FieldId, FieldConfig>>,

    /// Resolved budget cache
    specs: RwLock<HashMap<FieldId, LimitSpec>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, generating an identity when none is given.
    ///
    /// Registering an existing identity replaces its configuration.
    pub fn register(&self, id: Option<FieldId>, config: FieldConfig) -> FieldId {
        let id = id.unwrap_or_else(FieldId::generate);
        let spec = config.limit_spec();

        if self.configs.write().insert(id.clone(), config).is_none() {
            self.order.write().push(id.clone());
        }
        self.specs.write().insert(id.clone(), spec);

        tracing::trace!(field = %id, ?spec, "field registered");
        id
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.configs.read().contains_key(id)
    }

    pub fn config(&self, id: &FieldId) -> Option<FieldConfig> {
        self.configs.read().get(id).cloned()
    }

    /// Digit budget of a field; unknown fields get the default budget.
    pub fn limit_spec(&self, id: &FieldId) -> LimitSpec {
        if let Some(spec) = self.specs.read().get(id) {
            return *spec;
        }

        let Some(spec) = self.configs.read().get(id).map(FieldConfig::limit_spec) else {
            return LimitSpec::DEFAULT;
        };
        self.specs.write().insert(id.clone(), spec);
        spec
    }

    /// Drop every cached budget so the next access re-resolves it.
    pub fn invalidate(&self) {
        self.specs.write().clear();
    }

    /// Re-resolve every registered budget.
    pub fn refresh_all(&self) {
        let configs = self.configs.read();
        let mut specs = self.specs.write();
        specs.clear();
        for (id, config) in configs.iter() {
            specs.insert(id.clone(), config.limit_spec());
        }
    }

    /// Registered identities in registration order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.order.read().clone()
    }

    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.read().is_empty()
    }
}

// ============================================================================
// Field Context
// ============================================================================

/// Shared state every component reads: the registry and the active number
/// format. Replaces ambient globals; switch formats through
/// [`FieldContext::set_format`] only.
#[derive(Debug, Default)]
pub struct FieldContext {
    registry: FieldRegistry,
    format: RwLock<NumberFormat>,
}

impl FieldContext {
    pub fn new(format: NumberFormat) -> Self {
        Self {
            registry: FieldRegistry::new(),
            format: RwLock::new(format),
        }
    }

    /// Context using the convention of a language tag.
    pub fn for_language(tag: &str) -> Self {
        Self::new(NumberFormat::from_language(tag))
    }

    #[inline]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    #[inline]
    pub fn format(&self) -> NumberFormat {
        *self.format.read()
    }

    #[inline]
    pub fn separators(&self) -> Separators {
        self.format().separators()
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new(self.separators())
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.separators())
    }

    /// Switch the active format and re-resolve every budget.
    ///
    /// Returns the previous format.
    pub fn set_format(&self, format: NumberFormat) -> NumberFormat {
        let previous = std::mem::replace(&mut *self.format.write(), format);
        self.registry.refresh_all();
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = FieldRegistry::new();
        let id = registry.register(Some(FieldId::new("price")), FieldConfig::new("-5.2"));

        assert_eq!(id, FieldId::new("price"));
        assert!(registry.contains(&id));
        assert_eq!(registry.limit_spec(&id), LimitSpec::new(5, Some(2), true));
    }

    #[test]
    fn test_generated_identity() {
        let registry = FieldRegistry::new();
        let id = registry.register(None, FieldConfig::new("3"));
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_field_gets_default() {
        let registry = FieldRegistry::new();
        assert_eq!(
            registry.limit_spec(&FieldId::new("missing")),
            LimitSpec::DEFAULT
        );
    }

    #[test]
    fn test_lazy_resolution_after_invalidate() {
        let registry = FieldRegistry::new();
        let id = registry.register(Some(FieldId::new("q")), FieldConfig::new("4.1"));
        registry.invalidate();
        assert_eq!(registry.limit_spec(&id), LimitSpec::new(4, Some(1), false));
        // second access hits the cache
        assert_eq!(registry.limit_spec(&id), LimitSpec::new(4, Some(1), false));
    }

    #[test]
    fn test_reregister_keeps_order() {
        let registry = FieldRegistry::new();
        registry.register(Some(FieldId::new("a")), FieldConfig::new("1"));
        registry.register(Some(FieldId::new("b")), FieldConfig::new("2"));
        registry.register(Some(FieldId::new("a")), FieldConfig::new("3"));

        assert_eq!(
            registry.field_ids(),
            vec![FieldId::new("a"), FieldId::new("b")]
        );
        assert_eq!(registry.limit_spec(&FieldId::new("a")).integral, 3);
    }

    #[test]
    fn test_context_format_switch() {
        let context = FieldContext::new(NumberFormat::En);
        context
            .registry()
            .register(Some(FieldId::new("x")), FieldConfig::new("2.2"));

        let previous = context.set_format(NumberFormat::Es);
        assert_eq!(previous, NumberFormat::En);
        assert_eq!(context.separators().decimal, ',');
        assert_eq!(
            context.registry().limit_spec(&FieldId::new("x")),
            LimitSpec::new(2, Some(2), false)
        );
    }

    #[test]
    fn test_context_for_language() {
        assert_eq!(FieldContext::for_language("de").format(), NumberFormat::Es);
    }
}
