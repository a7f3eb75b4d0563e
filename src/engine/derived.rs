// ============================================================================
// Derived-Field Evaluator
// Recomputes sum/product/difference/quotient/percent fields from sources
// ============================================================================

use crate::domain::{ConfigError, ConfigResult, DerivedFieldBinding, FieldId, LimitSpec, Operation};
use crate::engine::arithmetic::{BlendTerm, Calculator, Operand};
use crate::engine::formatter::Settled;
use crate::engine::registry::FieldContext;
use crate::interfaces::FieldHost;
use crate::numeric::{RoundingMode, ScaledDecimal};

/// A derived value written during propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedUpdate {
    pub target: FieldId,
    pub operation: Operation,
    pub value: String,
}

/// Holds every derived binding and propagates source changes through them.
#[derive(Debug, Default)]
pub struct DerivedEvaluator {
    bindings: Vec<DerivedFieldBinding>,
}

impl DerivedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, replacing any earlier binding of the same target.
    ///
    /// # Errors
    /// `AmbiguousPrimary` when a difference, quotient or percent binding's
    /// first selector does not match exactly one field.
    pub fn register(
        &mut self,
        binding: DerivedFieldBinding,
        host: &dyn FieldHost,
    ) -> ConfigResult<()> {
        if binding.operation.is_binary() {
            let matched = host.resolve(binding.primary()).len();
            if matched != 1 {
                return Err(ConfigError::AmbiguousPrimary {
                    operation: binding.operation,
                    selector: binding.primary().to_string(),
                    received: matched,
                });
            }
        }

        tracing::debug!(
            target_field = %binding.target,
            operation = %binding.operation,
            sources = ?binding.sources,
            "derived binding registered"
        );
        self.bindings.retain(|b| b.target != binding.target);
        self.bindings.push(binding);
        Ok(())
    }

    pub fn bindings(&self) -> &[DerivedFieldBinding] {
        &self.bindings
    }

    pub fn binding(&self, target: &FieldId) -> Option<&DerivedFieldBinding> {
        self.bindings.iter().find(|b| &b.target == target)
    }

    /// Bindings with at least one source among `changed`.
    pub fn affected_by(
        &self,
        changed: &[FieldId],
        host: &dyn FieldHost,
    ) -> Vec<&DerivedFieldBinding> {
        self.bindings
            .iter()
            .filter(|binding| {
                binding
                    .sources
                    .iter()
                    .flat_map(|selector| host.resolve(selector))
                    .any(|source| changed.contains(&source))
            })
            .collect()
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Raw result of a binding's operation over the sources' current text.
    pub fn compute(
        &self,
        binding: &DerivedFieldBinding,
        host: &dyn FieldHost,
        calc: &Calculator,
    ) -> ScaledDecimal {
        match binding.operation {
            Operation::Sum => calc.sum(&source_values(host, binding.primary())),
            Operation::Product => {
                calc.product_notice_null(&source_values(host, binding.primary()))
            },
            Operation::Difference => {
                let minuend = primary_operand(binding, host, calc);
                let subtrahend = calc.sum(&secondary_values(binding, host));
                calc.blend_sum([
                    BlendTerm::Operand(minuend),
                    BlendTerm::Polarity(false),
                    BlendTerm::operand(subtrahend),
                ])
            },
            Operation::Quotient => {
                let dividend = primary_operand(binding, host, calc);
                let divisor = calc.product_notice_null(&secondary_values(binding, host));
                calc.quotient(dividend, divisor)
            },
            Operation::Percent => {
                let dividend = primary_operand(binding, host, calc);
                let scaled =
                    calc.product_notice_null([dividend, Operand::Number(ScaledDecimal::HUNDRED)]);
                let divisor = calc.product_notice_null(&secondary_values(binding, host));
                calc.quotient(scaled, divisor)
            },
        }
    }

    /// Compute, cap to the target's budget and settle a binding's value.
    pub fn evaluate(
        &self,
        binding: &DerivedFieldBinding,
        host: &dyn FieldHost,
        context: &FieldContext,
    ) -> Settled {
        let raw = self.compute(binding, host, &context.calculator());
        let spec = context.registry().limit_spec(&binding.target);
        let capped = cap_to_budget(raw, &spec, binding.rounding);

        let config = context.registry().config(&binding.target).unwrap_or_default();
        let formatter = context.formatter();
        formatter.settle(&formatter.localize(&capped), &spec, &config)
    }

    /// Recompute every binding downstream of `changed`, writing results to
    /// the host.
    ///
    /// Each round evaluates the bindings whose sources changed in the
    /// previous round, once each. A chain longer than the number of bindings
    /// can only come from a cycle, which is cut there.
    pub fn propagate(
        &self,
        changed: &[FieldId],
        host: &mut dyn FieldHost,
        context: &FieldContext,
    ) -> Vec<DerivedUpdate> {
        let mut updates = Vec::new();
        let mut frontier: Vec<FieldId> = changed.to_vec();
        let mut rounds = 0;

        while !frontier.is_empty() {
            if rounds > self.bindings.len() {
                tracing::warn!(
                    fields = ?frontier,
                    "derived field cycle detected, propagation stopped"
                );
                break;
            }
            rounds += 1;

            let mut next = Vec::new();
            for binding in self.affected_by(&frontier, &*host) {
                let Settled { text: value, marker } = self.evaluate(binding, &*host, context);
                let highlight = context
                    .registry()
                    .config(&binding.target)
                    .is_some_and(|config| config.highlight_minus.is_enabled());

                host.set_value(&binding.target, &value);
                if highlight {
                    host.set_negative_marker(&binding.target, marker.as_deref());
                }
                tracing::debug!(
                    target_field = %binding.target,
                    operation = %binding.operation,
                    %value,
                    "derived field recomputed"
                );

                updates.push(DerivedUpdate {
                    target: binding.target.clone(),
                    operation: binding.operation,
                    value,
                });
                next.push(binding.target.clone());
            }
            frontier = next;
        }

        updates
    }
}

/// Round at the fractional budget (none means integer) and drop the most
/// significant integral digits beyond the integral budget.
pub fn cap_to_budget(value: ScaledDecimal, spec: &LimitSpec, mode: RoundingMode) -> String {
    let places = spec.fractional.unwrap_or(0);
    let rounded = value.round_to(places, mode).unwrap_or(value).to_string();

    let (sign, abs) = match rounded.strip_prefix('-') {
        Some(abs) => ("-", abs),
        None => ("", rounded.as_str()),
    };
    let integral_len = abs.find('.').unwrap_or(abs.len());
    let excess = integral_len.saturating_sub(spec.integral_budget());

    format!("{}{}", sign, &abs[excess..])
}

fn source_values(host: &dyn FieldHost, selector: &str) -> Vec<String> {
    host.resolve(selector)
        .iter()
        .filter_map(|field| host.value(field))
        .collect()
}

fn secondary_values(binding: &DerivedFieldBinding, host: &dyn FieldHost) -> Vec<String> {
    binding
        .secondary()
        .map(|selector| source_values(host, selector))
        .unwrap_or_default()
}

/// Minuend or dividend: a literal, or the one field the selector names.
fn primary_operand(
    binding: &DerivedFieldBinding,
    host: &dyn FieldHost,
    calc: &Calculator,
) -> Operand<'static> {
    match calc.resolve(binding.primary(), host).value() {
        Some(value) => Operand::Number(value),
        None => Operand::Text(""),
    }
}
