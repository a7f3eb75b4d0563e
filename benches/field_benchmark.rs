// ============================================================================
// Decimal Field Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Arithmetic - Calculator sums, products and quotients over field text
// 2. Keystrokes - Per-key validation against a digit budget
// 3. Formatting - Settling values for display
// 4. Propagation - Derived-field recomputation across many sources
// ============================================================================

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use decimal_field::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

// ============================================================================
// Arithmetic Benchmarks
// ============================================================================

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    let calc = Calculator::for_format(NumberFormat::En);

    for count in [10, 100, 1000].iter() {
        let values: Vec<String> = (0..*count)
            .map(|i| format!("{},{:03}.{:02}", i % 1000, i % 997, i % 100))
            .collect();

        group.bench_with_input(BenchmarkId::new("sum", count), &values, |b, values| {
            b.iter(|| black_box(calc.sum(values)));
        });

        group.bench_with_input(
            BenchmarkId::new("product_notice_null", count),
            &values[..(*count).min(8)],
            |b, values| {
                b.iter(|| black_box(calc.product_notice_null(values)));
            },
        );
    }

    group.bench_function("quotient", |b| {
        b.iter(|| black_box(calc.quotient(black_box("1,234,567.89"), black_box("3"))));
    });

    group.finish();
}

// ============================================================================
// Keystroke Benchmarks
// ============================================================================

fn benchmark_keystrokes(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystrokes");
    let spec = LimitSpec::new(9, Some(4), true);
    let separators = NumberFormat::En.separators();
    let validator = KeystrokeValidator::new(&spec, &separators);

    let states = [
        ("digit_integral", EditState::with_caret("-12345", 3), KeyInput::char('7')),
        ("digit_fraction", EditState::with_caret("123.45", 6), KeyInput::char('7')),
        ("separator", EditState::with_caret("12345", 2), KeyInput::char('.')),
        ("smart_minus", EditState::with_caret("12345.6", 4), KeyInput::char('-')),
        (
            "selection_delete",
            EditState::new("1234.5678", Selection::new(2, 6)),
            KeyInput::plain(Key::Backspace),
        ),
    ];

    for (name, state, input) in states.iter() {
        group.bench_with_input(BenchmarkId::new("validate", name), state, |b, state| {
            b.iter(|| black_box(validator.validate(state, *input)));
        });
    }

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn benchmark_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    let formatter = Formatter::new(NumberFormat::En.separators());
    let spec = LimitSpec::new(12, Some(2), true);
    let config = FieldConfig::new("-12.2");

    for value in ["7", "-0001234567.5", "987654321098.1"].iter() {
        group.bench_with_input(BenchmarkId::new("settle", value), value, |b, value| {
            b.iter(|| black_box(formatter.settle(value, &spec, &config)));
        });
    }

    group.finish();
}

// ============================================================================
// Propagation Benchmarks
// ============================================================================

fn benchmark_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");

    for sources in [10, 100].iter() {
        let mut host = MemoryHost::new();
        for i in 0..*sources {
            host.insert_with(format!("src{}", i).as_str(), "1,234.56", &["line"], None);
        }
        host.insert("total", "");

        let mut controller = FieldControllerBuilder::new()
            .number_format(NumberFormat::En)
            .with_event_handler(Arc::new(NoOpEventHandler))
            .field(
                "total",
                FieldConfig::new("12.2")
                    .with_derived(DerivedDescriptor::new(Operation::Sum, ".line")),
            )
            .build(&mut host)
            .unwrap();

        let changed = FieldId::new("src0");
        group.bench_function(BenchmarkId::new("sum_on_change", sources), |b| {
            b.iter(|| black_box(controller.on_change(&changed, &mut host)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_arithmetic,
    benchmark_keystrokes,
    benchmark_formatting,
    benchmark_propagation
);
criterion_main!(benches);
