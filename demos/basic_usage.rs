// ============================================================================
// Basic Usage Example
// ============================================================================

use decimal_field::prelude::*;
use std::sync::Arc;

fn type_text(controller: &mut FieldController, host: &mut MemoryHost, id: &FieldId, text: &str) {
    for c in text.chars() {
        if controller.on_key_down(id, KeyInput::char(c), &*host) {
            host.native_insert(id, &c.to_string());
        }
        controller.run_deferred(host);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Decimal Field Example ===\n");

    let mut host = MemoryHost::new();
    host.insert_with("qty", "", &["line"], None)
        .insert_with("price", "", &["line"], None)
        .insert("total", "")
        .insert("discount", "");

    let mut controller = FieldControllerBuilder::new()
        .number_format(NumberFormat::En)
        .with_event_handler(Arc::new(LoggingEventHandler))
        .field("qty", FieldConfig::new("4"))
        .field("price", FieldConfig::new("7.2"))
        .field("discount", FieldConfig::new("-5.2").with_highlight_minus(Some("red")))
        .field(
            "total",
            FieldConfig::new("10.2")
                .with_derived(DerivedDescriptor::new(Operation::Product, ".line")),
        )
        .build(&mut host)
        .expect("valid field configuration");

    let qty = FieldId::new("qty");
    let price = FieldId::new("price");
    let discount = FieldId::new("discount");
    let total = FieldId::new("total");

    // Budgets hold while typing
    println!("Typing into fields...");
    type_text(&mut controller, &mut host, &qty, "123456");
    type_text(&mut controller, &mut host, &price, "1999.999");
    println!("  qty   = {:?} (max 4 digits)", host.value(&qty).unwrap_or_default());
    println!("  price = {:?} (max 7.2)", host.value(&price).unwrap_or_default());

    // Settling on blur adds grouping and pads the fraction
    controller.on_blur(&price, &mut host);
    println!("  price after blur = {:?}", host.value(&price).unwrap_or_default());

    // Derived product follows its sources
    println!("\n=== Derived Total ===");
    let events = controller.on_changes(&[qty.clone(), price.clone()], &mut host);
    for event in &events {
        if let FieldEvent::DerivedRecomputed { field, value, .. } = event {
            println!("  {} = {}", field, value);
        }
    }

    // Smart minus toggles the sign wherever the caret is
    println!("\n=== Smart Minus ===");
    type_text(&mut controller, &mut host, &discount, "25.5-");
    controller.on_blur(&discount, &mut host);
    println!(
        "  discount = {:?} (marker: {:?})",
        host.value(&discount).unwrap_or_default(),
        host.marker(&discount)
    );

    // Over-budget paste is rolled back
    println!("\n=== Paste Rollback ===");
    host.set_value(&qty, "12");
    host.set_selection(&qty, Selection::caret(2));
    if controller.on_key_down(&qty, KeyInput::ctrl(Key::Char('v')), &host) {
        host.native_insert(&qty, "98765");
    }
    for event in controller.run_deferred(&mut host) {
        if let FieldEvent::PasteRolledBack { rejected, .. } = event {
            println!("  paste would have produced {:?}, rolled back", rejected);
        }
    }
    println!("  qty = {:?}", host.value(&qty).unwrap_or_default());

    // Switching conventions rewrites every managed field
    println!("\n=== Locale Switch ===");
    controller.set_number_format(NumberFormat::Es, &mut host);
    for id in [&qty, &price, &discount, &total] {
        println!("  {} = {}", id, host.value(id).unwrap_or_default());
    }
}
