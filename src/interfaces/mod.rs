// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod field_host;

pub use event_handler::{EventHandler, FieldEvent, LoggingEventHandler, NoOpEventHandler};
pub use field_host::{FieldHost, MemoryHost, ValueLookup};
