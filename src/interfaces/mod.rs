// ============================================================================
// Interfaces Module
// Contains the event publication contract
// ============================================================================

mod event_handler;

pub use event_handler::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
