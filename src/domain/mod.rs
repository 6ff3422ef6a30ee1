// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod confirmation;
pub mod order;
pub mod snapshot;
pub mod trade;

pub use config::{ConfigError, OrderBookConfig};
pub use confirmation::{Confirmation, ConfirmedAction};
pub use order::{
    LogicalTime, MarketId, Order, OrderAmendment, OrderId, OrderStateError, OrderType, PartyId,
    Side, TimeInForce,
};
pub use snapshot::OrderBookSnapshot;
pub use trade::Trade;

// Re-export state machine
pub use order::state::{OrderStateTransition, OrderStatus};
