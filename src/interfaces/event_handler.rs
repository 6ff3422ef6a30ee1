// ============================================================================
// Event Handler Interface
// Defines the contract for publishing order and trade events
// ============================================================================

use crate::domain::{Order, OrderId, Trade, TimeInForce};
use crate::numeric::{Price, Quantity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State changes derived from book outcomes.
///
/// Events carry no timestamps of their own; the publisher stamps them with
/// the logical time of the command that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order accepted and sequenced
    OrderAccepted { order_id: OrderId, sequence: u64 },

    /// Order matched, trade generated
    OrderMatched { trade: Trade },

    /// Order partially filled
    OrderPartiallyFilled {
        order_id: OrderId,
        filled: Quantity,
        remaining: Quantity,
    },

    /// Order fully filled
    OrderFilled {
        order_id: OrderId,
        total_filled: Quantity,
    },

    /// Remainder rested in the book
    OrderAddedToBook {
        order_id: OrderId,
        price: Price,
        remaining: Quantity,
    },

    /// Resting order amended in place
    OrderAmended {
        order_id: OrderId,
        size: Quantity,
        remaining: Quantity,
        time_in_force: TimeInForce,
    },

    /// Order cancelled by its owner, or IOC/FOK remainder killed
    OrderCancelled {
        order_id: OrderId,
        remaining: Quantity,
    },

    /// Good-till-time order reached its expiry
    OrderExpired {
        order_id: OrderId,
        remaining: Quantity,
    },
}

impl OrderEvent {
    /// `OrderFilled` or `OrderPartiallyFilled` depending on what is left.
    pub fn fill_progress(order: &Order) -> Self {
        if order.remaining.is_zero() {
            OrderEvent::OrderFilled {
                order_id: order.id,
                total_filled: order.filled(),
            }
        } else {
            OrderEvent::OrderPartiallyFilled {
                order_id: order.id,
                filled: order.filled(),
                remaining: order.remaining,
            }
        }
    }

    pub fn cancelled(order: &Order) -> Self {
        OrderEvent::OrderCancelled {
            order_id: order.id,
            remaining: order.remaining,
        }
    }

    pub fn expired(order: &Order) -> Self {
        OrderEvent::OrderExpired {
            order_id: order.id,
            remaining: order.remaining,
        }
    }
}

/// Event publication collaborator.
///
/// The book never calls this itself; the command-processing layer forwards
/// each outcome after the book returns.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!(?event, "order book event");
    }
}
