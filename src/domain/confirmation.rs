// ============================================================================
// Confirmation
// Outcome of a single submit or amend command
// ============================================================================

use smallvec::SmallVec;

use super::order::Order;
use super::trade::Trade;
use crate::interfaces::OrderEvent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which command produced a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfirmedAction {
    Submitted,
    Amended,
}

/// The result bundle handed back to the caller, to be forwarded verbatim
/// to settlement and event publication.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Confirmation {
    pub action: ConfirmedAction,

    /// The order in its final state after the command
    pub order: Order,

    /// Trades in the order they were produced
    pub trades: SmallVec<[Trade; 4]>,

    /// Resting orders whose remaining size changed, in match order
    pub passive_orders: Vec<Order>,
}

impl Confirmation {
    pub(crate) fn submitted(order: Order) -> Self {
        Self {
            action: ConfirmedAction::Submitted,
            order,
            trades: SmallVec::new(),
            passive_orders: Vec::new(),
        }
    }

    pub(crate) fn amended(order: Order) -> Self {
        Self {
            action: ConfirmedAction::Amended,
            order,
            trades: SmallVec::new(),
            passive_orders: Vec::new(),
        }
    }

    /// Whether the order is resting in the book after the command.
    pub fn is_resting(&self) -> bool {
        self.order.status.is_live()
    }

    /// Total size traded by this command.
    pub fn traded_size(&self) -> u64 {
        self.trades.iter().map(|trade| trade.size.value()).sum()
    }

    /// Derive the ordered event stream for downstream publication.
    pub fn events(&self) -> Vec<OrderEvent> {
        let order = &self.order;

        if self.action == ConfirmedAction::Amended {
            return vec![OrderEvent::OrderAmended {
                order_id: order.id,
                size: order.size,
                remaining: order.remaining,
                time_in_force: order.time_in_force,
            }];
        }

        let mut events = Vec::with_capacity(2 + self.trades.len() + self.passive_orders.len() * 2);
        events.push(OrderEvent::OrderAccepted {
            order_id: order.id,
            sequence: order.sequence,
        });

        for trade in &self.trades {
            events.push(OrderEvent::OrderMatched {
                trade: trade.clone(),
            });
        }

        for passive in &self.passive_orders {
            events.push(OrderEvent::fill_progress(passive));
        }

        if !order.filled().is_zero() {
            events.push(OrderEvent::fill_progress(order));
        }

        if self.is_resting() {
            if let Some(price) = order.price {
                events.push(OrderEvent::OrderAddedToBook {
                    order_id: order.id,
                    price,
                    remaining: order.remaining,
                });
            }
        } else if !order.remaining.is_zero() {
            events.push(OrderEvent::OrderCancelled {
                order_id: order.id,
                remaining: order.remaining,
            });
        }

        events
    }
}
