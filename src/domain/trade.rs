// ============================================================================
// Trade Domain Model
// ============================================================================

use crate::numeric::{Price, Quantity};

use super::order::{LogicalTime, MarketId, OrderId, PartyId, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable record of one crossing between a taker and a resting maker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Per-book trade sequence, strictly increasing
    pub sequence: u64,

    pub market_id: MarketId,

    pub buyer_order_id: OrderId,
    pub seller_order_id: OrderId,
    pub buyer_party_id: PartyId,
    pub seller_party_id: PartyId,

    /// Execution price (always the maker's resting price)
    pub price: Price,

    pub size: Quantity,

    /// Side of the incoming order that caused the trade
    pub aggressor: Side,

    /// Logical time of the command that produced the trade
    pub timestamp: LogicalTime,
}

impl Trade {
    pub fn taker_order_id(&self) -> OrderId {
        match self.aggressor {
            Side::Buy => self.buyer_order_id,
            Side::Sell => self.seller_order_id,
        }
    }

    pub fn maker_order_id(&self) -> OrderId {
        match self.aggressor {
            Side::Buy => self.seller_order_id,
            Side::Sell => self.buyer_order_id,
        }
    }

    /// Notional value of the trade (price * size) in tick-lots
    pub fn notional_value(&self) -> u128 {
        self.price.notional(self.size)
    }
}
