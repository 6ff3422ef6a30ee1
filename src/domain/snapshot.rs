// ============================================================================
// Order Book Snapshot
// ============================================================================

use rust_decimal::Decimal;

use super::order::MarketId;
use crate::numeric::{Price, Quantity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable aggregated view of the top of one book
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub market_id: MarketId,
    /// Bid levels (price, volume), best first
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels (price, volume), best first
    pub asks: Vec<(Price, Quantity)>,
    /// Current spread in ticks (ask - bid)
    pub spread: Option<u64>,
    /// Mid price in ticks
    pub mid_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    pub fn with_depth(
        market_id: MarketId,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
    ) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => (
                Some(ask.value().saturating_sub(bid.value())),
                Some((Decimal::from(bid.value()) + Decimal::from(ask.value())) / Decimal::TWO),
            ),
            _ => (None, None),
        };

        Self {
            market_id,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_volume(&self) -> u64 {
        self.bids.iter().map(|(_, qty)| qty.value()).sum()
    }

    pub fn total_ask_volume(&self) -> u64 {
        self.asks.iter().map(|(_, qty)| qty.value()).sum()
    }
}
