// ============================================================================
// Book Side
// ============================================================================

use std::collections::BTreeMap;

use super::arena::OrderHandle;
use super::price_level::PriceLevel;
use crate::domain::{Order, Side};
use crate::numeric::{NumericResult, Price, Quantity};

/// One side (bids or asks) of a market.
///
/// Levels are kept in a `BTreeMap` keyed by price so iteration order is a
/// property of the data structure. Bids are best-first in descending order,
/// asks in ascending order.
#[derive(Debug, Clone)]
pub(crate) struct BookSide {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Append an order to the tail of its price level, creating the level
    /// if needed.
    pub fn insert(
        &mut self,
        price: Price,
        handle: OrderHandle,
        remaining: Quantity,
    ) -> NumericResult<()> {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(handle, remaining)
    }

    /// Get the best (top-of-book) price
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Buy => self.levels.keys().next_back().copied(),
            // Lowest ask (first in sorted order)
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values_mut().next_back(),
            Side::Sell => self.levels.values_mut().next(),
        }
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Drop the level at `price` if it holds no orders.
    pub fn remove_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    pub fn volume_at(&self, price: Price) -> Quantity {
        self.level(price).map_or(Quantity::ZERO, PriceLevel::volume)
    }

    /// Levels in priority order, best price first.
    pub fn levels_best_first(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Get depth at N levels
    pub fn depth(&self, num_levels: usize) -> Vec<(Price, Quantity)> {
        self.levels_best_first()
            .take(num_levels)
            .map(|level| (level.price(), level.volume()))
            .collect()
    }

    /// Volume `taker` could trade against this side, capped at `cap`.
    pub fn crossable_volume(&self, taker: &Order, cap: Quantity) -> Quantity {
        let mut total = 0u64;
        for level in self.levels_best_first() {
            if !taker.crosses(level.price()) || total >= cap.value() {
                break;
            }
            total = total.saturating_add(level.volume().value());
        }
        Quantity::new(total.min(cap.value()))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }
}
