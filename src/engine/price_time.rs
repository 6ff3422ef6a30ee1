// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// ============================================================================

use crate::book::{BookSide, OrderArena, OrderHandle};
use crate::domain::Order;
use crate::engine::BookError;
use crate::numeric::{Price, Quantity};

/// One crossing between the taker and a resting maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fill {
    pub maker: OrderHandle,
    /// Maker's resting price
    pub price: Price,
    pub size: Quantity,
    /// Maker reached zero and was popped from its level
    pub maker_exhausted: bool,
}

/// Price/Time Priority (FIFO) matching algorithm
///
/// Better prices always trade first; within a price level, orders trade in
/// strict arrival-sequence order. No other ordering key is consulted.
///
/// # Example
/// ```text
/// Book:  50000 @ 1 (Order A, seq=100)
///        50000 @ 2 (Order B, seq=101)
///
/// Incoming: Buy 2 @ 50000
/// Result: Match 1 with A, then 1 with B (B stays at the front with 1)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PriceTimePriority;

impl PriceTimePriority {
    /// Cross `taker` against `opposite` until it is exhausted or no level
    /// crosses. Updates remainings on both sides, pops exhausted makers from
    /// their levels and drops emptied levels. Removing exhausted makers from
    /// the arena and indexes is left to the caller.
    ///
    /// Any `Err` means the book was found inconsistent mid-match.
    pub fn match_order(
        &self,
        taker: &mut Order,
        opposite: &mut BookSide,
        arena: &mut OrderArena,
    ) -> Result<Vec<Fill>, BookError> {
        let mut fills = Vec::new();

        while !taker.remaining.is_zero() {
            let Some(level) = opposite.best_level_mut() else {
                break;
            };
            let price = level.price();

            if !taker.crosses(price) {
                break;
            }

            let handle = level
                .front()
                .ok_or_else(|| BookError::corrupted(format!("empty level {price} left in book")))?;
            let maker = arena
                .get_mut(handle)
                .ok_or_else(|| BookError::corrupted(format!("dangling handle at level {price}")))?;

            if maker.price != Some(price) || maker.remaining.is_zero() {
                return Err(BookError::corrupted(format!(
                    "order {} does not belong at level {price}",
                    maker.id
                )));
            }

            let size = taker.remaining.min(maker.remaining);
            maker.fill(size).map_err(BookError::corrupted)?;
            taker.fill(size).map_err(BookError::corrupted)?;
            level.reduce_volume(size).map_err(BookError::corrupted)?;

            // Partially filled makers keep their place at the front
            let maker_exhausted = maker.remaining.is_zero();
            if maker_exhausted {
                level.pop_front();
            }
            let level_empty = level.is_empty();

            fills.push(Fill {
                maker: handle,
                price,
                size,
                maker_exhausted,
            });

            if level_empty {
                opposite.remove_if_empty(price);
            }
        }

        Ok(fills)
    }
}
