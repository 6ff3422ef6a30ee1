// ============================================================================
// Order Index
// ============================================================================

use std::collections::HashMap;

use super::arena::OrderHandle;
use crate::domain::{OrderId, Side};
use crate::numeric::Price;

/// Where a resting order lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderLocation {
    pub handle: OrderHandle,
    pub side: Side,
    pub price: Price,
}

/// Order id to location lookup for amend and cancel.
///
/// Only ever used for point lookups; it is never iterated, so hash order
/// cannot leak into any output.
#[derive(Debug, Default)]
pub(crate) struct OrderIndex {
    locations: HashMap<OrderId, OrderLocation>,
}

impl OrderIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            locations: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, order_id: OrderId, location: OrderLocation) -> Option<OrderLocation> {
        self.locations.insert(order_id, location)
    }

    pub fn get(&self, order_id: &OrderId) -> Option<OrderLocation> {
        self.locations.get(order_id).copied()
    }

    pub fn remove(&mut self, order_id: &OrderId) -> Option<OrderLocation> {
        self.locations.remove(order_id)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.locations.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
}
