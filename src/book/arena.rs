// ============================================================================
// Order Arena
// Single owner of every resting order, addressed by stable handles
// ============================================================================

use slab::Slab;

use crate::domain::Order;

/// Stable index into the arena. Valid until the order is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OrderHandle(usize);

#[derive(Debug, Default)]
pub(crate) struct OrderArena {
    orders: Slab<Order>,
}

impl OrderArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, order: Order) -> OrderHandle {
        OrderHandle(self.orders.insert(order))
    }

    pub fn get(&self, handle: OrderHandle) -> Option<&Order> {
        self.orders.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: OrderHandle) -> Option<&mut Order> {
        self.orders.get_mut(handle.0)
    }

    pub fn remove(&mut self, handle: OrderHandle) -> Option<Order> {
        self.orders.try_remove(handle.0)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
