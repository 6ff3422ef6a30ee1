// ============================================================================
// Price Level
// ============================================================================

use std::collections::HashMap;
use std::iter;

use super::arena::OrderHandle;
use crate::numeric::{NumericResult, Price, Quantity};

#[derive(Debug, Clone, Copy, Default)]
struct Links {
    prev: Option<OrderHandle>,
    next: Option<OrderHandle>,
}

/// FIFO queue of resting orders at one exact price.
///
/// The queue is a doubly linked list threaded through `links`, so an order
/// can leave from any position in constant time. Traversal always follows
/// the links from `head`, never the map's own order. The cached volume is
/// the sum of the queued orders' remaining sizes.
#[derive(Debug, Clone)]
pub(crate) struct PriceLevel {
    price: Price,
    head: Option<OrderHandle>,
    tail: Option<OrderHandle>,
    links: HashMap<OrderHandle, Links>,
    volume: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            links: HashMap::new(),
            volume: Quantity::ZERO,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn volume(&self) -> Quantity {
        self.volume
    }

    /// Append to the tail (least time priority at this price).
    pub fn push_back(&mut self, handle: OrderHandle, remaining: Quantity) -> NumericResult<()> {
        debug_assert!(!self.links.contains_key(&handle), "handle queued twice");
        self.volume = self.volume.checked_add(remaining)?;

        match self.tail.and_then(|tail| self.links.get_mut(&tail)) {
            Some(tail) => tail.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.links.insert(
            handle,
            Links {
                prev: self.tail,
                next: None,
            },
        );
        self.tail = Some(handle);
        Ok(())
    }

    pub fn front(&self) -> Option<OrderHandle> {
        self.head
    }

    pub fn pop_front(&mut self) -> Option<OrderHandle> {
        let head = self.head?;
        self.remove(head);
        Some(head)
    }

    /// Unlink a handle from anywhere in the queue, keeping the rest in order.
    pub fn remove(&mut self, handle: OrderHandle) -> bool {
        let Some(Links { prev, next }) = self.links.remove(&handle) else {
            return false;
        };

        match prev.and_then(|prev| self.links.get_mut(&prev)) {
            Some(prev) => prev.next = next,
            None => self.head = next,
        }
        match next.and_then(|next| self.links.get_mut(&next)) {
            Some(next) => next.prev = prev,
            None => self.tail = prev,
        }
        true
    }

    pub fn reduce_volume(&mut self, quantity: Quantity) -> NumericResult<()> {
        self.volume = self.volume.checked_sub(quantity)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = OrderHandle> + '_ {
        iter::successors(self.head, move |handle| {
            self.links.get(handle).and_then(|links| links.next)
        })
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::OrderArena;
    use crate::domain::{MarketId, Order, OrderId, PartyId, Side, TimeInForce};

    fn handles(n: usize) -> Vec<OrderHandle> {
        let mut arena = OrderArena::with_capacity(n);
        (0..n)
            .map(|_| {
                arena.insert(Order::limit(
                    OrderId::new(),
                    MarketId::new("BTC-USD"),
                    PartyId::new("alice"),
                    Side::Sell,
                    Price::new(100),
                    Quantity::new(1),
                    TimeInForce::GoodTillCancel,
                ))
            })
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let h = handles(3);
        let mut level = PriceLevel::new(Price::new(100));
        for (i, handle) in h.iter().enumerate() {
            level.push_back(*handle, Quantity::new(i as u64 + 1)).unwrap();
        }

        assert_eq!(level.volume(), Quantity::new(6));
        assert_eq!(level.front(), Some(h[0]));
        assert_eq!(level.pop_front(), Some(h[0]));
        assert_eq!(level.front(), Some(h[1]));
        assert_eq!(level.len(), 2);
    }

    #[test]
    fn test_remove_from_middle_keeps_order() {
        let h = handles(3);
        let mut level = PriceLevel::new(Price::new(100));
        for handle in &h {
            level.push_back(*handle, Quantity::new(2)).unwrap();
        }

        assert!(level.remove(h[1]));
        level.reduce_volume(Quantity::new(2)).unwrap();
        assert!(!level.remove(h[1]));

        assert_eq!(level.iter().collect::<Vec<_>>(), vec![h[0], h[2]]);
        assert_eq!(level.volume(), Quantity::new(4));
    }

    #[test]
    fn test_remove_head_and_tail_relinks() {
        let h = handles(4);
        let mut level = PriceLevel::new(Price::new(100));
        for handle in &h {
            level.push_back(*handle, Quantity::new(1)).unwrap();
        }

        assert!(level.remove(h[0]));
        assert_eq!(level.front(), Some(h[1]));
        assert!(level.remove(h[3]));
        assert_eq!(level.iter().collect::<Vec<_>>(), vec![h[1], h[2]]);

        // A new arrival goes behind the surviving tail
        level.push_back(h[0], Quantity::new(1)).unwrap();
        assert_eq!(level.iter().collect::<Vec<_>>(), vec![h[1], h[2], h[0]]);

        assert!(level.remove(h[2]));
        assert_eq!(level.pop_front(), Some(h[1]));
        assert_eq!(level.pop_front(), Some(h[0]));
        assert_eq!(level.pop_front(), None);
        assert!(level.is_empty());
        assert_eq!(level.iter().count(), 0);
    }

    #[test]
    fn test_volume_underflow_is_reported() {
        let mut level = PriceLevel::new(Price::new(100));
        assert!(level.reduce_volume(Quantity::new(1)).is_err());
        assert!(level.is_empty());
    }
}
