// ============================================================================
// Expiry Index
// Time-ordered index of good-till-time orders
// ============================================================================

use crossbeam_skiplist::SkipSet;

use crate::domain::{LogicalTime, Order, OrderId};

/// Ordering key: expiry first, then insertion sequence.
///
/// The order id is carried so an entry can be resolved through the order
/// index; it never decides ordering because sequences are unique per book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ExpiryKey {
    pub expiry: LogicalTime,
    pub sequence: u64,
    pub order_id: OrderId,
}

impl ExpiryKey {
    /// Key for `order` if it is good-till-time.
    pub fn for_order(order: &Order) -> Option<Self> {
        order.expiry().map(|expiry| Self {
            expiry,
            sequence: order.sequence,
            order_id: order.id,
        })
    }
}

pub(crate) struct ExpiryIndex {
    entries: SkipSet<ExpiryKey>,
}

impl Default for ExpiryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpiryIndex {
    pub fn new() -> Self {
        Self {
            entries: SkipSet::new(),
        }
    }

    pub fn insert(&mut self, key: ExpiryKey) {
        self.entries.insert(key);
    }

    pub fn remove(&mut self, key: &ExpiryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &ExpiryKey) -> bool {
        self.entries.contains(key)
    }

    /// Remove and return the earliest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: LogicalTime) -> Option<ExpiryKey> {
        let key = *self.entries.front()?.value();
        if key.expiry > now {
            return None;
        }
        self.entries.remove(&key);
        Some(key)
    }

    pub fn next_expiry(&self) -> Option<LogicalTime> {
        self.entries.front().map(|entry| entry.value().expiry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
