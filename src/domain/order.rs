// ============================================================================
// Order Domain Model
// ============================================================================

use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caller-supplied logical time (block time). Never read from a clock.
pub type LogicalTime = DateTime<Utc>;

// ============================================================================
// Value Objects
// ============================================================================

/// Order identifier, assigned by the caller before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    /// Random identifier for callers that do not derive ids themselves.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates a cheap-to-clone string identifier.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Market identifier (e.g. "BTC-USD")
    MarketId
);

string_id!(
    /// Party (account) identifier, authenticated upstream
    PartyId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    Limit,
    /// Matches with an unbounded limit and never rests
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeInForce {
    /// Good Till Cancel - remains active until filled or cancelled
    GoodTillCancel,
    /// Good Till Time - expires once logical time reaches the expiry
    GoodTillTime(LogicalTime),
    /// Immediate Or Cancel - fill immediately or cancel remainder
    ImmediateOrCancel,
    /// Fill Or Kill - fill entire order immediately or cancel all
    FillOrKill,
}

impl TimeInForce {
    pub fn expiry(&self) -> Option<LogicalTime> {
        match self {
            TimeInForce::GoodTillTime(expiry) => Some(*expiry),
            _ => None,
        }
    }

    /// Whether an unfilled remainder may rest in the book.
    pub fn allows_resting(&self) -> bool {
        matches!(
            self,
            TimeInForce::GoodTillCancel | TimeInForce::GoodTillTime(_)
        )
    }
}

// ============================================================================
// Order State Machine
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum OrderStatus {
        /// Built by the caller, not yet accepted by a book
        Pending,
        Active,
        PartiallyFilled,
        Filled,
        Cancelled,
        Expired,
        Rejected,
    }

    impl OrderStatus {
        pub fn is_terminal(&self) -> bool {
            matches!(
                self,
                OrderStatus::Filled
                    | OrderStatus::Cancelled
                    | OrderStatus::Rejected
                    | OrderStatus::Expired
            )
        }

        /// Amend, cancel and further matching are only allowed from here.
        pub fn is_live(&self) -> bool {
            matches!(self, OrderStatus::Active | OrderStatus::PartiallyFilled)
        }
    }

    /// Valid state transitions for the order state machine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OrderStateTransition {
        Accept,
        Reject,
        PartialFill,
        Fill,
        Cancel,
        Expire,
    }

    #[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
    #[error("invalid transition from {from:?} via {via:?}")]
    pub struct InvalidTransition {
        pub from: OrderStatus,
        pub via: OrderStateTransition,
    }

    impl OrderStatus {
        pub fn transition(
            &self,
            transition: OrderStateTransition,
        ) -> Result<OrderStatus, InvalidTransition> {
            use OrderStateTransition as T;
            use OrderStatus as S;

            match (self, transition) {
                (S::Pending, T::Accept) => Ok(S::Active),
                (S::Pending, T::Reject) => Ok(S::Rejected),

                (S::Active | S::PartiallyFilled, T::PartialFill) => Ok(S::PartiallyFilled),
                (S::Active | S::PartiallyFilled, T::Fill) => Ok(S::Filled),
                (S::Active | S::PartiallyFilled, T::Cancel) => Ok(S::Cancelled),
                (S::Active | S::PartiallyFilled, T::Expire) => Ok(S::Expired),

                (from, via) => Err(InvalidTransition { from: *from, via }),
            }
        }
    }
}

use state::{InvalidTransition, OrderStateTransition, OrderStatus};

/// Errors raised while mutating a single order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrderStateError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("fill of {fill} exceeds remaining {remaining}")]
    Overfill { fill: Quantity, remaining: Quantity },
}

// ============================================================================
// Order Entity
// ============================================================================

/// A limit or market order. Owned exclusively by the book once accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub market_id: MarketId,
    pub party_id: PartyId,
    pub side: Side,
    pub order_type: OrderType,
    /// `None` for market orders
    pub price: Option<Price>,
    /// Original size plus any amendment adjustments; `filled + remaining`
    pub size: Quantity,
    pub remaining: Quantity,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    /// Insertion sequence, assigned by the book on acceptance
    pub sequence: u64,
}

impl Order {
    pub fn limit(
        id: OrderId,
        market_id: MarketId,
        party_id: PartyId,
        side: Side,
        price: Price,
        size: Quantity,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id,
            market_id,
            party_id,
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            size,
            remaining: size,
            time_in_force,
            status: OrderStatus::Pending,
            sequence: 0,
        }
    }

    pub fn market(
        id: OrderId,
        market_id: MarketId,
        party_id: PartyId,
        side: Side,
        size: Quantity,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id,
            market_id,
            party_id,
            side,
            order_type: OrderType::Market,
            price: None,
            size,
            remaining: size,
            time_in_force,
            status: OrderStatus::Pending,
            sequence: 0,
        }
    }

    pub fn filled(&self) -> Quantity {
        Quantity::new(self.size.value().saturating_sub(self.remaining.value()))
    }

    pub fn expiry(&self) -> Option<LogicalTime> {
        self.time_in_force.expiry()
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.order_type, OrderType::Market)
    }

    /// Whether this order would trade against a resting order at `resting`.
    pub fn crosses(&self, resting: Price) -> bool {
        match (self.side, self.price) {
            (_, None) => true,
            (Side::Buy, Some(limit)) => limit >= resting,
            (Side::Sell, Some(limit)) => limit <= resting,
        }
    }

    pub(crate) fn apply(&mut self, transition: OrderStateTransition) -> Result<(), InvalidTransition> {
        self.status = self.status.transition(transition)?;
        Ok(())
    }

    /// Decrease `remaining` by `quantity` and advance the state machine.
    pub(crate) fn fill(&mut self, quantity: Quantity) -> Result<(), OrderStateError> {
        let remaining = self
            .remaining
            .checked_sub(quantity)
            .map_err(|_| OrderStateError::Overfill {
                fill: quantity,
                remaining: self.remaining,
            })?;

        let transition = if remaining.is_zero() {
            OrderStateTransition::Fill
        } else {
            OrderStateTransition::PartialFill
        };
        self.apply(transition)?;
        self.remaining = remaining;
        Ok(())
    }
}

// ============================================================================
// Amendment
// ============================================================================

/// A request to modify a resting order.
///
/// `size` is the desired new remaining size. `price`, if present, must match
/// the resting price.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderAmendment {
    pub order_id: OrderId,
    pub party_id: PartyId,
    pub price: Option<Price>,
    pub size: Option<Quantity>,
    pub time_in_force: Option<TimeInForce>,
}

impl OrderAmendment {
    pub fn new(order_id: OrderId, party_id: PartyId) -> Self {
        Self {
            order_id,
            party_id,
            price: None,
            size: None,
            time_in_force: None,
        }
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_size(mut self, size: Quantity) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }
}
