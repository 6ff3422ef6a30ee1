// ============================================================================
// Order Book Engine Library
// Deterministic price-time priority limit order book
// ============================================================================

//! # Order Book Engine
//!
//! A single-market limit order book intended to run inside a replicated
//! state machine, where every replica must reach the same state from the
//! same command stream.
//!
//! ## Features
//!
//! - **Strict price-time priority** with trades at the resting price
//! - **Integer tick/lot arithmetic**; decimals only at the display edge
//! - **Caller-supplied logical time**; the book never reads a clock
//! - **In-place amends** that shrink size or switch GTC/GTT without losing
//!   queue position
//! - **Good-till-time expiry** in (expiry, sequence) order
//! - **Self-auditing**: detected corruption halts the book
//!
//! ## Example
//!
//! ```rust
//! use order_book_engine::prelude::*;
//! use chrono::DateTime;
//!
//! let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
//! let mut book = OrderBook::new(MarketId::new("BTC-USD"));
//!
//! let sell = Order::limit(
//!     OrderId::new(),
//!     MarketId::new("BTC-USD"),
//!     PartyId::new("seller"),
//!     Side::Sell,
//!     Price::new(50_000),
//!     Quantity::new(3),
//!     TimeInForce::GoodTillCancel,
//! );
//! book.submit_order(sell, now).unwrap();
//!
//! let buy = Order::limit(
//!     OrderId::new(),
//!     MarketId::new("BTC-USD"),
//!     PartyId::new("buyer"),
//!     Side::Buy,
//!     Price::new(50_000),
//!     Quantity::new(1),
//!     TimeInForce::ImmediateOrCancel,
//! );
//! let confirmation = book.submit_order(buy, now).unwrap();
//!
//! assert_eq!(confirmation.trades.len(), 1);
//! assert_eq!(book.volume_at_level(Price::new(50_000), Side::Sell), Quantity::new(2));
//! ```

pub(crate) mod book;
pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ConfigError, Confirmation, ConfirmedAction, LogicalTime, MarketId, Order,
        OrderAmendment, OrderBookConfig, OrderBookSnapshot, OrderId, OrderStatus, OrderType,
        PartyId, Side, TimeInForce, Trade,
    };
    pub use crate::engine::{
        create_from_config, AmendRejection, BookError, OrderBook, OrderBookBuilder,
    };
    pub use crate::interfaces::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
    pub use crate::numeric::{Price, Quantity};
}


#[cfg(test)]
mod property_tests {
    use super::prelude::*;
    use chrono::DateTime;
    use proptest::prelude::*;
    use uuid::Uuid;

    const MARKET: &str = "ETH-USD";

    #[derive(Debug, Clone)]
    enum Command {
        Submit {
            side: Side,
            price: Option<u64>,
            size: u64,
            tif: u8,
            ttl: i64,
        },
        Cancel {
            target: usize,
        },
        Amend {
            target: usize,
            size: u64,
        },
        Tick {
            secs: i64,
        },
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Outcome {
        Submitted(Result<Confirmation, BookError>),
        Amended(Result<Confirmation, BookError>),
        Cancelled(Result<Order, BookError>),
        Expired(Result<Vec<Order>, BookError>),
    }

    fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            6 => (
                any::<bool>(),
                proptest::option::weighted(0.9, 95u64..=105),
                1u64..=10,
                0u8..4,
                1i64..20,
            )
                .prop_map(|(buy, price, size, tif, ttl)| Command::Submit {
                    side: if buy { Side::Buy } else { Side::Sell },
                    price,
                    size,
                    tif,
                    ttl,
                }),
            1 => (0usize..64).prop_map(|target| Command::Cancel { target }),
            2 => (0usize..64, 0u64..10).prop_map(|(target, size)| Command::Amend { target, size }),
            1 => (1i64..10).prop_map(|secs| Command::Tick { secs }),
        ]
    }

    fn at(secs: i64) -> LogicalTime {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    /// Replays commands against a fresh book, checking per-command
    /// properties along the way.
    struct Replay {
        book: OrderBook,
        now: i64,
        submitted: Vec<(OrderId, PartyId)>,
    }

    impl Replay {
        fn new() -> Self {
            Self {
                book: OrderBook::new(MarketId::new(MARKET)),
                now: 0,
                submitted: Vec::new(),
            }
        }

        fn target(&self, index: usize) -> Option<(OrderId, PartyId)> {
            if self.submitted.is_empty() {
                return None;
            }
            self.submitted.get(index % self.submitted.len()).cloned()
        }

        fn apply(&mut self, command: &Command) -> Result<Option<Outcome>, TestCaseError> {
            let now = at(self.now);
            let outcome = match *command {
                Command::Submit {
                    side,
                    price,
                    size,
                    tif,
                    ttl,
                } => {
                    let n = self.submitted.len();
                    let id = OrderId::from_uuid(Uuid::from_u128(n as u128 + 1));
                    let party = PartyId::new(format!("party-{}", n % 3));
                    let time_in_force = match tif {
                        0 => TimeInForce::GoodTillCancel,
                        1 => TimeInForce::GoodTillTime(at(self.now + ttl)),
                        2 => TimeInForce::ImmediateOrCancel,
                        _ => TimeInForce::FillOrKill,
                    };
                    let market = MarketId::new(MARKET);
                    let order = match price {
                        Some(price) => Order::limit(
                            id,
                            market,
                            party.clone(),
                            side,
                            Price::new(price),
                            Quantity::new(size),
                            time_in_force,
                        ),
                        None => Order::market(
                            id,
                            market,
                            party.clone(),
                            side,
                            Quantity::new(size),
                            time_in_force,
                        ),
                    };
                    self.submitted.push((id, party));

                    let before = self.book.snapshot(usize::MAX);
                    let result = self.book.submit_order(order, now);
                    if let Ok(confirmation) = &result {
                        check_submission(confirmation)?;
                        check_conservation(&before, &self.book.snapshot(usize::MAX), side, confirmation)?;
                    }
                    Outcome::Submitted(result)
                },
                Command::Cancel { target } => {
                    let Some((id, party)) = self.target(target) else {
                        return Ok(None);
                    };
                    Outcome::Cancelled(self.book.cancel_order(id, &party))
                },
                Command::Amend { target, size } => {
                    let Some((id, party)) = self.target(target) else {
                        return Ok(None);
                    };
                    let before = self
                        .book
                        .order(&id)
                        .and_then(|o| o.price.map(|p| (o.side, p, o.remaining)));
                    let level_before =
                        before.map(|(side, price, _)| self.book.volume_at_level(price, side));

                    let amendment = OrderAmendment::new(id, party).with_size(Quantity::new(size));
                    let result = self.book.amend_order(&amendment, now);

                    if let (Some((side, price, remaining)), Some(level_before)) = (before, level_before) {
                        let level_after = self.book.volume_at_level(price, side).value();
                        match &result {
                            Ok(confirmation) => {
                                prop_assert_eq!(confirmation.order.price, Some(price));
                                prop_assert_eq!(&confirmation.order.party_id, &amendment.party_id);
                                let amended = confirmation.order.remaining;
                                prop_assert!(amended < remaining);
                                prop_assert!(!amended.is_zero());
                                prop_assert_eq!(
                                    level_after,
                                    level_before.value() - (remaining.value() - amended.value())
                                );
                            },
                            Err(_) => {
                                prop_assert_eq!(level_after, level_before.value());
                            },
                        }
                    }
                    Outcome::Amended(result)
                },
                Command::Tick { secs } => {
                    self.now += secs;
                    let now = at(self.now);
                    let result = self.book.expire_orders(now);
                    if let Ok(expired) = &result {
                        for order in expired {
                            prop_assert_eq!(order.status, OrderStatus::Expired);
                            prop_assert!(order.expiry().is_some_and(|expiry| expiry <= now));
                        }
                        // Nothing left to expire at the same time
                        prop_assert!(self.book.expire_orders(now).unwrap().is_empty());
                    }
                    Outcome::Expired(result)
                },
            };

            prop_assert!(self.book.check_invariants().is_ok());
            Ok(Some(outcome))
        }
    }

    /// Trades walk the opposite side best price first and FIFO within a
    /// level, every trade crosses the taker's limit, and the traded size
    /// matches the taker's fill.
    fn check_submission(confirmation: &Confirmation) -> Result<(), TestCaseError> {
        let taker = &confirmation.order;
        prop_assert_eq!(confirmation.trades.len(), confirmation.passive_orders.len());
        prop_assert_eq!(confirmation.traded_size(), taker.filled().value());

        for trade in &confirmation.trades {
            prop_assert!(taker.crosses(trade.price));
            prop_assert_eq!(trade.aggressor, taker.side);
        }

        for i in 1..confirmation.trades.len() {
            let (prev, next) = (&confirmation.trades[i - 1], &confirmation.trades[i]);
            match taker.side {
                Side::Buy => {
                    prop_assert!(prev.price <= next.price);
                },
                Side::Sell => {
                    prop_assert!(prev.price >= next.price);
                },
            }
            if prev.price == next.price {
                prop_assert!(
                    confirmation.passive_orders[i - 1].sequence
                        < confirmation.passive_orders[i].sequence
                );
            }
            // Only the last maker touched may survive
            prop_assert!(confirmation.passive_orders[i - 1].remaining.is_zero());
        }

        if taker.time_in_force == TimeInForce::FillOrKill {
            prop_assert!(taker.remaining.is_zero() || confirmation.trades.is_empty());
        }
        if !taker.time_in_force.allows_resting() {
            prop_assert!(!confirmation.is_resting());
        }
        Ok(())
    }

    /// Opposite-side volume drops by exactly the traded size and the
    /// taker's own side grows by exactly what rested.
    fn check_conservation(
        before: &OrderBookSnapshot,
        after: &OrderBookSnapshot,
        side: Side,
        confirmation: &Confirmation,
    ) -> Result<(), TestCaseError> {
        let (opposite_before, opposite_after, own_before, own_after) = match side {
            Side::Buy => (
                before.total_ask_volume(),
                after.total_ask_volume(),
                before.total_bid_volume(),
                after.total_bid_volume(),
            ),
            Side::Sell => (
                before.total_bid_volume(),
                after.total_bid_volume(),
                before.total_ask_volume(),
                after.total_ask_volume(),
            ),
        };
        let rested = if confirmation.is_resting() {
            confirmation.order.remaining.value()
        } else {
            0
        };

        prop_assert_eq!(opposite_before - opposite_after, confirmation.traded_size());
        prop_assert_eq!(own_after, own_before + rested);
        prop_assert_eq!(
            confirmation.order.filled().value() + confirmation.order.remaining.value(),
            confirmation.order.size.value()
        );
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_book_stays_consistent(commands in prop::collection::vec(command(), 1..120)) {
            let mut replay = Replay::new();
            for command in &commands {
                replay.apply(command)?;
            }
            prop_assert!(!replay.book.is_halted());
            if let (Some(bid), Some(ask)) = (replay.book.best_bid(), replay.book.best_ask()) {
                prop_assert!(bid < ask);
            }
        }

        #[test]
        fn prop_replicas_agree(commands in prop::collection::vec(command(), 1..120)) {
            let mut left = Replay::new();
            let mut right = Replay::new();

            for command in &commands {
                let a = left.apply(command)?;
                let b = right.apply(command)?;
                prop_assert_eq!(a, b);
            }
            prop_assert_eq!(left.book.snapshot(usize::MAX), right.book.snapshot(usize::MAX));
            prop_assert_eq!(left.book.next_expiry(), right.book.next_expiry());
        }
    }
}
