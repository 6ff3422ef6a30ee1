// ============================================================================
// Order Book
// Single-market façade over the arena, sides, indexes and matching
// ============================================================================

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::{debug, error, warn};

use super::errors::{AmendRejection, BookError};
use super::price_time::{Fill, PriceTimePriority};
use crate::book::{BookSide, ExpiryIndex, ExpiryKey, OrderArena, OrderIndex, OrderLocation};
use crate::domain::{
    ConfigError, Confirmation, LogicalTime, MarketId, Order, OrderAmendment, OrderBookConfig,
    OrderBookSnapshot, OrderId, OrderStateTransition, OrderStatus, OrderType, PartyId, Side,
    TimeInForce, Trade,
};
use crate::numeric::{NumericResult, Price, Quantity};

/// Deterministic limit order book for one market.
///
/// Commands are applied strictly one at a time through `&mut self`. Given
/// the same prior state and the same command stream, every replica produces
/// identical confirmations, trades and expiries: nothing here reads a
/// clock, draws randomness or iterates an unordered container.
pub struct OrderBook {
    config: OrderBookConfig,

    /// Bid side of the order book
    bids: BookSide,

    /// Ask side of the order book
    asks: BookSide,

    /// Sole owner of every resting order
    arena: OrderArena,

    /// Order id -> location, for amend and cancel
    order_index: OrderIndex,

    /// Good-till-time orders by (expiry, sequence)
    expiry_index: ExpiryIndex,

    algorithm: PriceTimePriority,

    /// Next insertion sequence (time priority tie-break)
    next_order_sequence: u64,

    /// Next trade sequence
    next_trade_sequence: u64,

    /// Set once an invariant violation is detected
    halted: bool,
}

impl OrderBook {
    /// Create a book with unit tick and lot sizes
    pub fn new(market_id: MarketId) -> Self {
        Self::with_config(OrderBookConfig::new(market_id))
    }

    /// Create a book from a validated configuration
    pub fn from_config(config: OrderBookConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: OrderBookConfig) -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            arena: OrderArena::with_capacity(config.initial_capacity),
            order_index: OrderIndex::with_capacity(config.initial_capacity),
            expiry_index: ExpiryIndex::new(),
            algorithm: PriceTimePriority,
            next_order_sequence: 1,
            next_trade_sequence: 1,
            halted: false,
            config,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Validate, sequence and match an incoming order.
    ///
    /// Any unfilled remainder rests at the tail of its price level if the
    /// time in force allows it, otherwise it is cancelled. FOK orders that
    /// cannot be filled in full are killed without trading.
    pub fn submit_order(
        &mut self,
        order: Order,
        now: LogicalTime,
    ) -> Result<Confirmation, BookError> {
        self.ensure_running()?;
        let result = self.submit_inner(order, now);
        self.settle(result)
    }

    /// Shrink a resting order in place or switch it between GTC and GTT.
    ///
    /// Price changes, size increases and reductions to zero are refused;
    /// a successful amend keeps the order's queue position.
    pub fn amend_order(
        &mut self,
        amendment: &OrderAmendment,
        now: LogicalTime,
    ) -> Result<Confirmation, BookError> {
        self.ensure_running()?;
        let result = self.amend_inner(amendment, now);
        self.settle(result)
    }

    /// Remove a resting order owned by `party_id`. Returns it as cancelled.
    pub fn cancel_order(
        &mut self,
        order_id: OrderId,
        party_id: &PartyId,
    ) -> Result<Order, BookError> {
        self.ensure_running()?;
        let result = self.cancel_inner(order_id, party_id);
        self.settle(result)
    }

    /// Remove and return every good-till-time order with expiry <= `now`,
    /// earliest expiry first, ties by sequence.
    ///
    /// Repeating the call with the same `now` returns nothing further.
    pub fn expire_orders(&mut self, now: LogicalTime) -> Result<Vec<Order>, BookError> {
        self.ensure_running()?;
        let result = self.expire_inner(now);
        self.settle(result)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Sum of remaining size at `price` on `side`; zero if no such level.
    pub fn volume_at_level(&self, price: Price, side: Side) -> Quantity {
        self.side(side).volume_at(price)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Spread in ticks
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.distance(bid)),
            _ => None,
        }
    }

    /// Resting order by id
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        let location = self.order_index.get(order_id)?;
        self.arena.get(location.handle)
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn level_count(&self, side: Side) -> usize {
        self.side(side).level_count()
    }

    /// Earliest pending good-till-time expiry
    pub fn next_expiry(&self) -> Option<LogicalTime> {
        self.expiry_index.next_expiry()
    }

    /// Get order book snapshot
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            self.config.market_id.clone(),
            self.bids.depth(depth),
            self.asks.depth(depth),
        )
    }

    pub fn market_id(&self) -> &MarketId {
        &self.config.market_id
    }

    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }

    /// Price in quote units according to the configured tick size
    pub fn display_price(&self, price: Price) -> NumericResult<Decimal> {
        price.to_decimal(self.config.tick_size)
    }

    /// Size in base units according to the configured lot size
    pub fn display_size(&self, size: Quantity) -> NumericResult<Decimal> {
        size.to_decimal(self.config.lot_size)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Walk every level and index and confirm they agree.
    ///
    /// A failure halts the book, like any other detected corruption.
    pub fn check_invariants(&mut self) -> Result<(), BookError> {
        self.ensure_running()?;
        let result = self.audit().map_err(BookError::corrupted);
        self.settle(result)
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn ensure_running(&self) -> Result<(), BookError> {
        if self.halted {
            return Err(BookError::BookHalted {
                market_id: self.config.market_id.clone(),
            });
        }
        Ok(())
    }

    /// Log the outcome and halt on corruption.
    fn settle<T>(&mut self, result: Result<T, BookError>) -> Result<T, BookError> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.halted = true;
                error!(market = %self.config.market_id, %err, "halting order book");
            } else {
                warn!(market = %self.config.market_id, %err, "command rejected");
            }
        }
        result
    }

    fn validate_submission(&self, order: &Order, now: LogicalTime) -> Result<(), BookError> {
        let order_id = order.id;

        if order.market_id != self.config.market_id {
            return Err(BookError::MarketMismatch {
                expected: self.config.market_id.clone(),
                actual: order.market_id.clone(),
            });
        }

        if order.status != OrderStatus::Pending {
            return Err(BookError::InvalidOrderState {
                order_id,
                status: order.status,
            });
        }

        if self.order_index.contains(&order_id) {
            return Err(BookError::DuplicateOrderId { order_id });
        }

        if order.size.is_zero() || order.remaining != order.size {
            return Err(BookError::InvalidSize { order_id });
        }

        match order.order_type {
            OrderType::Limit => {
                let Some(price) = order.price.filter(|price| !price.is_zero()) else {
                    return Err(BookError::InvalidPrice { order_id });
                };
                // Matching never touches the taker's own side, so the level
                // it would rest on must already have room for the full size
                if order.time_in_force.allows_resting()
                    && self
                        .side(order.side)
                        .volume_at(price)
                        .checked_add(order.size)
                        .is_err()
                {
                    return Err(BookError::InvalidSize { order_id });
                }
            },
            OrderType::Market => {
                if order.price.is_some() {
                    return Err(BookError::InvalidPrice { order_id });
                }
                if order.time_in_force.allows_resting() {
                    return Err(BookError::InvalidTimeInForce { order_id });
                }
            },
        }

        if let Some(expiry) = order.expiry() {
            if expiry <= now {
                return Err(BookError::InvalidExpiry {
                    order_id,
                    expiry,
                    now,
                });
            }
        }

        Ok(())
    }

    fn submit_inner(
        &mut self,
        mut taker: Order,
        now: LogicalTime,
    ) -> Result<Confirmation, BookError> {
        self.validate_submission(&taker, now)?;

        taker
            .apply(OrderStateTransition::Accept)
            .map_err(BookError::corrupted)?;
        taker.sequence = self.next_order_sequence;
        self.next_order_sequence += 1;

        let opposite = match taker.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        if taker.time_in_force == TimeInForce::FillOrKill
            && opposite.crossable_volume(&taker, taker.remaining) < taker.remaining
        {
            taker
                .apply(OrderStateTransition::Cancel)
                .map_err(BookError::corrupted)?;
            debug!(market = %self.config.market_id, order_id = %taker.id, "fill-or-kill order killed");
            return Ok(Confirmation::submitted(taker));
        }

        let fills = self
            .algorithm
            .match_order(&mut taker, opposite, &mut self.arena)?;

        let mut trades = SmallVec::with_capacity(fills.len());
        let mut passive_orders = Vec::with_capacity(fills.len());
        for fill in fills {
            let maker = self.collect_maker(&fill)?;
            trades.push(self.record_trade(&taker, &maker, &fill, now));
            passive_orders.push(maker);
        }

        if !taker.remaining.is_zero() {
            if taker.time_in_force.allows_resting() {
                self.rest(&taker)?;
            } else {
                taker
                    .apply(OrderStateTransition::Cancel)
                    .map_err(BookError::corrupted)?;
            }
        }

        debug!(
            market = %self.config.market_id,
            order_id = %taker.id,
            sequence = taker.sequence,
            trades = trades.len(),
            status = ?taker.status,
            "order submitted"
        );

        let mut confirmation = Confirmation::submitted(taker);
        confirmation.trades = trades;
        confirmation.passive_orders = passive_orders;
        Ok(confirmation)
    }

    /// Final state of a maker after a fill, detaching it if exhausted.
    fn collect_maker(&mut self, fill: &Fill) -> Result<Order, BookError> {
        if !fill.maker_exhausted {
            return self
                .arena
                .get(fill.maker)
                .cloned()
                .ok_or_else(|| BookError::corrupted("partially filled maker missing from arena"));
        }

        let maker = self
            .arena
            .remove(fill.maker)
            .ok_or_else(|| BookError::corrupted("filled maker missing from arena"))?;
        self.order_index
            .remove(&maker.id)
            .ok_or_else(|| BookError::corrupted(format!("order {} missing from index", maker.id)))?;
        if let Some(key) = ExpiryKey::for_order(&maker) {
            if !self.expiry_index.remove(&key) {
                return Err(BookError::corrupted(format!(
                    "order {} missing from expiry index",
                    maker.id
                )));
            }
        }
        Ok(maker)
    }

    fn record_trade(&mut self, taker: &Order, maker: &Order, fill: &Fill, now: LogicalTime) -> Trade {
        let (buyer, seller) = match taker.side {
            Side::Buy => (taker, maker),
            Side::Sell => (maker, taker),
        };

        let trade = Trade {
            sequence: self.next_trade_sequence,
            market_id: self.config.market_id.clone(),
            buyer_order_id: buyer.id,
            seller_order_id: seller.id,
            buyer_party_id: buyer.party_id.clone(),
            seller_party_id: seller.party_id.clone(),
            price: fill.price,
            size: fill.size,
            aggressor: taker.side,
            timestamp: now,
        };
        self.next_trade_sequence += 1;
        trade
    }

    /// Insert the taker's remainder at the tail of its own side.
    fn rest(&mut self, order: &Order) -> Result<(), BookError> {
        let price = order
            .price
            .ok_or_else(|| BookError::corrupted(format!("order {} has no price to rest at", order.id)))?;
        let handle = self.arena.insert(order.clone());

        if let Err(err) = self
            .side_mut(order.side)
            .insert(price, handle, order.remaining)
        {
            self.arena.remove(handle);
            return Err(BookError::corrupted(err));
        }
        self.order_index.insert(
            order.id,
            OrderLocation {
                handle,
                side: order.side,
                price,
            },
        );
        if let Some(key) = ExpiryKey::for_order(order) {
            self.expiry_index.insert(key);
        }
        Ok(())
    }

    fn amend_inner(
        &mut self,
        amendment: &OrderAmendment,
        now: LogicalTime,
    ) -> Result<Confirmation, BookError> {
        let order_id = amendment.order_id;
        let reject = |reason| BookError::AmendRejected { order_id, reason };

        let location = self
            .order_index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound { order_id })?;
        let current = self
            .arena
            .get(location.handle)
            .ok_or_else(|| BookError::corrupted(format!("order {order_id} indexed but not stored")))?;

        if current.party_id != amendment.party_id {
            return Err(reject(AmendRejection::PartyMismatch));
        }

        if amendment.price.is_some_and(|price| current.price != Some(price)) {
            return Err(reject(AmendRejection::PriceChange));
        }

        let remaining = match amendment.size {
            Some(size) if size.is_zero() => return Err(reject(AmendRejection::ZeroSize)),
            Some(size) if size >= current.remaining => {
                return Err(reject(AmendRejection::SizeNotReduced))
            },
            Some(size) => size,
            None => current.remaining,
        };

        // Total size is re-derived so that filled + remaining == size holds
        let size = current
            .filled()
            .checked_add(remaining)
            .map_err(BookError::corrupted)?;

        let time_in_force = match amendment.time_in_force {
            Some(tif) if !tif.allows_resting() => {
                return Err(reject(AmendRejection::TimeInForceNotRestable))
            },
            Some(tif) if tif.expiry().is_some_and(|expiry| expiry <= now) => {
                return Err(reject(AmendRejection::ExpiryNotInFuture))
            },
            Some(tif) => tif,
            None => current.time_in_force,
        };

        if remaining == current.remaining && time_in_force == current.time_in_force {
            return Err(reject(AmendRejection::NothingToAmend));
        }

        // Validation done; mutate
        let reduction = current
            .remaining
            .checked_sub(remaining)
            .map_err(BookError::corrupted)?;
        let old_key = ExpiryKey::for_order(current);

        let order = self
            .arena
            .get_mut(location.handle)
            .ok_or_else(|| BookError::corrupted(format!("order {order_id} vanished during amend")))?;
        order.remaining = remaining;
        order.size = size;
        order.time_in_force = time_in_force;
        let amended = order.clone();

        self.side_mut(location.side)
            .level_mut(location.price)
            .ok_or_else(|| BookError::corrupted(format!("level {} missing", location.price)))?
            .reduce_volume(reduction)
            .map_err(BookError::corrupted)?;

        let new_key = ExpiryKey::for_order(&amended);
        if old_key != new_key {
            if let Some(key) = old_key {
                if !self.expiry_index.remove(&key) {
                    return Err(BookError::corrupted(format!(
                        "order {order_id} missing from expiry index"
                    )));
                }
            }
            if let Some(key) = new_key {
                self.expiry_index.insert(key);
            }
        }

        debug!(
            market = %self.config.market_id,
            %order_id,
            remaining = %amended.remaining,
            time_in_force = ?amended.time_in_force,
            "order amended"
        );
        Ok(Confirmation::amended(amended))
    }

    fn cancel_inner(
        &mut self,
        order_id: OrderId,
        party_id: &PartyId,
    ) -> Result<Order, BookError> {
        let location = self
            .order_index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound { order_id })?;
        let owner = self
            .arena
            .get(location.handle)
            .map(|order| &order.party_id)
            .ok_or_else(|| BookError::corrupted(format!("order {order_id} indexed but not stored")))?;

        if owner != party_id {
            return Err(BookError::PartyMismatch {
                order_id,
                party_id: party_id.clone(),
            });
        }

        let mut order = self.detach(order_id, location)?;
        if let Some(key) = ExpiryKey::for_order(&order) {
            if !self.expiry_index.remove(&key) {
                return Err(BookError::corrupted(format!(
                    "order {order_id} missing from expiry index"
                )));
            }
        }
        order
            .apply(OrderStateTransition::Cancel)
            .map_err(BookError::corrupted)?;

        debug!(market = %self.config.market_id, %order_id, "order cancelled");
        Ok(order)
    }

    fn expire_inner(&mut self, now: LogicalTime) -> Result<Vec<Order>, BookError> {
        let mut expired = Vec::new();
        if self.expiry_index.is_empty() {
            return Ok(expired);
        }

        while let Some(key) = self.expiry_index.pop_due(now) {
            let location = self.order_index.get(&key.order_id).ok_or_else(|| {
                BookError::corrupted(format!("expiring order {} not indexed", key.order_id))
            })?;
            let mut order = self.detach(key.order_id, location)?;
            order
                .apply(OrderStateTransition::Expire)
                .map_err(BookError::corrupted)?;
            expired.push(order);
        }

        if !expired.is_empty() {
            debug!(market = %self.config.market_id, count = expired.len(), %now, "orders expired");
        }
        Ok(expired)
    }

    /// Remove a resting order from its level, the order index and the arena.
    /// The expiry index is left to the caller.
    fn detach(&mut self, order_id: OrderId, location: OrderLocation) -> Result<Order, BookError> {
        let remaining = self
            .arena
            .get(location.handle)
            .map(|order| order.remaining)
            .ok_or_else(|| BookError::corrupted(format!("order {order_id} indexed but not stored")))?;

        let side = self.side_mut(location.side);
        let level = side
            .level_mut(location.price)
            .ok_or_else(|| BookError::corrupted(format!("level {} missing", location.price)))?;
        if !level.remove(location.handle) {
            return Err(BookError::corrupted(format!(
                "order {order_id} absent from level {}",
                location.price
            )));
        }
        level.reduce_volume(remaining).map_err(BookError::corrupted)?;
        side.remove_if_empty(location.price);

        self.order_index.remove(&order_id);
        self.arena
            .remove(location.handle)
            .ok_or_else(|| BookError::corrupted(format!("order {order_id} vanished during removal")))
    }

    /// Full consistency walk; the first violation found is reported.
    fn audit(&self) -> Result<(), String> {
        let mut resting = 0usize;
        let mut good_till_time = 0usize;

        for book_side in [&self.bids, &self.asks] {
            let side = book_side.side();
            let mut previous: Option<Price> = None;

            for level in book_side.levels_best_first() {
                let price = level.price();
                if level.is_empty() {
                    return Err(format!("empty {side:?} level {price}"));
                }
                if let Some(previous) = previous {
                    let monotonic = match side {
                        Side::Buy => price < previous,
                        Side::Sell => price > previous,
                    };
                    if !monotonic {
                        return Err(format!("{side:?} levels out of order at {price}"));
                    }
                }
                previous = Some(price);

                let mut volume = 0u64;
                let mut last_sequence = 0u64;
                for handle in level.iter() {
                    let order = self
                        .arena
                        .get(handle)
                        .ok_or_else(|| format!("dangling handle at {side:?} level {price}"))?;

                    if order.side != side || order.price != Some(price) {
                        return Err(format!("order {} misplaced at level {price}", order.id));
                    }
                    if !order.status.is_live() {
                        return Err(format!("order {} resting while {:?}", order.id, order.status));
                    }
                    if order.remaining.is_zero() || order.remaining > order.size {
                        return Err(format!("order {} has invalid remaining", order.id));
                    }
                    if order.sequence <= last_sequence {
                        return Err(format!("level {price} not in sequence order"));
                    }
                    last_sequence = order.sequence;

                    let expected = OrderLocation {
                        handle,
                        side,
                        price,
                    };
                    if self.order_index.get(&order.id) != Some(expected) {
                        return Err(format!("order {} index entry disagrees", order.id));
                    }
                    if let Some(key) = ExpiryKey::for_order(order) {
                        if !self.expiry_index.contains(&key) {
                            return Err(format!("order {} missing from expiry index", order.id));
                        }
                        good_till_time += 1;
                    }

                    volume = volume
                        .checked_add(order.remaining.value())
                        .ok_or_else(|| format!("volume overflow at level {price}"))?;
                }

                if volume != level.volume().value() {
                    return Err(format!("cached volume wrong at {side:?} level {price}"));
                }
            }
            resting += book_side.order_count();
        }

        if resting != self.order_index.len() || resting != self.arena.len() {
            return Err(format!(
                "{resting} resting orders, {} indexed, {} stored",
                self.order_index.len(),
                self.arena.len()
            ));
        }
        if good_till_time != self.expiry_index.len() {
            return Err("stale entries in expiry index".to_string());
        }
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return Err(format!("crossed book: bid {bid} >= ask {ask}"));
            }
        }

        Ok(())
    }
}
