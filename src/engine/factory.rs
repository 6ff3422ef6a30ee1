// ============================================================================
// Order Book Factory
// Creates order books with validated configuration
// ============================================================================

use rust_decimal::Decimal;

use crate::domain::{ConfigError, MarketId, OrderBookConfig};
use crate::engine::OrderBook;

/// Creates an order book from configuration
///
/// # Example
/// ```
/// use order_book_engine::prelude::*;
/// use order_book_engine::engine::factory::create_from_config;
///
/// let config = OrderBookConfig::new(MarketId::new("AAPL"));
/// let book = create_from_config(config).unwrap();
/// assert_eq!(book.market_id().as_str(), "AAPL");
/// ```
pub fn create_from_config(config: OrderBookConfig) -> Result<OrderBook, ConfigError> {
    let book = OrderBook::from_config(config)?;
    tracing::debug!(market = %book.market_id(), "order book created");
    Ok(book)
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating order books with a fluent API
///
/// # Example
/// ```
/// use order_book_engine::engine::factory::OrderBookBuilder;
/// use rust_decimal::Decimal;
///
/// let book = OrderBookBuilder::new("BTC-USD")
///     .with_tick_size(Decimal::new(1, 2))
///     .with_lot_size(Decimal::new(1, 4))
///     .build()
///     .unwrap();
/// assert_eq!(book.order_count(), 0);
/// ```
pub struct OrderBookBuilder {
    config: OrderBookConfig,
}

impl OrderBookBuilder {
    /// Create a new builder for the specified market
    pub fn new(market_id: impl Into<MarketId>) -> Self {
        Self {
            config: OrderBookConfig::new(market_id.into()),
        }
    }

    /// Set price tick size
    pub fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.config = self.config.with_tick_size(tick_size);
        self
    }

    /// Set lot size
    pub fn with_lot_size(mut self, lot_size: Decimal) -> Self {
        self.config = self.config.with_lot_size(lot_size);
        self
    }

    /// Pre-size the order arena and index
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_initial_capacity(capacity);
        self
    }

    /// Build the order book
    pub fn build(self) -> Result<OrderBook, ConfigError> {
        create_from_config(self.config)
    }

    /// Get the configuration without building (for inspection)
    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_from_config() {
        let config = OrderBookConfig::new(MarketId::new("AAPL"));
        let book = create_from_config(config).unwrap();
        assert_eq!(book.market_id().as_str(), "AAPL");
        assert!(!book.is_halted());
    }

    #[test]
    fn test_builder_pattern() {
        let builder = OrderBookBuilder::new("BTC-USD")
            .with_tick_size(Decimal::new(1, 2))
            .with_initial_capacity(16);
        assert_eq!(builder.config().tick_size, Decimal::new(1, 2));
        assert_eq!(builder.config().initial_capacity, 16);

        let book = builder.build().unwrap();
        assert_eq!(book.config().lot_size, Decimal::ONE);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(matches!(
            OrderBookBuilder::new("BTC-USD")
                .with_tick_size(Decimal::ZERO)
                .build(),
            Err(ConfigError::InvalidTickSize(_))
        ));
        assert!(matches!(
            OrderBookBuilder::new("").build(),
            Err(ConfigError::EmptyMarketId)
        ));
    }
}
