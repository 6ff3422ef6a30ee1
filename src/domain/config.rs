// ============================================================================
// Order Book Configuration
// ============================================================================

use rust_decimal::Decimal;
use thiserror::Error;

use super::order::MarketId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("market id cannot be empty")]
    EmptyMarketId,

    #[error("tick size must be positive, got {0}")]
    InvalidTickSize(Decimal),

    #[error("lot size must be positive, got {0}")]
    InvalidLotSize(Decimal),
}

/// Configuration for one market's order book
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// The market this book serves (e.g., "BTC-USD")
    pub market_id: MarketId,

    /// Value of one price tick in quote units
    pub tick_size: Decimal,

    /// Value of one size lot in base units
    pub lot_size: Decimal,

    /// Orders to pre-allocate room for in the arena
    pub initial_capacity: usize,
}

impl OrderBookConfig {
    /// Create a new configuration with unit tick and lot sizes
    pub fn new(market_id: MarketId) -> Self {
        Self {
            market_id,
            tick_size: Decimal::ONE,
            lot_size: Decimal::ONE,
            initial_capacity: 1024,
        }
    }

    /// Builder method: Set price tick size
    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = tick;
        self
    }

    /// Builder method: Set lot size
    pub fn with_lot_size(mut self, lot: Decimal) -> Self {
        self.lot_size = lot;
        self
    }

    /// Builder method: Set arena pre-allocation
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market_id.as_str().is_empty() {
            return Err(ConfigError::EmptyMarketId);
        }

        if self.tick_size <= Decimal::ZERO {
            return Err(ConfigError::InvalidTickSize(self.tick_size));
        }

        if self.lot_size <= Decimal::ZERO {
            return Err(ConfigError::InvalidLotSize(self.lot_size));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = OrderBookConfig::new(MarketId::new("BTC-USD"));

        assert_eq!(config.market_id.as_str(), "BTC-USD");
        assert_eq!(config.tick_size, Decimal::ONE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OrderBookConfig::new(MarketId::new("ETH-USD"))
            .with_tick_size(Decimal::new(1, 2))
            .with_lot_size(Decimal::new(1, 3))
            .with_initial_capacity(16);

        assert_eq!(config.tick_size, Decimal::new(1, 2));
        assert_eq!(config.lot_size, Decimal::new(1, 3));
        assert_eq!(config.initial_capacity, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let empty = OrderBookConfig::new(MarketId::new(""));
        assert_eq!(empty.validate(), Err(ConfigError::EmptyMarketId));

        let bad_tick = OrderBookConfig::new(MarketId::new("BTC-USD")).with_tick_size(Decimal::ZERO);
        assert!(matches!(
            bad_tick.validate(),
            Err(ConfigError::InvalidTickSize(_))
        ));

        let bad_lot =
            OrderBookConfig::new(MarketId::new("BTC-USD")).with_lot_size(Decimal::new(-1, 0));
        assert!(matches!(bad_lot.validate(), Err(ConfigError::InvalidLotSize(_))));
    }
}
