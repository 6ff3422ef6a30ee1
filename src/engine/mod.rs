// ============================================================================
// Engine Module
// Contains the order book and its matching logic
// ============================================================================

mod errors;
mod order_book;
mod price_time;

pub mod factory;

pub use errors::{AmendRejection, BookError};
pub use factory::{create_from_config, OrderBookBuilder};
pub use order_book::OrderBook;
