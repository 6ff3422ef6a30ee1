// ============================================================================
// Book Module
// Owned order storage and the indexes that address it by handle
// ============================================================================
//
// All orders live in a single OrderArena. PriceLevel, BookSide, OrderIndex
// and ExpiryIndex only hold handles or keys, so every mutation goes through
// the arena and is visible everywhere at once.

mod arena;
mod book_side;
mod expiry_index;
mod order_index;
mod price_level;

pub(crate) use arena::{OrderArena, OrderHandle};
pub(crate) use book_side::BookSide;
pub(crate) use expiry_index::{ExpiryIndex, ExpiryKey};
pub(crate) use order_index::{OrderIndex, OrderLocation};
