// ============================================================================
// Book Errors
// ============================================================================

use std::fmt;
use thiserror::Error;

use crate::domain::{LogicalTime, MarketId, OrderId, OrderStatus, PartyId};

/// Why an amendment was refused. The book is left untouched in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmendRejection {
    #[error("party does not own the order")]
    PartyMismatch,

    #[error("price changes require cancel and replace")]
    PriceChange,

    #[error("size must be strictly less than the resting size")]
    SizeNotReduced,

    #[error("size must be greater than zero")]
    ZeroSize,

    #[error("expiry must be after the current logical time")]
    ExpiryNotInFuture,

    #[error("resting orders may only be good-till-cancel or good-till-time")]
    TimeInForceNotRestable,

    #[error("amendment changes nothing")]
    NothingToAmend,
}

/// Errors surfaced by book operations.
///
/// Everything except `Corrupted` and `BookHalted` is a per-command
/// validation failure that leaves the book unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },

    #[error("party {party_id} does not own order {order_id}")]
    PartyMismatch { order_id: OrderId, party_id: PartyId },

    #[error("invalid price for order {order_id}")]
    InvalidPrice { order_id: OrderId },

    #[error("invalid size for order {order_id}")]
    InvalidSize { order_id: OrderId },

    #[error("order {order_id} expiry {expiry} is not after {now}")]
    InvalidExpiry {
        order_id: OrderId,
        expiry: LogicalTime,
        now: LogicalTime,
    },

    #[error("time in force not allowed for order {order_id}")]
    InvalidTimeInForce { order_id: OrderId },

    #[error("amend of order {order_id} rejected: {reason}")]
    AmendRejected {
        order_id: OrderId,
        reason: AmendRejection,
    },

    #[error("order {order_id} is {status:?}, expected Pending")]
    InvalidOrderState {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error("order {order_id} is already in the book")]
    DuplicateOrderId { order_id: OrderId },

    #[error("order for market {actual} sent to book {expected}")]
    MarketMismatch { expected: MarketId, actual: MarketId },

    #[error("book {market_id} is halted after an invariant violation")]
    BookHalted { market_id: MarketId },

    #[error("book invariant violated: {detail}")]
    Corrupted { detail: String },
}

impl BookError {
    pub(crate) fn corrupted(detail: impl fmt::Display) -> Self {
        BookError::Corrupted {
            detail: detail.to_string(),
        }
    }

    /// Whether the book can no longer process commands.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BookError::Corrupted { .. } | BookError::BookHalted { .. }
        )
    }
}
