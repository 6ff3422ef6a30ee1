// ============================================================================
// Numeric Module
// Integer tick/lot arithmetic for deterministic matching
// ============================================================================
//
// This module provides:
// - Price: limit price in integer tick units
// - Quantity: order size in integer lot units
// - NumericError: Error types for checked arithmetic
//
// Design principles:
// - No floating-point operations
// - All fallible arithmetic returns Result (no panics)
// - Conversion to human units goes through rust_decimal at the edges only

mod errors;
mod ticks;

pub use errors::{NumericError, NumericResult};
pub use ticks::{Price, Quantity};
