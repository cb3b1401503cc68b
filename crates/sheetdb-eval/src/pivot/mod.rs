//! Pivot subtotal support: a mergeable statistics accumulator and the
//! subtotal kinds a pivot driver resolves per cell.

pub mod stats;
pub mod subtotal;

pub use stats::{FinalizedStats, StreamingStats, accumulate_parallel};
pub use subtotal::SubtotalKind;
