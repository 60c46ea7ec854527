//! Table-wide constants and defaults.

use super::seat::Chips;

/// Default number of seats at a table.
pub const DEFAULT_MAX_SEATS: usize = 6;

/// Hard seat limit. Each hand consumes at most `2 * seats + 5` cards,
/// so 23 seats (51 cards) is the most a 52-card deck can ever support.
pub const ABSOLUTE_MAX_SEATS: usize = 23;

pub const DEFAULT_STARTING_CHIPS: Chips = 1000;
pub const DEFAULT_SMALL_BLIND: Chips = 10;
pub const DEFAULT_BIG_BLIND: Chips = 20;

/// Seconds a seat gets to act before being auto-folded.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;

/// Seconds between hand-over and the next automatic deal.
pub const DEFAULT_NEXT_HAND_DELAY_SECS: u64 = 5;
