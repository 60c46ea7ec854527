//! Per-seat participant records.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::cards::Card;

pub type Chips = u32;
pub type SeatIndex = usize;

/// Stable identity a client keeps across disconnects. Issued once at
/// first join; presenting the same id re-attaches to the same seat.
pub type PlayerId = Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeatStatus {
    /// Dealt in and still able to act.
    Active,
    /// Out of the current hand.
    Folded,
    /// Committed the whole stack; stays in the hand without acting.
    AllIn,
    /// Seated but not dealt in (joined mid-hand, or busted).
    SittingOut,
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::SittingOut => "sitting out",
        };
        write!(f, "{repr}")
    }
}

/// One occupied seat. Holds the private state (hole cards, stack,
/// per-round and per-hand chip commitments); public projections are
/// built by the snapshot layer.
#[derive(Clone, Debug)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub hand: Vec<Card>,
    /// Chips committed in the current betting round.
    pub round_bet: Chips,
    /// Chips committed over the whole hand. Side pots are built from
    /// these totals, folded seats included.
    pub hand_contribution: Chips,
    pub status: SeatStatus,
    pub has_acted: bool,
    pub connected: bool,
}

impl Seat {
    pub fn new(name: String, chips: Chips) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            chips,
            hand: Vec::with_capacity(2),
            round_bet: 0,
            hand_contribution: 0,
            status: SeatStatus::SittingOut,
            has_acted: false,
            connected: true,
        }
    }

    /// Prepare the seat for a new hand. A broke seat sits out.
    pub fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.round_bet = 0;
        self.hand_contribution = 0;
        self.has_acted = false;
        self.status = if self.chips > 0 {
            SeatStatus::Active
        } else {
            SeatStatus::SittingOut
        };
    }

    /// Start a fresh betting round.
    pub fn reset_for_round(&mut self) {
        self.round_bet = 0;
        self.has_acted = false;
    }

    /// Move up to `amount` chips from the stack into the current round.
    /// Returns the amount actually committed; emptying the stack flips
    /// the seat all-in.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.round_bet += paid;
        self.hand_contribution += paid;
        if self.chips == 0 && self.status == SeatStatus::Active {
            self.status = SeatStatus::AllIn;
        }
        paid
    }

    /// Dealt into the current hand (folded seats still count: their
    /// chips stay in the pot).
    #[must_use]
    pub fn in_hand(&self) -> bool {
        matches!(
            self.status,
            SeatStatus::Active | SeatStatus::AllIn | SeatStatus::Folded
        )
    }

    /// Still eligible to win the pot.
    #[must_use]
    pub fn contending(&self) -> bool {
        matches!(self.status, SeatStatus::Active | SeatStatus::AllIn)
    }
}

/// A watcher. Spectators receive every snapshot with all hole cards
/// visible and never hold chips or act.
#[derive(Clone, Debug)]
pub struct Spectator {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
}

impl Spectator {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            connected: true,
        }
    }
}
