//! Core Texas Hold'em logic.
//!
//! Everything in here is synchronous and deterministic apart from the
//! deck shuffle: the async hosting layer lives in [`crate::table`].

pub mod cards;
pub mod constants;
pub mod engine;
pub mod eval;
pub mod seat;
pub mod settlement;

pub use cards::{Card, Deck, DeckError, Suit, Value};
pub use engine::{
    Action, ActionError, HandEvent, JoinError, Phase, SeatView, StartError, Table, TableRules,
    TableSnapshot,
};
pub use eval::{EvalError, HandCategory, HandRank, classify_five, evaluate};
pub use seat::{Chips, PlayerId, Seat, SeatIndex, SeatStatus, Spectator};
pub use settlement::{PotAward, PotSlice, Settlement, build_pot_slices, settle};
