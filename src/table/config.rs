//! Table configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::game::TableRules;
use crate::game::constants::{
    ABSOLUTE_MAX_SEATS, DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_BIG_BLIND, DEFAULT_MAX_SEATS,
    DEFAULT_NEXT_HAND_DELAY_SECS, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_CHIPS,
};
use crate::game::seat::Chips;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableConfig {
    /// Display name.
    pub name: String,

    /// Seats at the table.
    pub max_seats: usize,

    /// Stack every new player sits down with.
    pub starting_chips: Chips,

    pub small_blind: Chips,
    pub big_blind: Chips,

    /// How long a seat may hold the action before being auto-folded.
    pub action_timeout: Duration,

    /// Pause between one hand ending and the next being dealt.
    pub next_hand_delay: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "table".to_string(),
            max_seats: DEFAULT_MAX_SEATS,
            starting_chips: DEFAULT_STARTING_CHIPS,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            action_timeout: Duration::from_secs(DEFAULT_ACTION_TIMEOUT_SECS),
            next_hand_delay: Duration::from_secs(DEFAULT_NEXT_HAND_DELAY_SECS),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("big blind must be greater than small blind")]
    BlindOrder,
    #[error("max seats must be between 2 and {ABSOLUTE_MAX_SEATS}")]
    SeatRange,
    #[error("starting chips must cover the big blind")]
    StackBelowBigBlind,
    #[error("action timeout must be non-zero")]
    ZeroActionTimeout,
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.big_blind <= self.small_blind {
            return Err(ConfigError::BlindOrder);
        }
        if self.max_seats < 2 || self.max_seats > ABSOLUTE_MAX_SEATS {
            return Err(ConfigError::SeatRange);
        }
        if self.starting_chips < self.big_blind {
            return Err(ConfigError::StackBelowBigBlind);
        }
        if self.action_timeout.is_zero() {
            return Err(ConfigError::ZeroActionTimeout);
        }
        Ok(())
    }

    /// The game-rules subset the engine cares about.
    #[must_use]
    pub fn rules(&self) -> TableRules {
        TableRules {
            max_seats: self.max_seats,
            starting_chips: self.starting_chips,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
        }
    }
}
