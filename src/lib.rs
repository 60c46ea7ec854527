//! # Hold'em Table
//!
//! A multiplayer Texas Hold'em table engine.
//!
//! The crate is split into two layers:
//!
//! - [`game`]: the synchronous rules core. A [`game::Table`] runs one
//!   game end to end: seats, blinds, betting rounds with minimum-raise
//!   enforcement, side-pot settlement, and a combinatorial best-of-5
//!   hand evaluator. It is a plain value with no I/O or timing.
//! - [`table`]: the async hosting layer. A [`table::TableActor`] owns
//!   one `Table`, serializes every mutation through a message inbox,
//!   drives the turn and next-hand timers, and fans per-viewer
//!   snapshots out to subscribers. A [`table::TableRegistry`] tracks
//!   the live tables of a process.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::table::{TableActor, TableConfig};
//!
//! # async fn demo() {
//! let handle = TableActor::spawn(1, TableConfig::default());
//! let alice = handle.join("alice".into()).await.unwrap();
//! let snapshot = handle.snapshot(Some(alice)).await.unwrap();
//! # }
//! ```

/// Core game logic: cards, evaluation, seats, the table state machine
/// and pot settlement.
pub mod game;
pub use game::{
    Action, ActionError, Card, Deck, HandCategory, HandEvent, HandRank, JoinError, Phase,
    PlayerId, Suit, Table, TableRules, TableSnapshot, evaluate,
};

/// Async hosting: per-table actors, timers, and the table registry.
pub mod table;
pub use table::{TableConfig, TableHandle, TableRegistry};
