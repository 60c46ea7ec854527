//! The table state machine.
//!
//! A [`Table`] runs one game of Texas Hold'em: seats join and leave,
//! hands move through pre-flop, flop, turn, river and showdown, and
//! every chip contributed comes back out through settlement. The table
//! is a plain synchronous value; the actor layer owns one and
//! serializes access to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::cards::{Card, Deck};
use super::constants::{
    ABSOLUTE_MAX_SEATS, DEFAULT_BIG_BLIND, DEFAULT_MAX_SEATS, DEFAULT_SMALL_BLIND,
    DEFAULT_STARTING_CHIPS,
};
use super::eval::{HandCategory, evaluate};
use super::seat::{Chips, PlayerId, Seat, SeatIndex, SeatStatus, Spectator};
use super::settlement::settle;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Waiting,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    HandOver,
}

impl Phase {
    #[must_use]
    pub fn betting(self) -> bool {
        matches!(self, Self::PreFlop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::HandOver => "hand over",
        };
        write!(f, "{repr}")
    }
}

/// A player's move. `Raise.to` is the resulting per-round total, not
/// the increment: facing a 20 bet, `Raise { to: 60 }` puts the player's
/// round commitment at 60. A target beyond the stack is capped at the
/// stack; the raise becomes an all-in shove.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise { to: Chips },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "fold"),
            Self::Check => write!(f, "check"),
            Self::Call => write!(f, "call"),
            Self::Raise { to } => write!(f, "raise to {to}"),
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum JoinError {
    #[error("table is full ({0} seats)")]
    TableFull(usize),
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StartError {
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("need at least 2 funded players, have {0}")]
    NotEnoughPlayers(usize),
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    #[error("no betting round in progress")]
    NoBettingRound,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("not in the current hand")]
    NotInHand,
    #[error("acting out of turn")]
    OutOfTurn,
    #[error("cannot check facing a bet of {0}")]
    CheckFacingBet(Chips),
    #[error("nothing to call; check instead")]
    NothingToCall,
    #[error("raise to {attempted} does not exceed the current bet of {current}")]
    RaiseBelowBet { attempted: Chips, current: Chips },
    #[error("raise to {attempted} is below the minimum of {minimum}")]
    RaiseTooSmall { attempted: Chips, minimum: Chips },
}

/// Game parameters, fixed for the lifetime of a table.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct TableRules {
    pub max_seats: usize,
    pub starting_chips: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            max_seats: DEFAULT_MAX_SEATS,
            starting_chips: DEFAULT_STARTING_CHIPS,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
        }
    }
}

/// Things that happened since the last drain, oldest first.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum HandEvent {
    HandStarted {
        hand_number: u64,
        button: SeatIndex,
    },
    BlindPosted {
        seat: SeatIndex,
        name: String,
        amount: Chips,
        big: bool,
    },
    PlayerActed {
        seat: SeatIndex,
        name: String,
        action: Action,
    },
    StreetDealt {
        phase: Phase,
        cards: Vec<Card>,
    },
    PotAwarded {
        amount: Chips,
        winners: Vec<String>,
        category: Option<HandCategory>,
    },
    HandEnded {
        hand_number: u64,
    },
    HandAborted {
        reason: String,
    },
    Status {
        message: String,
    },
}

/// One seat as a given viewer sees it. `cards` is `None` whenever the
/// hole cards are hidden from that viewer.
#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub round_bet: Chips,
    pub status: SeatStatus,
    pub connected: bool,
    pub cards: Option<Vec<Card>>,
    pub is_button: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub to_act: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct TableSnapshot {
    pub hand_number: u64,
    pub phase: Phase,
    pub community: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise_to: Chips,
    pub seats: Vec<SeatView>,
    pub spectators: usize,
    /// Last table-talk line, mirroring the event stream for clients
    /// that only poll snapshots.
    pub message: String,
}

pub struct Table {
    rules: TableRules,
    seats: Vec<Seat>,
    spectators: Vec<Spectator>,
    deck: Deck,
    community: Vec<Card>,
    phase: Phase,
    button: SeatIndex,
    small_blind_seat: Option<SeatIndex>,
    big_blind_seat: Option<SeatIndex>,
    to_act: Option<SeatIndex>,
    /// Per-round amount every active seat must match.
    current_bet: Chips,
    /// Size of the last bet or raise; the next raise must add at least
    /// this much unless the raiser is all-in.
    last_raise: Chips,
    hand_number: u64,
    /// Hole cards are public once a showdown has happened.
    revealed: bool,
    /// Seats that asked to leave mid-hand; removed when the hand ends.
    departing: Vec<PlayerId>,
    events: Vec<HandEvent>,
    last_status: String,
}

impl Table {
    #[must_use]
    pub fn new(rules: TableRules) -> Self {
        Self {
            rules,
            seats: Vec::new(),
            spectators: Vec::new(),
            deck: Deck::default(),
            community: Vec::new(),
            phase: Phase::Waiting,
            button: 0,
            small_blind_seat: None,
            big_blind_seat: None,
            to_act: None,
            current_bet: 0,
            last_raise: 0,
            hand_number: 0,
            revealed: false,
            departing: Vec::new(),
            events: Vec::new(),
            last_status: String::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    /// The player whose turn it is, if a betting round is open.
    #[must_use]
    pub fn to_act(&self) -> Option<PlayerId> {
        self.to_act.map(|i| self.seats[i].id)
    }

    /// Funded seats, i.e. players a new hand could deal in.
    #[must_use]
    pub fn funded_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.chips > 0).count()
    }

    #[must_use]
    pub fn can_start(&self) -> bool {
        !self.phase.betting() && self.phase != Phase::Showdown && self.funded_seats() >= 2
    }

    pub fn drain_events(&mut self) -> Vec<HandEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- membership -----------------------------------------------

    /// Seat a new player. Mid-hand joins sit out until the next deal.
    pub fn join(&mut self, name: String) -> Result<PlayerId, JoinError> {
        let cap = self.rules.max_seats.min(ABSOLUTE_MAX_SEATS);
        if self.seats.len() >= cap {
            return Err(JoinError::TableFull(cap));
        }
        let seat = Seat::new(name.clone(), self.rules.starting_chips);
        let id = seat.id;
        self.seats.push(seat);
        log::info!("{name} joined with {} chips", self.rules.starting_chips);
        self.status(format!("{name} joined the table"));
        Ok(id)
    }

    /// Add a watcher. Spectators see every hole card and never act.
    pub fn join_spectator(&mut self, name: String) -> PlayerId {
        let spectator = Spectator::new(name.clone());
        let id = spectator.id;
        self.spectators.push(spectator);
        self.status(format!("{name} is watching"));
        id
    }

    /// Mark a participant disconnected. The seat is kept: the turn
    /// timer folds them if their turn comes and they are still gone.
    pub fn disconnect(&mut self, id: PlayerId) {
        if let Some(seat) = self.seats.iter_mut().find(|s| s.id == id) {
            seat.connected = false;
            log::info!("{} disconnected", seat.name);
        } else if let Some(s) = self.spectators.iter_mut().find(|s| s.id == id) {
            s.connected = false;
        }
    }

    /// Re-attach a returning participant. Returns false for ids this
    /// table has never seen.
    pub fn reconnect(&mut self, id: PlayerId) -> bool {
        if let Some(seat) = self.seats.iter_mut().find(|s| s.id == id) {
            seat.connected = true;
            log::info!("{} reconnected", seat.name);
            let name = seat.name.clone();
            self.status(format!("{name} reconnected"));
            true
        } else if let Some(s) = self.spectators.iter_mut().find(|s| s.id == id) {
            s.connected = true;
            true
        } else {
            false
        }
    }

    /// Leave the table for good. Mid-hand the seat is folded and kept
    /// until the hand ends so its chips settle normally; otherwise it
    /// is removed at once.
    pub fn leave(&mut self, id: PlayerId) {
        if let Some(pos) = self.spectators.iter().position(|s| s.id == id) {
            self.spectators.remove(pos);
            return;
        }
        let Some(idx) = self.seats.iter().position(|s| s.id == id) else {
            return;
        };
        if self.phase.betting() && self.seats[idx].in_hand() {
            let name = self.seats[idx].name.clone();
            self.status(format!("{name} left the table"));
            self.seats[idx].connected = false;
            self.departing.push(id);
            if self.seats[idx].status != SeatStatus::Folded {
                let was_turn = self.to_act == Some(idx);
                self.fold_seat(idx);
                self.continue_hand(was_turn.then_some(idx));
            }
        } else {
            let seat = self.seats.remove(idx);
            self.status(format!("{} left the table", seat.name));
            // The removal shifts every later index down one; keep the
            // button on the same player.
            if idx < self.button {
                self.button -= 1;
            }
            if self.button >= self.seats.len() {
                self.button = 0;
            }
        }
    }

    // ---- hand lifecycle -------------------------------------------

    pub fn start_hand(&mut self) -> Result<(), StartError> {
        if self.phase.betting() || self.phase == Phase::Showdown {
            return Err(StartError::HandInProgress);
        }
        let funded = self.funded_seats();
        if funded < 2 {
            return Err(StartError::NotEnoughPlayers(funded));
        }

        self.hand_number += 1;
        self.community.clear();
        self.revealed = false;
        self.deck.reset();
        for seat in &mut self.seats {
            seat.reset_for_hand();
        }

        // The button moves to the next dealt-in seat.
        if let Some(next) = self.next_matching(self.button, |s| s.status == SeatStatus::Active) {
            self.button = next;
        }
        self.events.push(HandEvent::HandStarted {
            hand_number: self.hand_number,
            button: self.button,
        });
        log::info!("hand #{} started, button at {}", self.hand_number, self.button);

        // Blinds. The small blind is the first active seat after the
        // button, so heads-up the button posts the big blind. A short
        // stack posts what it has and is all-in.
        let Some(sb) = self.next_matching(self.button, |s| s.status == SeatStatus::Active) else {
            return self.abort_hand("no small blind seat");
        };
        self.post_blind(sb, self.rules.small_blind, false);
        let Some(bb) = self.next_matching(sb, |s| s.status == SeatStatus::Active) else {
            return self.abort_hand("no big blind seat");
        };
        self.post_blind(bb, self.rules.big_blind, true);
        self.small_blind_seat = Some(sb);
        self.big_blind_seat = Some(bb);
        self.current_bet = self.rules.big_blind;
        self.last_raise = self.rules.big_blind;

        // Two hole cards to every dealt-in seat, including the seats
        // the blinds just put all-in.
        for i in 0..self.seats.len() {
            if self.seats[i].contending() {
                match self.deck.deal(2) {
                    Ok(cards) => self.seats[i].hand = cards,
                    Err(e) => return self.abort_hand(&e.to_string()),
                }
            }
        }

        self.phase = Phase::PreFlop;
        self.status(format!("hand #{} dealt", self.hand_number));

        if self.active_count() >= 2 {
            // Pre-flop action starts after the big blind; the big
            // blind keeps the option because posting is not acting.
            self.to_act = self.next_matching(bb, |s| s.status == SeatStatus::Active);
        } else {
            self.run_out_board();
        }
        Ok(())
    }

    fn post_blind(&mut self, idx: SeatIndex, amount: Chips, big: bool) {
        let paid = self.seats[idx].commit(amount);
        let name = self.seats[idx].name.clone();
        self.events.push(HandEvent::BlindPosted {
            seat: idx,
            name: name.clone(),
            amount: paid,
            big,
        });
        if paid < amount {
            self.status(format!("{name} is all-in for the blind ({paid})"));
        }
    }

    // ---- actions --------------------------------------------------

    pub fn act(&mut self, id: PlayerId, action: Action) -> Result<(), ActionError> {
        if !self.phase.betting() {
            return Err(ActionError::NoBettingRound);
        }
        let idx = self
            .seats
            .iter()
            .position(|s| s.id == id)
            .ok_or(ActionError::UnknownPlayer)?;
        if self.seats[idx].status != SeatStatus::Active {
            return Err(ActionError::NotInHand);
        }
        if self.to_act != Some(idx) {
            return Err(ActionError::OutOfTurn);
        }

        match action {
            Action::Fold => self.fold_seat(idx),
            Action::Check => {
                let due = self.current_bet - self.seats[idx].round_bet;
                if due > 0 {
                    return Err(ActionError::CheckFacingBet(due));
                }
                self.seats[idx].has_acted = true;
                self.announce(idx, action);
            }
            Action::Call => {
                let due = self.current_bet - self.seats[idx].round_bet;
                if due == 0 {
                    return Err(ActionError::NothingToCall);
                }
                self.seats[idx].commit(due);
                self.seats[idx].has_acted = true;
                self.announce(idx, action);
            }
            Action::Raise { to } => {
                if to <= self.current_bet {
                    return Err(ActionError::RaiseBelowBet {
                        attempted: to,
                        current: self.current_bet,
                    });
                }
                let seat = &self.seats[idx];
                let delta = to - seat.round_bet;
                let all_in = delta >= seat.chips;
                let minimum = self.current_bet + self.last_raise;
                if to < minimum && !all_in {
                    return Err(ActionError::RaiseTooSmall {
                        attempted: to,
                        minimum,
                    });
                }
                self.seats[idx].commit(delta);
                let new_bet = self.seats[idx].round_bet;
                self.seats[idx].has_acted = true;
                // A short all-in that fails to top the bet is just a
                // call for less and does not reopen the action.
                if new_bet > self.current_bet {
                    self.last_raise = new_bet - self.current_bet;
                    self.current_bet = new_bet;
                    for (i, seat) in self.seats.iter_mut().enumerate() {
                        if i != idx && seat.status == SeatStatus::Active {
                            seat.has_acted = false;
                        }
                    }
                    self.announce(idx, Action::Raise { to: new_bet });
                } else {
                    self.announce(idx, Action::Call);
                }
            }
        }

        self.continue_hand(Some(idx));
        Ok(())
    }

    /// Fold the seat currently on the clock. The actor layer calls this
    /// when the turn timer fires.
    pub fn timeout_current(&mut self) {
        let Some(idx) = self.to_act else { return };
        let name = self.seats[idx].name.clone();
        self.status(format!("{name} timed out and folds"));
        self.fold_seat(idx);
        self.continue_hand(Some(idx));
    }

    fn fold_seat(&mut self, idx: SeatIndex) {
        self.seats[idx].status = SeatStatus::Folded;
        self.seats[idx].has_acted = true;
        self.seats[idx].hand.clear();
        self.announce(idx, Action::Fold);
    }

    fn announce(&mut self, idx: SeatIndex, action: Action) {
        let name = self.seats[idx].name.clone();
        self.events.push(HandEvent::PlayerActed {
            seat: idx,
            name: name.clone(),
            action,
        });
        self.status(format!("{name}: {action}"));
    }

    // ---- hand progression -----------------------------------------

    /// Decide what happens after a state change: fold-out win, next
    /// street, or pass the turn along. `acted` is the seat whose turn
    /// just resolved; `None` when a seat folded out of turn (leaving),
    /// in which case the clock stays where it is.
    fn continue_hand(&mut self, acted: Option<SeatIndex>) {
        if !self.phase.betting() {
            return;
        }
        let contenders: Vec<SeatIndex> = (0..self.seats.len())
            .filter(|&i| self.seats[i].contending())
            .collect();
        if contenders.len() <= 1 {
            self.finish_by_fold(contenders.first().copied());
            return;
        }
        if self.betting_round_complete() {
            self.advance_street();
        } else if let Some(idx) = acted {
            self.to_act = self.next_matching(idx, |s| s.status == SeatStatus::Active);
        }
    }

    fn betting_round_complete(&self) -> bool {
        self.seats
            .iter()
            .filter(|s| s.status == SeatStatus::Active)
            .all(|s| s.has_acted && s.round_bet == self.current_bet)
    }

    fn active_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.status == SeatStatus::Active)
            .count()
    }

    fn advance_street(&mut self) {
        loop {
            for seat in &mut self.seats {
                seat.reset_for_round();
            }
            self.current_bet = 0;
            self.last_raise = self.rules.big_blind;
            self.to_act = None;

            let (next_phase, count) = match self.phase {
                Phase::PreFlop => (Phase::Flop, 3),
                Phase::Flop => (Phase::Turn, 1),
                Phase::Turn => (Phase::River, 1),
                Phase::River => {
                    self.showdown();
                    return;
                }
                _ => return,
            };
            match self.deck.deal(count) {
                Ok(cards) => {
                    self.community.extend_from_slice(&cards);
                    self.phase = next_phase;
                    self.events.push(HandEvent::StreetDealt {
                        phase: next_phase,
                        cards,
                    });
                }
                Err(e) => {
                    let reason = e.to_string();
                    let _ = self.abort_hand(&reason);
                    return;
                }
            }

            if self.active_count() >= 2 {
                // Post-flop action starts with the first active seat
                // after the button.
                self.to_act = self.next_matching(self.button, |s| s.status == SeatStatus::Active);
                return;
            }
            // Everyone (or all but one) is all-in: no betting, keep
            // dealing until the board is complete.
        }
    }

    /// Deal the remaining streets with no betting rounds.
    fn run_out_board(&mut self) {
        self.status("all-in, running out the board".into());
        self.advance_street();
    }

    fn showdown(&mut self) {
        self.phase = Phase::Showdown;
        self.revealed = true;

        let contributions: Vec<Chips> =
            self.seats.iter().map(|s| s.hand_contribution).collect();
        let mut ranks = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            if !seat.contending() {
                ranks.push(None);
                continue;
            }
            match evaluate(&seat.hand, &self.community) {
                Ok(rank) => ranks.push(Some(rank)),
                Err(e) => {
                    let reason = e.to_string();
                    let _ = self.abort_hand(&reason);
                    return;
                }
            }
        }

        let settlement = settle(&contributions, &ranks, self.button);
        for award in &settlement.awards {
            let names: Vec<String> = award
                .winners
                .iter()
                .map(|&w| self.seats[w].name.clone())
                .collect();
            let category = award
                .winners
                .first()
                .and_then(|&w| ranks[w].as_ref())
                .map(|r| r.category);
            self.events.push(HandEvent::PotAwarded {
                amount: award.amount,
                winners: names.clone(),
                category,
            });
            if let Some(category) = category {
                self.status(format!(
                    "{} win(s) {} with {}",
                    names.join(", "),
                    award.amount,
                    category
                ));
            }
        }
        for (i, paid) in settlement.payouts.iter().enumerate() {
            self.seats[i].chips += paid;
        }
        self.finish_hand();
    }

    /// End the hand without a showdown: everyone else folded.
    fn finish_by_fold(&mut self, winner: Option<SeatIndex>) {
        let pot: Chips = self.seats.iter().map(|s| s.hand_contribution).sum();
        if let Some(idx) = winner {
            self.seats[idx].chips += pot;
            let name = self.seats[idx].name.clone();
            self.events.push(HandEvent::PotAwarded {
                amount: pot,
                winners: vec![name.clone()],
                category: None,
            });
            self.status(format!("{name} wins {pot}, everyone else folded"));
        }
        self.finish_hand();
    }

    fn finish_hand(&mut self) {
        self.phase = Phase::HandOver;
        self.to_act = None;
        self.small_blind_seat = None;
        self.big_blind_seat = None;
        self.current_bet = 0;
        // Settlement has paid everything out; the pot is empty now.
        // Busted seats sit out immediately.
        for seat in &mut self.seats {
            seat.round_bet = 0;
            seat.hand_contribution = 0;
            if seat.in_hand() && seat.chips == 0 {
                seat.status = SeatStatus::SittingOut;
                self.events.push(HandEvent::Status {
                    message: format!("{} is out of chips", seat.name),
                });
            }
        }
        self.events.push(HandEvent::HandEnded {
            hand_number: self.hand_number,
        });
        log::info!("hand #{} ended", self.hand_number);

        let departing = std::mem::take(&mut self.departing);
        let removed_before_button = self
            .seats
            .iter()
            .take(self.button)
            .filter(|s| departing.contains(&s.id))
            .count();
        self.seats.retain(|s| !departing.contains(&s.id));
        // Removals shift indices; keep the button on the same player.
        self.button -= removed_before_button;
        if self.button >= self.seats.len() {
            self.button = 0;
        }
    }

    /// Unwind a structurally broken hand: refund every contribution
    /// and fall back to the lobby. Never a user-visible error.
    fn abort_hand(&mut self, reason: &str) -> Result<(), StartError> {
        log::error!("hand #{} aborted: {reason}", self.hand_number);
        for seat in &mut self.seats {
            seat.chips += seat.hand_contribution;
            seat.hand_contribution = 0;
            seat.round_bet = 0;
            seat.hand.clear();
        }
        self.community.clear();
        self.to_act = None;
        self.small_blind_seat = None;
        self.big_blind_seat = None;
        self.current_bet = 0;
        self.phase = Phase::Waiting;
        self.events.push(HandEvent::HandAborted {
            reason: reason.to_string(),
        });
        Ok(())
    }

    // ---- views ----------------------------------------------------

    /// Project the table as `viewer` is allowed to see it. Spectators
    /// see every hole card; players see their own, plus everyone
    /// still contending once a showdown has revealed them. `None`
    /// renders the fully public view.
    #[must_use]
    pub fn snapshot(&self, viewer: Option<PlayerId>) -> TableSnapshot {
        let spectating = viewer
            .map(|id| self.spectators.iter().any(|s| s.id == id))
            .unwrap_or(false);
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let visible = !seat.hand.is_empty()
                    && (spectating
                        || viewer == Some(seat.id)
                        || (self.revealed && seat.contending()));
                SeatView {
                    id: seat.id,
                    name: seat.name.clone(),
                    chips: seat.chips,
                    round_bet: seat.round_bet,
                    status: seat.status,
                    connected: seat.connected,
                    cards: visible.then(|| seat.hand.clone()),
                    is_button: i == self.button,
                    is_small_blind: self.small_blind_seat == Some(i),
                    is_big_blind: self.big_blind_seat == Some(i),
                    to_act: self.to_act == Some(i),
                }
            })
            .collect();
        TableSnapshot {
            hand_number: self.hand_number,
            phase: self.phase,
            community: self.community.clone(),
            pot: self.seats.iter().map(|s| s.hand_contribution).sum(),
            current_bet: self.current_bet,
            min_raise_to: self.current_bet + self.last_raise,
            seats,
            spectators: self.spectators.len(),
            message: self.last_status.clone(),
        }
    }

    // ---- helpers --------------------------------------------------

    /// First seat after `from` (wrapping, `from` itself last) matching
    /// the predicate.
    fn next_matching<F>(&self, from: SeatIndex, pred: F) -> Option<SeatIndex>
    where
        F: Fn(&Seat) -> bool,
    {
        let n = self.seats.len();
        if n == 0 {
            return None;
        }
        (1..=n).map(|step| (from + step) % n).find(|&i| pred(&self.seats[i]))
    }

    fn status(&mut self, message: String) {
        self.last_status = message.clone();
        self.events.push(HandEvent::Status { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(names: &[&str]) -> (Table, Vec<PlayerId>) {
        let mut table = Table::new(TableRules::default());
        let ids = names
            .iter()
            .map(|n| table.join((*n).to_string()).unwrap())
            .collect();
        (table, ids)
    }

    /// Stack chips plus pot chips, the quantity every hand conserves.
    fn chips_in_play(table: &Table) -> Chips {
        let snap = table.snapshot(None);
        snap.seats.iter().map(|s| s.chips).sum::<Chips>() + snap.pot
    }

    /// Drive the current hand to completion by calling/checking.
    fn call_down(table: &mut Table) {
        let mut guard = 0;
        while table.phase().betting() {
            let id = table.to_act().unwrap();
            if table.act(id, Action::Call).is_err() {
                table.act(id, Action::Check).unwrap();
            }
            guard += 1;
            assert!(guard < 100, "hand did not terminate");
        }
    }

    #[test]
    fn test_start_requires_two_funded_players() {
        let (mut table, _) = table_with(&["alice"]);
        assert_eq!(
            table.start_hand(),
            Err(StartError::NotEnoughPlayers(1))
        );
    }

    #[test]
    fn test_blinds_are_posted_and_first_to_act_follows_big_blind() {
        let (mut table, _) = table_with(&["a", "b", "c", "d"]);
        table.start_hand().unwrap();
        let snap = table.snapshot(None);
        assert_eq!(snap.phase, Phase::PreFlop);
        assert_eq!(snap.pot, 30);
        assert_eq!(snap.current_bet, 20);

        let button = snap.seats.iter().position(|s| s.is_button).unwrap();
        let n = snap.seats.len();
        assert_eq!(snap.seats[(button + 1) % n].round_bet, 10);
        assert!(snap.seats[(button + 1) % n].is_small_blind);
        assert_eq!(snap.seats[(button + 2) % n].round_bet, 20);
        assert!(snap.seats[(button + 2) % n].is_big_blind);
        let to_act = snap.seats.iter().position(|s| s.to_act).unwrap();
        assert_eq!(to_act, (button + 3) % n);
    }

    #[test]
    fn test_heads_up_button_posts_big_blind() {
        let (mut table, _) = table_with(&["a", "b"]);
        table.start_hand().unwrap();
        let snap = table.snapshot(None);
        let button = snap.seats.iter().position(|s| s.is_button).unwrap();
        assert_eq!(snap.seats[button].round_bet, 20);
        assert_eq!(snap.seats[1 - button].round_bet, 10);
        // The small blind acts first with two players.
        assert!(snap.seats[1 - button].to_act);
    }

    #[test]
    fn test_out_of_turn_is_rejected() {
        let (mut table, ids) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let turn = table.to_act().unwrap();
        let other = ids.iter().copied().find(|&id| id != turn).unwrap();
        assert_eq!(table.act(other, Action::Call), Err(ActionError::OutOfTurn));
    }

    #[test]
    fn test_check_facing_bet_is_rejected() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let turn = table.to_act().unwrap();
        assert_eq!(
            table.act(turn, Action::Check),
            Err(ActionError::CheckFacingBet(20))
        );
    }

    #[test]
    fn test_minimum_raise_is_enforced() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let turn = table.to_act().unwrap();
        // Facing the 20 big blind, the minimum raise is to 40.
        assert_eq!(
            table.act(turn, Action::Raise { to: 30 }),
            Err(ActionError::RaiseTooSmall {
                attempted: 30,
                minimum: 40
            })
        );
        table.act(turn, Action::Raise { to: 40 }).unwrap();
        let snap = table.snapshot(None);
        assert_eq!(snap.current_bet, 40);
        assert_eq!(snap.min_raise_to, 60);
    }

    #[test]
    fn test_call_with_nothing_due_is_rejected() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        // Limp around to the big blind.
        for _ in 0..2 {
            let turn = table.to_act().unwrap();
            table.act(turn, Action::Call).unwrap();
        }
        let bb = table.to_act().unwrap();
        assert_eq!(table.act(bb, Action::Call), Err(ActionError::NothingToCall));
        table.act(bb, Action::Check).unwrap();
        assert_eq!(table.phase(), Phase::Flop);
    }

    #[test]
    fn test_raise_beyond_stack_is_capped_at_all_in() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let turn = table.to_act().unwrap();
        table.act(turn, Action::Raise { to: 5000 }).unwrap();
        let snap = table.snapshot(None);
        assert_eq!(snap.current_bet, 1000);
        let shover = snap.seats.iter().find(|s| s.id == turn).unwrap();
        assert_eq!(shover.chips, 0);
        assert_eq!(shover.round_bet, 1000);
        assert_eq!(shover.status, SeatStatus::AllIn);
    }

    #[test]
    fn test_raise_reopens_action() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let first = table.to_act().unwrap();
        table.act(first, Action::Call).unwrap();
        let second = table.to_act().unwrap();
        table.act(second, Action::Raise { to: 60 }).unwrap();
        // The original caller gets to act again.
        assert_eq!(table.phase(), Phase::PreFlop);
        let mut reached_first_again = false;
        for _ in 0..3 {
            let turn = table.to_act().unwrap();
            if turn == first {
                reached_first_again = true;
                break;
            }
            table.act(turn, Action::Call).unwrap();
        }
        assert!(reached_first_again);
    }

    #[test]
    fn test_everyone_folding_awards_pot_without_showdown() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let before = chips_in_play(&table);
        while table.phase().betting() {
            let turn = table.to_act().unwrap();
            table.act(turn, Action::Fold).unwrap();
        }
        assert_eq!(table.phase(), Phase::HandOver);
        assert_eq!(chips_in_play(&table), before);
        // No showdown, so no cards are revealed in the public view.
        let snap = table.snapshot(None);
        assert!(snap.seats.iter().all(|s| s.cards.is_none()));
        let events = table.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            HandEvent::PotAwarded { category: None, .. }
        )));
    }

    #[test]
    fn test_called_down_hand_reaches_showdown_and_conserves_chips() {
        let (mut table, _) = table_with(&["a", "b", "c", "d"]);
        let before = chips_in_play(&table);
        table.start_hand().unwrap();
        call_down(&mut table);
        assert_eq!(table.phase(), Phase::HandOver);
        let snap = table.snapshot(None);
        assert_eq!(snap.community.len(), 5);
        assert_eq!(chips_in_play(&table), before);
        // Showdown reveals the contenders' cards to everyone.
        assert!(snap.seats.iter().any(|s| s.cards.is_some()));
    }

    #[test]
    fn test_hole_cards_hidden_from_other_players() {
        let (mut table, ids) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let snap = table.snapshot(Some(ids[0]));
        for view in &snap.seats {
            if view.id == ids[0] {
                assert_eq!(view.cards.as_ref().map(Vec::len), Some(2));
            } else {
                assert!(view.cards.is_none());
            }
        }
    }

    #[test]
    fn test_spectator_sees_every_hand() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        let watcher = table.join_spectator("watcher".into());
        table.start_hand().unwrap();
        let snap = table.snapshot(Some(watcher));
        assert_eq!(snap.spectators, 1);
        assert!(
            snap.seats
                .iter()
                .filter(|s| s.status == SeatStatus::Active)
                .all(|s| s.cards.as_ref().map(Vec::len) == Some(2))
        );
    }

    #[test]
    fn test_join_mid_hand_sits_out() {
        let (mut table, _) = table_with(&["a", "b"]);
        table.start_hand().unwrap();
        let late = table.join("late".into()).unwrap();
        let snap = table.snapshot(Some(late));
        let view = snap.seats.iter().find(|s| s.id == late).unwrap();
        assert_eq!(view.status, SeatStatus::SittingOut);
        assert!(view.cards.is_none());
    }

    #[test]
    fn test_leave_mid_hand_folds_and_removes_after() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let leaver = table.to_act().unwrap();
        table.leave(leaver);
        assert_eq!(table.snapshot(None).seats.len(), 3);
        call_down(&mut table);
        assert_eq!(table.phase(), Phase::HandOver);
        assert!(!table.snapshot(None).seats.iter().any(|s| s.id == leaver));
    }

    #[test]
    fn test_leave_between_hands_removes_seat() {
        let (mut table, ids) = table_with(&["a", "b", "c"]);
        table.leave(ids[1]);
        assert_eq!(table.snapshot(None).seats.len(), 2);
    }

    #[test]
    fn test_disconnect_keeps_seat_and_reconnect_restores() {
        let (mut table, ids) = table_with(&["a", "b"]);
        table.disconnect(ids[0]);
        let snap = table.snapshot(None);
        assert!(!snap.seats[0].connected);
        assert!(table.reconnect(ids[0]));
        assert!(table.snapshot(None).seats[0].connected);
        assert!(!table.reconnect(PlayerId::new_v4()));
    }

    #[test]
    fn test_timeout_folds_current_player() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let turn = table.to_act().unwrap();
        table.timeout_current();
        assert_ne!(table.to_act(), Some(turn));
        let snap = table.snapshot(None);
        let folded = snap.seats.iter().find(|s| s.id == turn).unwrap();
        assert_eq!(folded.status, SeatStatus::Folded);
    }

    #[test]
    fn test_all_in_runs_out_the_board() {
        let (mut table, _) = table_with(&["a", "b"]);
        let before = chips_in_play(&table);
        table.start_hand().unwrap();
        let first = table.to_act().unwrap();
        table.act(first, Action::Raise { to: 1000 }).unwrap();
        let second = table.to_act().unwrap();
        table.act(second, Action::Call).unwrap();
        // Both all-in: the board runs out with no further action.
        assert_eq!(table.phase(), Phase::HandOver);
        assert_eq!(table.snapshot(None).community.len(), 5);
        assert_eq!(chips_in_play(&table), before);
    }

    #[test]
    fn test_busted_player_sits_out_next_hand() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        // Shove every stack in.
        while table.phase().betting() {
            let turn = table.to_act().unwrap();
            if table.act(turn, Action::Raise { to: 1000 }).is_err() {
                table.act(turn, Action::Call).unwrap();
            }
        }
        assert_eq!(table.phase(), Phase::HandOver);
        if table.funded_seats() >= 2 {
            table.start_hand().unwrap();
            let snap = table.snapshot(None);
            for view in &snap.seats {
                if view.chips == 0 && view.round_bet == 0 {
                    assert_eq!(view.status, SeatStatus::SittingOut);
                }
            }
        }
    }

    #[test]
    fn test_busted_seat_shows_sitting_out_at_hand_over() {
        let (mut table, _) = table_with(&["a", "b"]);
        table.start_hand().unwrap();
        let first = table.to_act().unwrap();
        table.act(first, Action::Raise { to: 1000 }).unwrap();
        let second = table.to_act().unwrap();
        table.act(second, Action::Call).unwrap();
        assert_eq!(table.phase(), Phase::HandOver);
        // A split pot can keep both stacks alive; a busted seat must
        // already read as sitting out, not wait for the next deal.
        let snap = table.snapshot(None);
        for view in &snap.seats {
            if view.chips == 0 {
                assert_eq!(view.status, SeatStatus::SittingOut);
            }
        }
    }

    #[test]
    fn test_button_keeps_its_player_when_an_earlier_seat_leaves() {
        let (mut table, ids) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let snap = table.snapshot(None);
        let button_id = snap.seats.iter().find(|s| s.is_button).unwrap().id;
        call_down(&mut table);

        // The first seat sits before the button; removing it shifts
        // every later index down one.
        assert_ne!(button_id, ids[0]);
        table.leave(ids[0]);
        let snap = table.snapshot(None);
        assert_eq!(
            snap.seats.iter().find(|s| s.is_button).unwrap().id,
            button_id
        );

        // Rotation carries on from the same player.
        table.start_hand().unwrap();
        let snap = table.snapshot(None);
        assert_eq!(snap.seats.iter().find(|s| s.is_button).unwrap().id, ids[2]);
    }

    #[test]
    fn test_mid_hand_departure_before_the_button_does_not_shift_it() {
        let (mut table, ids) = table_with(&["a", "b", "c", "d"]);
        table.start_hand().unwrap();
        let button_id = table
            .snapshot(None)
            .seats
            .iter()
            .find(|s| s.is_button)
            .unwrap()
            .id;
        // First to act sits at the first index, before the button.
        let leaver = table.to_act().unwrap();
        assert_eq!(leaver, ids[0]);
        table.leave(leaver);
        call_down(&mut table);
        assert_eq!(table.phase(), Phase::HandOver);

        let snap = table.snapshot(None);
        assert!(!snap.seats.iter().any(|s| s.id == leaver));
        assert_eq!(
            snap.seats.iter().find(|s| s.is_button).unwrap().id,
            button_id
        );
    }

    #[test]
    fn test_table_full() {
        let mut table = Table::new(TableRules {
            max_seats: 2,
            ..TableRules::default()
        });
        table.join("a".into()).unwrap();
        table.join("b".into()).unwrap();
        assert_eq!(table.join("c".into()), Err(JoinError::TableFull(2)));
    }

    #[test]
    fn test_events_are_drained_once() {
        let (mut table, _) = table_with(&["a", "b"]);
        table.start_hand().unwrap();
        let events = table.drain_events();
        assert!(!events.is_empty());
        assert!(table.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_and_events_serialize_to_json() {
        let (mut table, _) = table_with(&["a", "b"]);
        table.start_hand().unwrap();
        let json = serde_json::to_string(&table.snapshot(None)).unwrap();
        assert!(json.contains("\"pre-flop\""));
        let json = serde_json::to_string(&table.drain_events()).unwrap();
        assert!(json.contains("hand_started"));
    }

    #[test]
    fn test_button_rotates_between_hands() {
        let (mut table, _) = table_with(&["a", "b", "c"]);
        table.start_hand().unwrap();
        let first_button = table
            .snapshot(None)
            .seats
            .iter()
            .position(|s| s.is_button)
            .unwrap();
        call_down(&mut table);
        table.start_hand().unwrap();
        let second_button = table
            .snapshot(None)
            .seats
            .iter()
            .position(|s| s.is_button)
            .unwrap();
        assert_ne!(first_button, second_button);
    }
}
