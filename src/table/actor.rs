//! Per-table actor.
//!
//! One [`TableActor`] owns one [`Table`] and serializes every mutation
//! through its inbox, so the rules core never needs a lock. Turn and
//! next-hand deadlines are spawned sleep tasks that send a timer
//! message back into the same inbox; each carries the generation it was
//! armed for, and a message whose generation no longer matches is
//! ignored. Any accepted mutation bumps the generation and re-arms, so
//! a player action always beats a concurrently-firing timeout.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::config::TableConfig;
use super::messages::{TableCommand, TableUpdate};
use crate::game::{
    Action, ActionError, JoinError, PlayerId, StartError, Table, TableSnapshot,
};
use thiserror::Error;

pub type TableId = u64;

const INBOX_CAPACITY: usize = 100;
const SUBSCRIBER_CAPACITY: usize = 64;

/// Errors surfaced through a [`TableHandle`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TableError {
    /// The actor is gone; the handle is useless now.
    #[error("table is closed")]
    Closed,
    #[error(transparent)]
    Join(#[from] JoinError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Start(#[from] StartError),
}

/// Cheap, cloneable handle for talking to a running table.
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableCommand>,
    table_id: TableId,
}

impl TableHandle {
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    async fn request<T>(
        &self,
        command: TableCommand,
        receiver: oneshot::Receiver<T>,
    ) -> Result<T, TableError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| TableError::Closed)?;
        receiver.await.map_err(|_| TableError::Closed)
    }

    pub async fn join(&self, name: String) -> Result<PlayerId, TableError> {
        let (response, receiver) = oneshot::channel();
        let result = self.request(TableCommand::Join { name, response }, receiver);
        Ok(result.await??)
    }

    pub async fn spectate(&self, name: String) -> Result<PlayerId, TableError> {
        let (response, receiver) = oneshot::channel();
        self.request(TableCommand::Spectate { name, response }, receiver)
            .await
    }

    pub async fn leave(&self, id: PlayerId) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Leave { id })
            .await
            .map_err(|_| TableError::Closed)
    }

    pub async fn disconnect(&self, id: PlayerId) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Disconnect { id })
            .await
            .map_err(|_| TableError::Closed)
    }

    /// Re-attach a returning participant. `false` means the table has
    /// never seen this id.
    pub async fn reconnect(&self, id: PlayerId) -> Result<bool, TableError> {
        let (response, receiver) = oneshot::channel();
        self.request(TableCommand::Reconnect { id, response }, receiver)
            .await
    }

    pub async fn act(&self, id: PlayerId, action: Action) -> Result<(), TableError> {
        let (response, receiver) = oneshot::channel();
        let result = self.request(TableCommand::Act { id, action, response }, receiver);
        Ok(result.await??)
    }

    /// Deal a hand right away instead of waiting for the delay timer.
    pub async fn start_hand(&self) -> Result<(), TableError> {
        let (response, receiver) = oneshot::channel();
        let result = self.request(TableCommand::StartHand { response }, receiver);
        Ok(result.await??)
    }

    pub async fn snapshot(&self, viewer: Option<PlayerId>) -> Result<TableSnapshot, TableError> {
        let (response, receiver) = oneshot::channel();
        self.request(TableCommand::Snapshot { viewer, response }, receiver)
            .await
    }

    /// Stream updates for `id`. Snapshots arrive already masked for
    /// that viewer.
    pub async fn subscribe(&self, id: PlayerId) -> Result<mpsc::Receiver<TableUpdate>, TableError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.sender
            .send(TableCommand::Subscribe { id, sender })
            .await
            .map_err(|_| TableError::Closed)?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, id: PlayerId) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Unsubscribe { id })
            .await
            .map_err(|_| TableError::Closed)
    }

    pub async fn close(&self) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Close)
            .await
            .map_err(|_| TableError::Closed)
    }
}

pub struct TableActor {
    id: TableId,
    config: TableConfig,
    table: Table,
    inbox: mpsc::Receiver<TableCommand>,
    /// Loops back into the inbox from timer tasks.
    sender: mpsc::Sender<TableCommand>,
    /// Bumped on every accepted mutation; timer messages armed for an
    /// older generation are stale and ignored.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    subscribers: HashMap<PlayerId, mpsc::Sender<TableUpdate>>,
    closed: bool,
}

impl TableActor {
    #[must_use]
    pub fn new(id: TableId, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let table = Table::new(config.rules());
        let actor = Self {
            id,
            config,
            table,
            inbox,
            sender: sender.clone(),
            generation: 0,
            timer: None,
            subscribers: HashMap::new(),
            closed: false,
        };
        let handle = TableHandle {
            sender,
            table_id: id,
        };
        (actor, handle)
    }

    /// Create the actor and run it on a fresh task.
    #[must_use]
    pub fn spawn(id: TableId, config: TableConfig) -> TableHandle {
        let (actor, handle) = Self::new(id, config);
        tokio::spawn(actor.run());
        handle
    }

    pub async fn run(mut self) {
        log::info!("table {} '{}' starting", self.id, self.config.name);

        while let Some(command) = self.inbox.recv().await {
            let mutated = self.handle_command(command);
            if self.closed {
                break;
            }
            if mutated {
                self.broadcast();
                self.rearm_timer();
            }
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        log::info!("table {} '{}' closed", self.id, self.config.name);
    }

    /// Apply one command. Returns whether table state may have changed.
    fn handle_command(&mut self, command: TableCommand) -> bool {
        match command {
            TableCommand::Join { name, response } => {
                let result = self.table.join(name);
                let mutated = result.is_ok();
                let _ = response.send(result);
                mutated
            }
            TableCommand::Spectate { name, response } => {
                let id = self.table.join_spectator(name);
                let _ = response.send(id);
                true
            }
            TableCommand::Leave { id } => {
                self.table.leave(id);
                self.subscribers.remove(&id);
                true
            }
            TableCommand::Disconnect { id } => {
                self.table.disconnect(id);
                true
            }
            TableCommand::Reconnect { id, response } => {
                let known = self.table.reconnect(id);
                let _ = response.send(known);
                known
            }
            TableCommand::Act { id, action, response } => {
                let result = self.table.act(id, action);
                let mutated = result.is_ok();
                let _ = response.send(result);
                mutated
            }
            TableCommand::StartHand { response } => {
                let result = self.table.start_hand();
                let mutated = result.is_ok();
                let _ = response.send(result);
                mutated
            }
            TableCommand::Snapshot { viewer, response } => {
                let _ = response.send(self.table.snapshot(viewer));
                false
            }
            TableCommand::Subscribe { id, sender } => {
                // Prime the new subscriber with where things stand.
                let _ = sender.try_send(TableUpdate::Snapshot(self.table.snapshot(Some(id))));
                self.subscribers.insert(id, sender);
                false
            }
            TableCommand::Unsubscribe { id } => {
                self.subscribers.remove(&id);
                false
            }
            TableCommand::Close => {
                self.closed = true;
                false
            }
            TableCommand::TurnTimeout { generation } => {
                if generation != self.generation {
                    // A player action got in first; nothing to do.
                    return false;
                }
                log::debug!("table {}: turn timer fired", self.id);
                self.table.timeout_current();
                true
            }
            TableCommand::NextHand { generation } => {
                if generation != self.generation || !self.table.can_start() {
                    return false;
                }
                let _ = self.table.start_hand();
                true
            }
        }
    }

    /// Fan events and per-viewer snapshots out to subscribers. A full
    /// subscriber just misses an update; a closed one is dropped.
    fn broadcast(&mut self) {
        let events = self.table.drain_events();
        let table = &self.table;
        let table_id = self.id;
        self.subscribers.retain(|id, sender| {
            for event in &events {
                match sender.try_send(TableUpdate::Event(event.clone())) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!("table {table_id}: subscriber {id} is lagging");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => return false,
                }
            }
            match sender.try_send(TableUpdate::Snapshot(table.snapshot(Some(*id)))) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Cancel the pending deadline and arm whichever one the current
    /// state calls for: a turn timeout while someone holds the action,
    /// or the next-hand delay once a hand can be dealt.
    fn rearm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
        let generation = self.generation;
        let sender = self.sender.clone();

        if self.table.to_act().is_some() {
            let timeout = self.config.action_timeout;
            self.timer = Some(tokio::spawn(async move {
                sleep(timeout).await;
                let _ = sender.send(TableCommand::TurnTimeout { generation }).await;
            }));
        } else if self.table.can_start() {
            let delay = self.config.next_hand_delay;
            self.timer = Some(tokio::spawn(async move {
                sleep(delay).await;
                let _ = sender.send(TableCommand::NextHand { generation }).await;
            }));
        }
    }
}
