//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::{
    Action, ActionError, HandEvent, JoinError, PlayerId, TableSnapshot, engine::StartError,
};

/// Messages a [`super::TableActor`] accepts through its inbox. Requests
/// that need an answer carry a `oneshot` responder; timer messages are
/// internal and carry the generation that armed them.
#[derive(Debug)]
pub enum TableCommand {
    Join {
        name: String,
        response: oneshot::Sender<Result<PlayerId, JoinError>>,
    },
    Spectate {
        name: String,
        response: oneshot::Sender<PlayerId>,
    },
    Leave {
        id: PlayerId,
    },
    Disconnect {
        id: PlayerId,
    },
    Reconnect {
        id: PlayerId,
        response: oneshot::Sender<bool>,
    },
    Act {
        id: PlayerId,
        action: Action,
        response: oneshot::Sender<Result<(), ActionError>>,
    },
    StartHand {
        response: oneshot::Sender<Result<(), StartError>>,
    },
    Snapshot {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<TableSnapshot>,
    },
    Subscribe {
        id: PlayerId,
        sender: mpsc::Sender<TableUpdate>,
    },
    Unsubscribe {
        id: PlayerId,
    },
    Close,

    /// Internal: the turn timer armed for `generation` fired.
    TurnTimeout { generation: u64 },

    /// Internal: the inter-hand delay armed for `generation` elapsed.
    NextHand { generation: u64 },
}

/// Pushed to subscribers after every state change. Snapshots are
/// rendered per subscriber, so hole-card visibility is already applied.
#[derive(Clone, Debug)]
pub enum TableUpdate {
    Event(HandEvent),
    Snapshot(TableSnapshot),
}
