use board::{BoardError, ClickOutcome};
use chess::{Move, Square};
use protocol::PacketError;
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("Malformed packet: {0}")]
    Packet(#[from] PacketError),
    #[error("It is the engine's turn")]
    NotYourTurn,
    #[error("Not connected to a server")]
    Offline,
    #[error("Unexpected packet: {0}")]
    UnexpectedPacket(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
/// Engine moves are never requested: the actor starts a search whenever it
/// is the engine's turn.
pub enum SessionCommand {
    Click {
        square: Square,
        reply: oneshot::Sender<Result<ClickOutcome, SessionError>>,
    },
    Mark {
        square: Square,
        reply: oneshot::Sender<bool>,
    },
    Push {
        mv: Move,
        reply: oneshot::Sender<Result<Move, SessionError>>,
    },
    /// Raw bytes of one packet from the server.
    Receive {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    /// Announce `username` to the server. Local moves go out from then on.
    Connect {
        username: String,
        reply: oneshot::Sender<()>,
    },
    SendChat {
        text: String,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Pop {
        reply: oneshot::Sender<Option<Move>>,
    },
    Unpop {
        reply: oneshot::Sender<Option<Move>>,
    },
    GoTo {
        ply: usize,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Flip {
        reply: oneshot::Sender<()>,
    },
    Reset {
        fen: Option<String>,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
