use board::BoardEvent;
use chess::PieceColor;
use protocol::Packet;

use super::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full state snapshot after any command or engine move.
    StateChanged(SessionSnapshot),
    /// A board notification, in the order the board emitted it.
    Board(BoardEvent),
    /// A packet for the server.
    Outbound(Packet),
    /// The server paired us with an opponent.
    GameStarted { color: PieceColor, opponent: String },
    Chat(String),
    ServerMessage(String),
    ServerError(String),
    /// Error notification.
    Error(String),
}
