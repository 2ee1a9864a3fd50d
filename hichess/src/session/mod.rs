//! The game session: one actor task owns the board and processes commands
//! one at a time.

pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod snapshot;
pub mod state;

use board::{BoardConfig, BoardController};
use chess::PieceColor;
use engine::{Level, MoveSearch};
use tokio::sync::{broadcast, mpsc};

use actor::run_session_actor;
pub use commands::SessionError;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use snapshot::{CellSnapshot, SessionSnapshot};
use state::SessionState;

/// The engine's side and strength in a game against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opponent {
    pub color: PieceColor,
    pub level: Level,
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub board: BoardConfig,
    /// Local moves go out as `Move` packets.
    pub online: bool,
    pub opponent: Option<Opponent>,
}

/// Build the board and spawn the actor. `engine` plays for
/// `config.opponent` and is required when one is set.
pub fn spawn_session(
    config: SessionConfig,
    engine: Option<Box<dyn MoveSearch>>,
) -> Result<SessionHandle, SessionError> {
    if config.opponent.is_some() && engine.is_none() {
        return Err(SessionError::Internal(
            "An engine opponent needs an engine".into(),
        ));
    }
    let board = BoardController::new(config.board)?;

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(256);
    let state = SessionState::new(board, config.online, config.opponent, engine);

    tokio::spawn(async move {
        run_session_actor(state, cmd_rx, event_tx).await;
    });

    Ok(SessionHandle::new(cmd_tx))
}
