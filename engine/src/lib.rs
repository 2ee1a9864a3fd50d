pub mod process;
pub mod search;
pub mod uci;

pub use process::{find_engine_path, EngineConfig, UciEngine};
pub use search::{Level, MoveSearch, SearchBudget, SearchError};
pub use uci::{UciError, UciMessage};

use chess::Move;

/// Lines from the engine's stdout that a search waits on.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    UciOk,
    ReadyOk,
    /// `None` when the engine has no move to play ("bestmove (none)").
    BestMove(Option<Move>),
    Progress(SearchProgress),
}

/// The parts of an `info` line worth logging when a search ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchProgress {
    pub depth: Option<u8>,
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Negative when the engine is being mated.
    Mate(i8),
}
