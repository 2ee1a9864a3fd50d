pub mod parser;

pub use parser::{parse_uci_message, UciMessage};

#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine executable not found")]
    NotFound,
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },
    #[error("Engine has no stdin")]
    NoStdin,
    #[error("Engine has no stdout")]
    NoStdout,
    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),
    #[error("Engine closed its output")]
    Closed,
    #[error("Malformed UCI message: {0}")]
    MalformedMessage(String),
    #[error("Unknown UCI message: {0}")]
    UnknownMessage(String),
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] chess::MoveParseError),
}
