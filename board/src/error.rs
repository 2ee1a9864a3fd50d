use chess::{FenError, Move, MoveParseError, PositionError, Square, SquareError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid square: {0}")]
    InvalidSquare(#[from] SquareError),
    #[error("Illegal move: {0}")]
    IllegalMove(Move),
    #[error("Invalid move text: {0}")]
    InvalidMoveText(#[from] MoveParseError),
    #[error("Invalid FEN: {0}")]
    Fen(#[from] FenError),
    #[error("Square {0} is occupied")]
    OccupiedSquare(Square),
    #[error("Square {0} is empty")]
    EmptySquare(Square),
}

impl From<PositionError> for BoardError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::IllegalMove(mv) => Self::IllegalMove(mv),
            PositionError::FenError(e) => Self::Fen(e),
        }
    }
}
