pub mod fen;
pub mod position;
pub mod types;
pub mod uci;

pub use fen::{format_fen, parse_fen, FenError, Setup, EMPTY_FEN, STARTING_FEN};
pub use position::{Outcome, Position, PositionError};
pub use types::{Piece, PieceColor, PieceKind, Square, SquareError};
pub use uci::{parse_uci_move, Move, MoveParseError};
