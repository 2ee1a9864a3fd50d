//! Move text in UCI notation and translation to the rules engine's own
//! move encoding.

use std::fmt;
use std::str::FromStr;

use cozy_chess::{Board, File, Piece, Rank};

use crate::types::{PieceKind, Square, SquareError};

/// A move in standard UCI terms. Castling is the king's two-square move
/// (`e1g1`), never king-takes-rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char_lower())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uci_move(s)
    }
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<Move, MoveParseError> {
    let s = s.trim();
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(MoveParseError::InvalidMove(s.to_string()));
    }

    let from = s[0..2].parse::<Square>()?;
    let to = s[2..4].parse::<Square>()?;

    let promotion = if s.len() == 5 {
        Some(match &s[4..5] {
            "q" => PieceKind::Queen,
            "r" => PieceKind::Rook,
            "b" => PieceKind::Bishop,
            "n" => PieceKind::Knight,
            _ => return Err(MoveParseError::InvalidPromotion(s.to_string())),
        })
    } else {
        None
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Translate a rules-engine move into standard UCI terms.
///
/// cozy_chess encodes castling as the king capturing its own rook (e1h1);
/// UCI moves the king two squares (e1g1).
pub fn from_cozy(board: &Board, mv: cozy_chess::Move) -> Move {
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    let to = if is_castle {
        let file = if mv.to.file() as usize > mv.from.file() as usize {
            File::G
        } else {
            File::C
        };
        cozy_chess::Square::new(file, mv.to.rank())
    } else {
        mv.to
    };
    Move {
        from: mv.from.into(),
        to: to.into(),
        promotion: mv.promotion.map(PieceKind::from),
    }
}

/// Translate a standard UCI move into the rules engine's encoding by
/// matching it against the engine's legal moves.
///
/// Returns `None` when no legal move corresponds.
pub fn to_cozy(board: &Board, mv: Move) -> Option<cozy_chess::Move> {
    let mut found = None;
    board.generate_moves(|moves| {
        for raw in moves {
            if from_cozy(board, raw) == mv {
                found = Some(raw);
                return true;
            }
        }
        false
    });
    found
}

/// Encode a move for the rules engine without consulting legality.
///
/// UCI castling notation (e1g1, e1c1, e8g8, e8c8) is rewritten to
/// king-to-rook when the king really stands on its home square.
pub fn to_cozy_unchecked(board: &Board, mv: Move) -> cozy_chess::Move {
    let from: cozy_chess::Square = mv.from.into();
    let to: cozy_chess::Square = mv.to.into();
    let is_rank_1_or_8 = matches!(from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(from.file(), File::E);
    let is_g_or_c_file = matches!(to.file(), File::G | File::C);
    let is_king = board.piece_on(from) == Some(Piece::King);

    let to = if is_king && is_rank_1_or_8 && is_e_file && is_g_or_c_file && from.rank() == to.rank()
    {
        match to.file() {
            File::G => cozy_chess::Square::new(File::H, to.rank()),
            _ => cozy_chess::Square::new(File::A, to.rank()),
        }
    } else {
        to
    };

    cozy_chess::Move {
        from,
        to,
        promotion: mv.promotion.map(Piece::from),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(#[from] SquareError),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_uci_move() {
        let mv = Move::new(sq("e2"), sq("e4"));
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = Move::new(sq("e7"), sq("e8")).with_promotion(PieceKind::Queen);
        assert_eq!(mv.to_string(), "e7e8q");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_uci_move("e2").is_err());
        assert!(parse_uci_move("e2e9").is_err());
        assert!(parse_uci_move("e7e8k").is_err());
        assert!(parse_uci_move("e2e4e5").is_err());
        assert!(parse_uci_move("é2e4").is_err());
    }

    #[test]
    fn test_castling_translation() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let short = Move::new(sq("e1"), sq("g1"));
        let long = Move::new(sq("e1"), sq("c1"));

        let raw_short = to_cozy(&board, short).unwrap();
        assert_eq!(raw_short.to.to_string(), "h1");
        assert_eq!(from_cozy(&board, raw_short), short);

        let raw_long = to_cozy(&board, long).unwrap();
        assert_eq!(raw_long.to.to_string(), "a1");
        assert_eq!(to_cozy_unchecked(&board, long), raw_long);
    }

    #[test]
    fn test_to_cozy_rejects_illegal() {
        let board = Board::default();
        assert!(to_cozy(&board, Move::new(sq("e2"), sq("e5"))).is_none());
        assert!(to_cozy(&board, Move::new(sq("e2"), sq("e4"))).is_some());
    }
}
