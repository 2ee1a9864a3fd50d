//! FEN parsing into a [`Setup`], independent of whether the rules engine
//! accepts the position as playable.

use std::collections::BTreeMap;

use cozy_chess::Board;

use crate::types::{Piece, PieceColor, PieceKind, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const EMPTY_FEN: &str = "8/8/8/8/8/8/8/8 w - - 0 1";

/// Raw FEN fields. Placement is always well formed; everything else may
/// describe a position the rules engine refuses (missing kings, etc).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setup {
    placement: [Option<Piece>; Square::NUM],
    pub side_to_move: PieceColor,
    pub castling: String,
    pub en_passant: String,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Setup {
    pub fn empty() -> Self {
        Self {
            placement: [None; Square::NUM],
            side_to_move: PieceColor::White,
            castling: "-".to_string(),
            en_passant: "-".to_string(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parse a FEN string. Only the placement field is required; missing
    /// trailing fields take their defaults.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut parts = fen.split_whitespace();
        let placement_str = parts.next().ok_or(FenError::InvalidFormat)?;

        let mut setup = Self::empty();
        let ranks: Vec<&str> = placement_str.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidBoardLayout);
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(FenError::InvalidBoardLayout);
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                    let square =
                        Square::from_coords(file, rank).map_err(|_| FenError::InvalidBoardLayout)?;
                    setup.placement[square.index() as usize] = Some(piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::InvalidBoardLayout);
                }
            }
            if file != 8 {
                return Err(FenError::InvalidBoardLayout);
            }
        }

        if let Some(side) = parts.next() {
            setup.side_to_move = match side {
                "w" => PieceColor::White,
                "b" => PieceColor::Black,
                other => return Err(FenError::InvalidSideToMove(other.to_string())),
            };
        }
        if let Some(castling) = parts.next() {
            if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
                return Err(FenError::InvalidCastling(castling.to_string()));
            }
            setup.castling = castling.to_string();
        }
        if let Some(ep) = parts.next() {
            if ep != "-" && ep.parse::<Square>().is_err() {
                return Err(FenError::InvalidEnPassant(ep.to_string()));
            }
            setup.en_passant = ep.to_string();
        }
        if let Some(halfmove) = parts.next() {
            setup.halfmove_clock = halfmove.parse().map_err(|_| FenError::InvalidFormat)?;
        }
        if let Some(fullmove) = parts.next() {
            setup.fullmove_number = fullmove.parse().map_err(|_| FenError::InvalidFormat)?;
        }

        Ok(setup)
    }

    /// Snapshot a rules-engine board.
    pub fn from_board(board: &Board) -> Self {
        // The engine always prints well-formed FEN.
        Self::from_fen(&format_fen(board)).unwrap_or_else(|_| Self::empty())
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.placement[square.index() as usize]
    }

    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>) {
        self.placement[square.index() as usize] = piece;
    }

    pub fn piece_map(&self) -> BTreeMap<Square, Piece> {
        Square::all()
            .filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
            .collect()
    }

    pub fn set_piece_map(&mut self, pieces: &BTreeMap<Square, Piece>) {
        self.placement = [None; Square::NUM];
        for (sq, piece) in pieces {
            self.set_piece_at(*sq, Some(*piece));
        }
    }

    /// Drop castling rights whose king and rook are no longer on their home
    /// squares, and the en passant target. Called after hand edits.
    pub fn sanitize(&mut self) {
        let home = |sq: &str, piece: Piece| -> bool {
            sq.parse::<Square>()
                .map(|s| self.piece_at(s) == Some(piece))
                .unwrap_or(false)
        };
        let white_king = home("e1", Piece::new(PieceKind::King, PieceColor::White));
        let black_king = home("e8", Piece::new(PieceKind::King, PieceColor::Black));
        let keep: String = self
            .castling
            .chars()
            .filter(|c| match c {
                'K' => white_king && home("h1", Piece::new(PieceKind::Rook, PieceColor::White)),
                'Q' => white_king && home("a1", Piece::new(PieceKind::Rook, PieceColor::White)),
                'k' => black_king && home("h8", Piece::new(PieceKind::Rook, PieceColor::Black)),
                'q' => black_king && home("a8", Piece::new(PieceKind::Rook, PieceColor::Black)),
                _ => false,
            })
            .collect();
        self.castling = if keep.is_empty() { "-".to_string() } else { keep };
        self.en_passant = "-".to_string();
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.placement[(rank * 8 + file) as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }
        let side = match self.side_to_move {
            PieceColor::White => "w",
            PieceColor::Black => "b",
        };
        format!(
            "{} {} {} {} {} {}",
            placement,
            side,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Hand the setup to the rules engine. `None` when it is not playable.
    pub fn to_board(&self) -> Option<Board> {
        self.to_fen().parse::<Board>().ok()
    }
}

impl Default for Setup {
    fn default() -> Self {
        // STARTING_FEN is a constant known to parse.
        Self::from_fen(STARTING_FEN).unwrap_or_else(|_| Self::empty())
    }
}

/// Parse a FEN string into a playable rules-engine board.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    Setup::from_fen(fen)?;
    fen.parse().map_err(|_| FenError::Unplayable(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
    #[error("Invalid side to move: {0}")]
    InvalidSideToMove(String),
    #[error("Invalid castling field: {0}")]
    InvalidCastling(String),
    #[error("Invalid en passant field: {0}")]
    InvalidEnPassant(String),
    #[error("Position is not playable: {0}")]
    Unplayable(String),
}
