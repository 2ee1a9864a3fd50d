use std::collections::BTreeMap;

use cozy_chess::{Board, GameStatus};

use crate::fen::{FenError, Setup};
use crate::types::{Piece, PieceColor, PieceKind, Square};
use crate::uci::{self, Move};

/// Canonical chess state: the start setup, the current rules-engine board
/// and the stack of moves applied since the start.
///
/// A setup the rules engine refuses (an empty board, a board without kings)
/// is "unplayable": it still answers placement queries but has no legal
/// moves.
#[derive(Debug, Clone)]
pub struct Position {
    start: Setup,
    start_board: Option<Board>,
    board: Option<Board>,
    stack: Vec<Played>,
}

/// A move on the stack, kept in both encodings so replay never has to
/// re-derive the engine's castling form.
#[derive(Debug, Clone, Copy)]
struct Played {
    mv: Move,
    raw: cozy_chess::Move,
}

/// Result of evaluating the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Checkmate { winner: PieceColor },
    Draw,
}

impl Position {
    /// Create a position at the standard starting arrangement
    pub fn new() -> Self {
        Self::from_setup(Setup::default())
    }

    /// An empty board. Unplayable until kings are placed.
    pub fn empty() -> Self {
        Self::from_setup(Setup::empty())
    }

    /// Create a position from a FEN string. The FEN must be well formed but
    /// does not have to be playable.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_setup(Setup::from_fen(fen)?))
    }

    pub fn from_setup(start: Setup) -> Self {
        let start_board = start.to_board();
        if start_board.is_none() {
            tracing::debug!("Setup is not playable: {}", start.to_fen());
        }
        Self {
            board: start_board.clone(),
            start_board,
            start,
            stack: Vec::new(),
        }
    }

    pub fn is_playable(&self) -> bool {
        self.board.is_some()
    }

    /// The rules-engine board, when the position is playable.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// The current position as a setup (placement plus FEN metadata).
    pub fn setup(&self) -> Setup {
        match &self.board {
            Some(board) => Setup::from_board(board),
            None => self.start.clone(),
        }
    }

    pub fn fen(&self) -> String {
        match &self.board {
            Some(board) => crate::fen::format_fen(board),
            None => self.start.to_fen(),
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        match &self.board {
            Some(board) => {
                let sq: cozy_chess::Square = square.into();
                let piece = board.piece_on(sq)?;
                let color = board.color_on(sq)?;
                Some(Piece::new(piece.into(), color.into()))
            }
            None => self.start.piece_at(square),
        }
    }

    /// Every occupied square with its piece.
    pub fn piece_map(&self) -> BTreeMap<Square, Piece> {
        Square::all()
            .filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
            .collect()
    }

    pub fn side_to_move(&self) -> PieceColor {
        match &self.board {
            Some(board) => board.side_to_move().into(),
            None => self.start.side_to_move,
        }
    }

    /// Moves applied since the start, oldest first.
    pub fn move_stack(&self) -> Vec<Move> {
        self.stack.iter().map(|p| p.mv).collect()
    }

    pub fn ply(&self) -> usize {
        self.stack.len()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.stack.last().map(|p| p.mv)
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        let Some(board) = &self.board else {
            return Vec::new();
        };
        let mut moves = Vec::new();
        board.generate_moves(|mvs| {
            moves.extend(mvs.into_iter().map(|raw| uci::from_cozy(board, raw)));
            false
        });
        moves
    }

    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.board
            .as_ref()
            .is_some_and(|board| uci::to_cozy(board, mv).is_some())
    }

    /// Apply a move after validating it. Nothing changes on failure.
    pub fn push(&mut self, mv: Move) -> Result<(), PositionError> {
        let board = self.board.as_mut().ok_or(PositionError::IllegalMove(mv))?;
        let raw = uci::to_cozy(board, mv).ok_or(PositionError::IllegalMove(mv))?;
        board.play_unchecked(raw);
        self.stack.push(Played { mv, raw });
        Ok(())
    }

    /// Apply a move without validating it.
    ///
    /// The caller must already know the move is legal; an illegal move leaves
    /// the position in an unspecified state. On an unplayable position the
    /// piece is relocated in the setup instead, which then becomes the new
    /// start (the move stack is not extended).
    pub fn push_unchecked(&mut self, mv: Move) {
        match self.board.as_mut() {
            Some(board) => {
                let raw = uci::to_cozy_unchecked(board, mv);
                board.play_unchecked(raw);
                self.stack.push(Played { mv, raw });
            }
            None => {
                let mut setup = self.start.clone();
                if let Some(piece) = setup.piece_at(mv.from) {
                    let placed = match mv.promotion {
                        Some(kind) => Piece::new(kind, piece.color),
                        None => piece,
                    };
                    setup.set_piece_at(mv.from, None);
                    setup.set_piece_at(mv.to, Some(placed));
                    setup.side_to_move = piece.color.opponent();
                }
                setup.sanitize();
                *self = Self::from_setup(setup);
            }
        }
    }

    /// Undo the last move. `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<Move> {
        let played = self.stack.pop()?;
        self.rebuild();
        Some(played.mv)
    }

    /// Replace the placement wholesale. The result becomes the new start and
    /// the move stack is cleared.
    pub fn set_piece_map(&mut self, pieces: &BTreeMap<Square, Piece>) {
        let mut setup = self.setup();
        setup.set_piece_map(pieces);
        setup.sanitize();
        *self = Self::from_setup(setup);
    }

    /// Put a piece on a square, replacing whatever stood there.
    pub fn set_piece_at(&mut self, square: Square, piece: Piece) {
        self.edit(square, Some(piece));
    }

    /// Clear a square, returning the piece that stood there.
    pub fn remove_piece_at(&mut self, square: Square) -> Option<Piece> {
        let removed = self.piece_at(square);
        if removed.is_some() {
            self.edit(square, None);
        }
        removed
    }

    fn edit(&mut self, square: Square, piece: Option<Piece>) {
        let mut setup = self.setup();
        setup.set_piece_at(square, piece);
        setup.sanitize();
        *self = Self::from_setup(setup);
    }

    /// Evaluate whether the game is over.
    pub fn outcome(&self) -> Outcome {
        let Some(board) = &self.board else {
            return Outcome::Ongoing;
        };
        match board.status() {
            GameStatus::Won => Outcome::Checkmate {
                winner: PieceColor::from(board.side_to_move()).opponent(),
            },
            GameStatus::Drawn => Outcome::Draw,
            GameStatus::Ongoing if insufficient_material(board) => Outcome::Draw,
            GameStatus::Ongoing => Outcome::Ongoing,
        }
    }

    pub fn is_check(&self) -> bool {
        self.board
            .as_ref()
            .is_some_and(|board| !board.checkers().is_empty())
    }

    /// Simplified SAN for a legal move in the current position
    pub fn san(&self, mv: Move) -> String {
        let Some(piece) = self.piece_at(mv.from) else {
            return mv.to_string();
        };
        let capture = self.piece_at(mv.to).is_some_and(|p| p.color != piece.color)
            || (piece.kind == PieceKind::Pawn && mv.from.file() != mv.to.file());

        if piece.kind == PieceKind::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
            return if mv.to.file() > mv.from.file() {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            };
        }

        let mut san = String::new();
        match piece.kind {
            PieceKind::Pawn => {
                if capture {
                    san.push((b'a' + mv.from.file()) as char);
                }
            }
            kind => san.push(kind.to_char_upper()),
        }
        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.to_char_upper());
        }
        san
    }

    /// Rebuild the current board from start + stack (for undo)
    fn rebuild(&mut self) {
        let mut board = self.start_board.clone();
        if let Some(board) = board.as_mut() {
            for played in &self.stack {
                board.play_unchecked(played.raw);
            }
        }
        self.board = board;
    }
}

/// Bare kings, or a single knight or bishop against a bare king. Repetition
/// is not tracked.
fn insufficient_material(board: &Board) -> bool {
    use cozy_chess::Piece as P;
    let heavy = board.pieces(P::Pawn) | board.pieces(P::Rook) | board.pieces(P::Queen);
    let minors = board.pieces(P::Knight) | board.pieces(P::Bishop);
    heavy.is_empty() && minors.len() <= 1
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Illegal move: {0}")]
    IllegalMove(Move),
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}
