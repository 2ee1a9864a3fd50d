use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chess::{Move, Outcome, Piece, PieceKind, Position, Square, STARTING_FEN};

use crate::access::AccessibleSides;
use crate::cell::Cell;
use crate::error::BoardError;
use crate::events::{BoardEvent, Callback, EventKind, Notifier, SubscriptionId};
use crate::geometry::{GridCoord, Orientation};
use crate::history::RedoStack;

/// Construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Starting FEN. `None` starts from an empty board.
    pub fen: Option<String>,
    pub flipped: bool,
    pub sides: AccessibleSides,
    /// Keep forward history while reviewing past positions.
    pub block_on_pop: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            fen: Some(STARTING_FEN.to_string()),
            flipped: false,
            sides: AccessibleSides::None,
            block_on_pop: false,
        }
    }
}

/// What a primary click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(Square),
    Deselected,
    Moved(Move),
    /// The view is behind the live end in block-on-pop mode.
    Blocked,
    Ignored,
}

#[derive(Debug, Clone, Default)]
struct BoardImages {
    default: Option<PathBuf>,
    flipped: Option<PathBuf>,
}

/// Keeps the 64 cells synchronized with the position and turns gestures
/// into moves.
///
/// Cells are a projection of the position: every mutation goes through the
/// position first and is followed by a full resync.
#[derive(Debug)]
pub struct BoardController {
    position: Position,
    cells: [Cell; Square::NUM],
    orientation: Orientation,
    sides: AccessibleSides,
    redo: RedoStack,
    block_on_pop: bool,
    images: BoardImages,
    notifier: Notifier,
}

impl BoardController {
    pub fn new(config: BoardConfig) -> Result<Self, BoardError> {
        let position = match config.fen.as_deref() {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::empty(),
        };
        let mut board = Self {
            position,
            cells: std::array::from_fn(|_| Cell::new()),
            orientation: Orientation::new(config.flipped),
            sides: config.sides,
            redo: RedoStack::new(),
            block_on_pop: config.block_on_pop,
            images: BoardImages::default(),
            notifier: Notifier::new(),
        };
        board.synchronize();
        tracing::debug!(fen = %board.position.fen(), flipped = config.flipped, sides = %config.sides, "Board created");
        Ok(board)
    }

    // --- Accessors ---

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn is_flipped(&self) -> bool {
        self.orientation.flipped
    }

    pub fn accessible_sides(&self) -> AccessibleSides {
        self.sides
    }

    pub fn block_on_pop(&self) -> bool {
        self.block_on_pop
    }

    pub fn set_block_on_pop(&mut self, block: bool) {
        self.block_on_pop = block;
    }

    pub fn cell(&self, coord: GridCoord) -> &Cell {
        &self.cells[coord.index()]
    }

    pub fn cell_at_square(&self, square: Square) -> &Cell {
        &self.cells[self.index_of(square)]
    }

    /// The square the cell at `coord` currently represents.
    pub fn square_of(&self, coord: GridCoord) -> Square {
        self.orientation.square_at(coord)
    }

    pub fn grid_coordinate_of(&self, square: Square) -> GridCoord {
        self.orientation.grid_of(square)
    }

    /// Every square (a1 through h8) with the cell currently showing it.
    pub fn cells(&self) -> impl Iterator<Item = (Square, &Cell)> + '_ {
        Square::all().map(move |sq| (sq, &self.cells[self.index_of(sq)]))
    }

    /// The checked cell's square, if a piece is selected.
    pub fn selected_square(&self) -> Option<Square> {
        self.cells()
            .find(|(_, cell)| cell.is_checked())
            .map(|(sq, _)| sq)
    }

    pub fn highlighted_squares(&self) -> Vec<Square> {
        self.squares_where(Cell::is_highlighted)
    }

    pub fn marked_squares(&self) -> Vec<Square> {
        self.squares_where(Cell::is_marked)
    }

    /// Piece placement as the cells show it.
    pub fn cell_piece_map(&self) -> BTreeMap<Square, Piece> {
        self.cells()
            .filter_map(|(sq, cell)| cell.occupant().map(|p| (sq, p)))
            .collect()
    }

    /// Background image for the current orientation.
    pub fn board_image(&self) -> Option<&Path> {
        if self.orientation.flipped {
            self.images.flipped.as_deref()
        } else {
            self.images.default.as_deref()
        }
    }

    pub fn set_board_images(&mut self, default: PathBuf, flipped: PathBuf) {
        self.images = BoardImages {
            default: Some(default),
            flipped: Some(flipped),
        };
    }

    // --- Notifications ---

    pub fn subscribe(&mut self, kind: EventKind, callback: Callback) -> SubscriptionId {
        self.notifier.subscribe(kind, callback)
    }

    pub fn subscribe_all(&mut self, callback: Callback) -> SubscriptionId {
        self.notifier.subscribe_all(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // --- Gestures ---

    /// Primary click on the cell showing `square`.
    ///
    /// On a highlighted cell the selected piece moves there. On a checkable
    /// cell the selection toggles. Anywhere else an active selection is
    /// dropped. A failed move leaves the selection in place.
    pub fn click(&mut self, square: Square) -> Result<ClickOutcome, BoardError> {
        if self.is_blocked() {
            tracing::debug!(%square, "Click ignored while reviewing history");
            return Ok(ClickOutcome::Blocked);
        }
        let idx = self.index_of(square);

        if self.cells[idx].is_highlighted() {
            let Some(from) = self.selected_square() else {
                self.unhighlight_cells();
                return Ok(ClickOutcome::Ignored);
            };
            let mv = self.with_default_promotion(Move::new(from, square));
            self.apply_checked(mv)?;
            return Ok(ClickOutcome::Moved(mv));
        }

        if self.cells[idx].is_checkable() {
            if self.cells[idx].toggle() {
                self.unhighlight_cells();
                self.uncheck_cells(Some(square));
                self.unmark_cells();
                self.highlight_legal_moves_for(square);
                tracing::debug!(%square, "Selected");
                Ok(ClickOutcome::Selected(square))
            } else {
                self.unhighlight_cells();
                Ok(ClickOutcome::Deselected)
            }
        } else if self.selected_square().is_some() {
            self.uncheck_cells(None);
            self.unhighlight_cells();
            Ok(ClickOutcome::Deselected)
        } else {
            Ok(ClickOutcome::Ignored)
        }
    }

    /// Secondary click: toggle the mark on `square`. Returns the new state.
    pub fn right_click(&mut self, square: Square) -> bool {
        let marked = !self.cell_at_square(square).is_marked();
        self.set_marked(square, marked)
    }

    /// Set the mark on `square` and notify, even when the value is
    /// unchanged. Marking drops any selection and highlights.
    pub fn set_marked(&mut self, square: Square, marked: bool) -> bool {
        let idx = self.index_of(square);
        let marked = self.cells[idx].set_marked(marked);
        if marked {
            self.uncheck_cells(None);
            self.unhighlight_cells();
        }
        self.notifier
            .emit(&BoardEvent::CellMarked { square, marked });
        marked
    }

    // --- Move application ---

    /// Apply a move after checking legality. A pawn reaching the last rank
    /// without a promotion piece promotes to a queen.
    pub fn push(&mut self, mv: Move) -> Result<Move, BoardError> {
        let mv = self.with_default_promotion(mv);
        self.apply_checked(mv)?;
        Ok(mv)
    }

    /// Parse move text (as carried over the network) and push it.
    pub fn push_text(&mut self, text: &str) -> Result<Move, BoardError> {
        let mv: Move = text.parse()?;
        self.push(mv)
    }

    /// Move without a legality check.
    ///
    /// The caller must know the move is legal (a replayed game, an engine's
    /// answer). An illegal move here leaves the position unspecified.
    pub fn move_piece_at(&mut self, from: Square, to: Square) -> Move {
        let mv = self.with_default_promotion(Move::new(from, to));
        self.apply_unchecked(mv);
        mv
    }

    /// Unchecked variant of [`push`](Self::push). Same precondition as
    /// [`move_piece_at`](Self::move_piece_at).
    pub fn move_piece(&mut self, mv: Move) -> Move {
        let mv = self.with_default_promotion(mv);
        self.apply_unchecked(mv);
        mv
    }

    /// Whether `mv` is a pawn move onto its promotion rank. Legality is not
    /// considered.
    pub fn is_pseudo_legal_promotion(&self, mv: Move) -> bool {
        self.position
            .piece_at(mv.from)
            .is_some_and(|p| p.kind == PieceKind::Pawn && mv.to.rank() == p.color.promotion_rank())
    }

    fn with_default_promotion(&self, mv: Move) -> Move {
        if mv.promotion.is_none() && self.is_pseudo_legal_promotion(mv) {
            mv.with_promotion(PieceKind::Queen)
        } else {
            mv
        }
    }

    fn apply_checked(&mut self, mv: Move) -> Result<(), BoardError> {
        if !self.redo.is_empty() && self.block_on_pop {
            if !self.live_position().is_legal(mv) {
                tracing::warn!(%mv, "Rejected illegal move");
                return Err(BoardError::IllegalMove(mv));
            }
            self.fast_forward();
        }
        let san = self.position.san(mv);
        if let Err(e) = self.position.push(mv) {
            tracing::warn!(%mv, "Rejected illegal move");
            return Err(e.into());
        }
        self.redo.clear();
        self.after_move(mv, &san);
        Ok(())
    }

    fn apply_unchecked(&mut self, mv: Move) {
        if !self.redo.is_empty() && self.block_on_pop {
            self.fast_forward();
        }
        let san = self.position.san(mv);
        self.position.push_unchecked(mv);
        self.redo.clear();
        self.after_move(mv, &san);
    }

    fn after_move(&mut self, mv: Move, san: &str) {
        tracing::debug!(%mv, san, fen = %self.position.fen(), "Move applied");
        self.synchronize();
        self.unhighlight_cells();
        self.unmark_cells();
        self.notifier.emit(&BoardEvent::MoveMade(mv.to_string()));
        self.evaluate_game_end();
    }

    fn evaluate_game_end(&mut self) {
        match self.position.outcome() {
            Outcome::Ongoing => return,
            Outcome::Checkmate { winner } => {
                tracing::info!(%winner, "Checkmate");
                self.notifier.emit(&BoardEvent::Checkmate { winner });
            }
            Outcome::Draw => {
                tracing::info!("Draw");
                self.notifier.emit(&BoardEvent::Draw);
            }
        }
        self.notifier.emit(&BoardEvent::GameOver);
    }

    // --- History navigation ---

    /// Step back one move, keeping it for [`unpop`](Self::unpop).
    /// `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<Move> {
        let mv = self.pop_one()?;
        self.after_navigation();
        Some(mv)
    }

    /// Reapply the most recently popped move. `None` at the live end.
    pub fn unpop(&mut self) -> Option<Move> {
        let mv = self.unpop_one()?;
        self.after_navigation();
        Some(mv)
    }

    /// Move the cursor so that `ply` moves are applied. Targets past the
    /// end are clamped.
    pub fn go_to_move(&mut self, ply: usize) {
        let target = ply.min(self.total_moves());
        if target == self.ply() {
            return;
        }
        while self.ply() > target {
            if self.pop_one().is_none() {
                break;
            }
        }
        while self.ply() < target {
            if self.unpop_one().is_none() {
                break;
            }
        }
        self.after_navigation();
    }

    pub fn go_to_start(&mut self) {
        self.go_to_move(0);
    }

    pub fn go_to_end(&mut self) {
        self.go_to_move(self.total_moves());
    }

    /// Moves applied to the current position.
    pub fn ply(&self) -> usize {
        self.position.ply()
    }

    /// Applied plus pending-redo moves.
    pub fn total_moves(&self) -> usize {
        self.position.ply() + self.redo.len()
    }

    pub fn is_live(&self) -> bool {
        self.redo.is_empty()
    }

    /// Full game: applied moves followed by the pending redo moves.
    pub fn game_moves(&self) -> Vec<Move> {
        let mut moves = self.position.move_stack();
        moves.extend(self.redo.forward().copied());
        moves
    }

    fn is_blocked(&self) -> bool {
        self.block_on_pop && !self.is_live()
    }

    fn pop_one(&mut self) -> Option<Move> {
        let mv = self.position.pop()?;
        self.redo.push(mv);
        Some(mv)
    }

    fn unpop_one(&mut self) -> Option<Move> {
        let mv = self.redo.pop()?;
        match self.position.push(mv) {
            Ok(()) => Some(mv),
            Err(e) => {
                tracing::warn!("Discarding redo history: {e}");
                self.redo.clear();
                None
            }
        }
    }

    fn fast_forward(&mut self) {
        while self.unpop_one().is_some() {}
    }

    /// The position at the live end, without moving the cursor.
    fn live_position(&self) -> Position {
        let mut live = self.position.clone();
        for mv in self.redo.forward() {
            live.push_unchecked(*mv);
        }
        live
    }

    fn after_navigation(&mut self) {
        self.synchronize();
        self.unhighlight_cells();
        let (ply, total) = (self.ply(), self.total_moves());
        tracing::debug!(ply, total, "History navigated");
        self.notifier
            .emit(&BoardEvent::HistoryNavigated { ply, total });
    }

    // --- Orientation and setup ---

    /// Swap the square each grid cell represents and the background image.
    pub fn flip(&mut self) {
        self.orientation.flip();
        self.synchronize();
        self.unhighlight_cells();
        self.unmark_cells();
        tracing::debug!(flipped = self.orientation.flipped, "Board flipped");
    }

    /// Back to the standard starting position with no history.
    pub fn reset(&mut self) {
        self.replace_position(Position::new());
    }

    /// Replace the position wholesale. `None` empties the board.
    pub fn set_fen(&mut self, fen: Option<&str>) -> Result<(), BoardError> {
        let position = match fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::empty(),
        };
        self.replace_position(position);
        Ok(())
    }

    fn replace_position(&mut self, position: Position) {
        self.position = position;
        self.redo.clear();
        self.synchronize();
        self.unhighlight_cells();
        self.unmark_cells();
        tracing::debug!(fen = %self.position.fen(), "Position replaced");
    }

    pub fn set_accessible_sides(&mut self, sides: AccessibleSides) {
        self.sides = sides;
        self.synchronize();
        self.unhighlight_cells();
    }

    /// Place a piece on an empty square.
    pub fn add_piece(&mut self, square: Square, piece: Piece) -> Result<(), BoardError> {
        if self.position.piece_at(square).is_some() {
            return Err(BoardError::OccupiedSquare(square));
        }
        self.set_piece_at(square, piece);
        Ok(())
    }

    /// Place a piece, replacing any occupant. Clears history.
    pub fn set_piece_at(&mut self, square: Square, piece: Piece) {
        self.position.set_piece_at(square, piece);
        self.after_edit();
    }

    pub fn remove_piece_at(&mut self, square: Square) -> Result<Piece, BoardError> {
        let piece = self
            .position
            .remove_piece_at(square)
            .ok_or(BoardError::EmptySquare(square))?;
        self.after_edit();
        Ok(piece)
    }

    pub fn set_piece_map(&mut self, pieces: &BTreeMap<Square, Piece>) {
        self.position.set_piece_map(pieces);
        self.after_edit();
    }

    fn after_edit(&mut self) {
        self.redo.clear();
        self.synchronize();
        self.unhighlight_cells();
    }

    // --- Cell synchronization ---

    /// Rebuild every cell's occupant and accessibility from the position.
    pub fn synchronize(&mut self) {
        for cell in &mut self.cells {
            cell.reset_to_plain();
        }
        for (square, piece) in self.position.piece_map() {
            let idx = self.index_of(square);
            let cell = &mut self.cells[idx];
            cell.set_accessible(self.sides.allows(piece.color));
            cell.set_occupant(Some(piece));
        }
    }

    pub fn highlight_legal_moves_for(&mut self, square: Square) {
        for mv in self.position.legal_moves_from(square) {
            let idx = self.index_of(mv.to);
            self.cells[idx].set_highlighted(true);
        }
    }

    /// Uncheck every cell except the one showing `except`.
    pub fn uncheck_cells(&mut self, except: Option<Square>) {
        let keep = except.map(|sq| self.index_of(sq));
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if Some(i) != keep {
                cell.set_checked(false);
            }
        }
    }

    pub fn unhighlight_cells(&mut self) {
        for cell in &mut self.cells {
            cell.set_highlighted(false);
        }
    }

    pub fn unmark_cells(&mut self) {
        for cell in &mut self.cells {
            cell.set_marked(false);
        }
    }

    fn index_of(&self, square: Square) -> usize {
        self.orientation.grid_of(square).index()
    }

    fn squares_where(&self, pred: impl Fn(&Cell) -> bool) -> Vec<Square> {
        self.cells()
            .filter(|(_, cell)| pred(cell))
            .map(|(sq, _)| sq)
            .collect()
    }
}
