//! Two-column move table (white, black) with a view cursor.

use chess::PieceColor;

/// Moves in play order. The cursor counts the moves currently shown on the
/// board, so `0` is the start position and `len()` is the live end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    moves: Vec<String>,
    cursor: usize,
    /// The game started with black to move, leaving the first white cell
    /// empty.
    black_first: bool,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_with(side: PieceColor) -> Self {
        Self {
            black_first: side == PieceColor::Black,
            ..Self::default()
        }
    }

    /// Empty the list for a game where `side` moves first.
    pub fn restart(&mut self, side: PieceColor) {
        self.clear();
        self.black_first = side == PieceColor::Black;
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_live(&self) -> bool {
        self.cursor == self.moves.len()
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Append a move. The view follows it to the live end.
    pub fn add_move(&mut self, text: impl Into<String>) {
        self.moves.push(text.into());
        self.cursor = self.moves.len();
    }

    /// Remove the last move, pulling the cursor back if it pointed past it.
    pub fn pop_move(&mut self) -> Option<String> {
        let text = self.moves.pop()?;
        self.cursor = self.cursor.min(self.moves.len());
        Some(text)
    }

    /// Drop moves until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        while self.moves.len() > len {
            self.pop_move();
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Step the cursor back. `false` at the start.
    pub fn to_previous(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step the cursor forward. `false` at the live end.
    pub fn to_next(&mut self) -> bool {
        if self.is_live() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Put the cursor after `ply` moves, clamped to the live end.
    pub fn go_to(&mut self, ply: usize) {
        let target = ply.min(self.moves.len());
        while self.cursor > target && self.to_previous() {}
        while self.cursor < target && self.to_next() {}
    }

    /// Table rows of (white move, black move).
    pub fn rows(&self) -> Vec<(Option<&str>, Option<&str>)> {
        let lead = self.black_first.then_some(None);
        let cells: Vec<Option<&str>> = lead
            .into_iter()
            .chain(self.moves.iter().map(|m| Some(m.as_str())))
            .collect();
        cells
            .chunks(2)
            .map(|pair| (pair[0], pair.get(1).copied().flatten()))
            .collect()
    }

    /// Table cell (row, column) of the last move shown. `None` at the start.
    pub fn current_cell(&self) -> Option<(usize, usize)> {
        let last = self.cursor.checked_sub(1)? + usize::from(self.black_first);
        Some((last / 2, last % 2))
    }
}
