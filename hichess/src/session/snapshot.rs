use board::{AccessibleSides, BoardController, Cell};
use chess::{Outcome, Piece, PieceColor, Square};

use crate::move_list::MoveList;

/// Complete, immutable snapshot of session state.
/// Sent to subscribers after every command and on subscribe.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub fen: String,
    pub side_to_move: PieceColor,
    pub outcome: Outcome,
    pub flipped: bool,
    pub sides: AccessibleSides,
    pub ply: usize,
    pub total_moves: usize,
    pub is_live: bool,
    /// The 64 cells in grid order, row by row from the top left.
    pub cells: Vec<CellSnapshot>,
    pub move_list: MoveList,
    pub online: bool,
    pub opponent: Option<String>,
    pub engine_thinking: bool,
}

/// What one grid cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSnapshot {
    pub square: Square,
    pub piece: Option<Piece>,
    pub accessible: bool,
    pub checked: bool,
    pub highlighted: bool,
    pub marked: bool,
}

impl CellSnapshot {
    fn new(square: Square, cell: &Cell) -> Self {
        Self {
            square,
            piece: cell.occupant(),
            accessible: cell.is_accessible(),
            checked: cell.is_checked(),
            highlighted: cell.is_highlighted(),
            marked: cell.is_marked(),
        }
    }
}

impl SessionSnapshot {
    pub(crate) fn capture(
        board: &BoardController,
        move_list: &MoveList,
        online: bool,
        opponent: Option<String>,
        engine_thinking: bool,
    ) -> Self {
        let mut cells: Vec<(usize, CellSnapshot)> = board
            .cells()
            .map(|(sq, cell)| {
                (
                    board.grid_coordinate_of(sq).index(),
                    CellSnapshot::new(sq, cell),
                )
            })
            .collect();
        cells.sort_by_key(|(index, _)| *index);

        let position = board.position();
        Self {
            fen: board.fen(),
            side_to_move: position.side_to_move(),
            outcome: position.outcome(),
            flipped: board.is_flipped(),
            sides: board.accessible_sides(),
            ply: board.ply(),
            total_moves: board.total_moves(),
            is_live: board.is_live(),
            cells: cells.into_iter().map(|(_, cell)| cell).collect(),
            move_list: move_list.clone(),
            online,
            opponent,
            engine_thinking,
        }
    }

    pub fn cell(&self, square: Square) -> Option<&CellSnapshot> {
        self.cells.iter().find(|c| c.square == square)
    }

    pub fn selected(&self) -> Option<Square> {
        self.cells.iter().find(|c| c.checked).map(|c| c.square)
    }

    pub fn highlighted(&self) -> Vec<Square> {
        self.squares_where(|c| c.highlighted)
    }

    pub fn marked(&self) -> Vec<Square> {
        self.squares_where(|c| c.marked)
    }

    /// Squares in a1..h8 order.
    fn squares_where(&self, pred: impl Fn(&CellSnapshot) -> bool) -> Vec<Square> {
        let mut squares: Vec<Square> = self
            .cells
            .iter()
            .filter(|c| pred(c))
            .map(|c| c.square)
            .collect();
        squares.sort();
        squares
    }
}
