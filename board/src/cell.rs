use chess::Piece;

/// One interactive unit of the board grid.
///
/// Cells never know their square; the controller derives it from the cell's
/// grid position and the current orientation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    occupant: Option<Piece>,
    accessible: bool,
    checkable: bool,
    checked: bool,
    highlighted: bool,
    marked: bool,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self) -> Option<Piece> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn is_plain(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Whether a click toggles selection. Highlighted cells are never
    /// checkable: a click there means "move here".
    pub fn is_checkable(&self) -> bool {
        self.checkable
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Place (or clear) the occupant. Placing a piece re-derives
    /// checkability from the accessibility flag.
    pub fn set_occupant(&mut self, piece: Option<Piece>) {
        self.occupant = piece;
        if piece.is_some() {
            self.set_checkable(self.accessible && !self.highlighted);
        }
    }

    /// Clear occupant, accessibility and checkability. Idempotent.
    pub fn reset_to_plain(&mut self) {
        self.accessible = false;
        self.set_checkable(false);
        self.occupant = None;
    }

    /// Takes effect at the next highlight/unhighlight or occupant change.
    pub fn set_accessible(&mut self, accessible: bool) {
        self.accessible = accessible;
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
        if highlighted {
            self.set_checkable(false);
        } else {
            self.set_checkable(self.accessible);
        }
    }

    /// Returns the new value, which callers report even when unchanged.
    pub fn set_marked(&mut self, marked: bool) -> bool {
        self.marked = marked;
        self.marked
    }

    /// No effect on a cell that is not checkable.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked && self.checkable;
    }

    /// Flip the checked state. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_checked(!self.checked);
        self.checked
    }

    fn set_checkable(&mut self, checkable: bool) {
        self.checkable = checkable;
        if !checkable {
            self.checked = false;
        }
    }

    /// Style identity of the occupant, e.g. `cell_white_pawn`.
    pub fn piece_tag(&self) -> Option<String> {
        self.occupant
            .map(|p| format!("cell_{}_{}", p.color.as_str(), p.kind.as_str()))
    }

    /// Key the presentation layer styles the cell by. Derived only from
    /// occupant, highlight and mark.
    pub fn style_key(&self) -> String {
        let mut key = self.piece_tag().unwrap_or_else(|| "cell_plain".to_string());
        if self.highlighted {
            key.push_str(":highlighted");
        }
        if self.marked {
            key.push_str(":marked");
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{PieceColor, PieceKind};

    const WHITE_PAWN: Piece = Piece::new(PieceKind::Pawn, PieceColor::White);

    #[test]
    fn test_new_cell_is_plain() {
        let cell = Cell::new();
        assert!(cell.is_plain());
        assert!(!cell.is_accessible());
        assert!(!cell.is_highlighted());
        assert!(!cell.is_checkable());
        assert_eq!(cell.piece_tag(), None);
        assert_eq!(cell.style_key(), "cell_plain");
    }

    #[test]
    fn test_occupant_follows_accessibility() {
        let mut cell = Cell::new();
        cell.set_occupant(Some(WHITE_PAWN));
        assert!(cell.is_occupied());
        assert!(!cell.is_checkable());

        cell.set_accessible(true);
        assert!(!cell.is_checkable());
        cell.set_occupant(Some(WHITE_PAWN));
        assert!(cell.is_checkable());
        assert_eq!(cell.piece_tag().as_deref(), Some("cell_white_pawn"));
    }

    #[test]
    fn test_reset_to_plain() {
        let mut cell = Cell::new();
        cell.set_accessible(true);
        cell.set_occupant(Some(WHITE_PAWN));
        cell.set_checked(true);
        assert!(cell.is_checked());

        cell.reset_to_plain();
        assert!(cell.is_plain());
        assert!(!cell.is_accessible());
        assert!(!cell.is_checkable());
        assert!(!cell.is_checked());
        cell.reset_to_plain();
        assert!(cell.is_plain());
    }

    #[test]
    fn test_highlight_disables_checking() {
        let mut cell = Cell::new();
        cell.set_accessible(true);
        cell.set_occupant(Some(WHITE_PAWN));
        cell.set_checked(true);

        cell.set_highlighted(true);
        assert!(!cell.is_checkable());
        assert!(!cell.is_checked());
        assert!(!cell.toggle());

        cell.set_highlighted(false);
        assert!(cell.is_checkable());
        assert!(cell.toggle());
    }

    #[test]
    fn test_mark_is_orthogonal() {
        let mut cell = Cell::new();
        assert!(cell.set_marked(true));
        assert!(cell.set_marked(true));
        cell.set_highlighted(true);
        assert!(cell.is_marked());
        assert_eq!(cell.style_key(), "cell_plain:highlighted:marked");
        assert!(!cell.set_marked(false));
    }
}
