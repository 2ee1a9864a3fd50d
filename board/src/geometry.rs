//! Square to grid mapping. Row 0 is the top of the rendered board.

use chess::{Square, SquareError};

/// Row/column of a cell in the 8x8 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    row: u8,
    col: u8,
}

impl GridCoord {
    pub fn new(row: u8, col: u8) -> Result<Self, SquareError> {
        if row > 7 || col > 7 {
            return Err(SquareError::OutOfRange(row.saturating_mul(8).saturating_add(col)));
        }
        Ok(Self { row, col })
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Row-major index into the cell array.
    pub fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    pub fn from_index(index: usize) -> Result<Self, SquareError> {
        if index >= Square::NUM {
            return Err(SquareError::OutOfRange(index.min(u8::MAX as usize) as u8));
        }
        Ok(Self {
            row: (index / 8) as u8,
            col: (index % 8) as u8,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub flipped: bool,
}

impl Orientation {
    pub fn new(flipped: bool) -> Self {
        Self { flipped }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Unflipped: white at the bottom, a-file on the left.
    /// Flipped: black at the bottom, h-file on the left.
    pub fn grid_of(self, square: Square) -> GridCoord {
        let (file, rank) = (square.file(), square.rank());
        if self.flipped {
            GridCoord {
                row: rank,
                col: 7 - file,
            }
        } else {
            GridCoord {
                row: 7 - rank,
                col: file,
            }
        }
    }

    pub fn square_at(self, coord: GridCoord) -> Square {
        let (file, rank) = if self.flipped {
            (7 - coord.col, coord.row)
        } else {
            (coord.col, 7 - coord.row)
        };
        Square::from_coords_masked(file, rank)
    }
}
