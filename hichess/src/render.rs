//! Plain-text rendering of a session snapshot.
//!
//! Each cell is three characters wide: the piece letter (FEN case, `.` for
//! an empty square) between two brackets telling its state. `[ ]` is the
//! selected piece, `( )` a legal destination, `< >` a mark.

use std::fmt::Write;

use crate::move_list::MoveList;
use crate::session::{CellSnapshot, SessionSnapshot};

const FILES: usize = 8;

fn cell_text(cell: &CellSnapshot) -> String {
    let piece = cell.piece.map_or('.', |p| p.to_fen_char());
    let (open, close) = if cell.checked {
        ('[', ']')
    } else if cell.highlighted {
        ('(', ')')
    } else if cell.marked {
        ('<', '>')
    } else {
        (' ', ' ')
    };
    format!("{open}{piece}{close}")
}

/// The grid as the player sees it, rank labels on the left and file labels
/// underneath, both following the orientation.
pub fn render_board(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    for row in snapshot.cells.chunks(FILES) {
        let rank = row.first().map_or(0, |c| c.square.rank() + 1);
        let _ = write!(out, "{rank} ");
        for cell in row {
            out.push_str(&cell_text(cell));
        }
        out.push('\n');
    }
    out.push_str("  ");
    if let Some(bottom) = snapshot.cells.rchunks(FILES).next() {
        for cell in bottom {
            let _ = write!(out, " {} ", (b'a' + cell.square.file()) as char);
        }
    }
    out.push('\n');
    out
}

/// Numbered two-column move table. The last move shown on the board is
/// starred.
pub fn render_move_list(list: &MoveList) -> String {
    let current = list.current_cell();
    let mut out = String::new();
    for (row, (white, black)) in list.rows().into_iter().enumerate() {
        let star = |col: usize| if current == Some((row, col)) { "*" } else { " " };
        let white = white.unwrap_or("...");
        let _ = write!(out, "{:>3}. {:<7}{}", row + 1, white, star(0));
        if let Some(black) = black {
            let _ = write!(out, " {:<7}{}", black, star(1));
        }
        out.push('\n');
    }
    out
}

/// One-line summary of whose turn it is and where the view stands.
pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut status = format!("{} to move", snapshot.side_to_move);
    match snapshot.outcome {
        chess::Outcome::Ongoing => {}
        chess::Outcome::Checkmate { winner } => {
            let _ = write!(status, ", checkmate, {winner} wins");
        }
        chess::Outcome::Draw => status.push_str(", draw"),
    }
    if !snapshot.is_live {
        let _ = write!(
            status,
            " (viewing move {} of {})",
            snapshot.ply, snapshot.total_moves
        );
    }
    if snapshot.engine_thinking {
        status.push_str(" [engine thinking]");
    }
    if let Some(opponent) = &snapshot.opponent {
        let _ = write!(status, " vs {opponent}");
    }
    status
}

#[cfg(test)]
mod tests {
    use board::{AccessibleSides, BoardConfig, BoardController};
    use chess::Square;

    use super::*;

    fn snapshot(board: &BoardController, list: &MoveList) -> SessionSnapshot {
        SessionSnapshot::capture(board, list, false, None, false)
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_start_position() {
        let board = BoardController::new(BoardConfig::default()).unwrap();
        let text = render_board(&snapshot(&board, &MoveList::new()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r  n  b  q  k  b  n  r ");
        assert_eq!(lines[4], "4  .  .  .  .  .  .  .  . ");
        assert_eq!(lines[7], "1  R  N  B  Q  K  B  N  R ");
        assert_eq!(lines[8], "   a  b  c  d  e  f  g  h ");
    }

    #[test]
    fn test_flipped_labels() {
        let board = BoardController::new(BoardConfig {
            flipped: true,
            ..Default::default()
        })
        .unwrap();
        let text = render_board(&snapshot(&board, &MoveList::new()));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("1 "));
        assert!(lines[7].starts_with("8 "));
        assert_eq!(lines[8], "   h  g  f  e  d  c  b  a ");
    }

    #[test]
    fn test_selection_and_marks() {
        let mut board = BoardController::new(BoardConfig {
            sides: AccessibleSides::Both,
            ..Default::default()
        })
        .unwrap();
        board.set_marked(sq("a5"), true);
        let text = render_board(&snapshot(&board, &MoveList::new()));
        assert!(text.lines().nth(3).unwrap().starts_with("5 <.>"));

        board.click(sq("e2")).unwrap();
        let text = render_board(&snapshot(&board, &MoveList::new()));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[6].contains("[P]"));
        assert_eq!(lines[5].matches("(.)").count(), 1);
        assert_eq!(lines[4].matches("(.)").count(), 1);
    }

    #[test]
    fn test_move_list_table() {
        let mut list = MoveList::new();
        for mv in ["e2e4", "e7e5", "g1f3"] {
            list.add_move(mv);
        }
        list.to_previous();
        assert_eq!(
            render_move_list(&list),
            "  1. e2e4     e7e5   *\n  2. g1f3    \n"
        );
    }

    #[test]
    fn test_move_list_from_black() {
        let mut list = MoveList::starting_with(chess::PieceColor::Black);
        list.add_move("e7e5");
        list.add_move("g1f3");
        assert_eq!(
            render_move_list(&list),
            "  1. ...      e7e5    \n  2. g1f3   *\n"
        );
    }

    #[test]
    fn test_status_line() {
        let board = BoardController::new(BoardConfig {
            fen: Some("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1".to_string()),
            ..Default::default()
        })
        .unwrap();
        let status = render_status(&snapshot(&board, &MoveList::new()));
        assert_eq!(status, "black to move, checkmate, white wins");
    }
}
