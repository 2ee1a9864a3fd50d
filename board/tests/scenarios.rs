use std::sync::{Arc, Mutex};

use board::{
    AccessibleSides, BoardConfig, BoardController, BoardError, BoardEvent, ClickOutcome, EventKind,
    GridCoord,
};
use chess::{Move, Piece, PieceColor, PieceKind, Square, STARTING_FEN};

const OPERA_GAME: [&str; 33] = [
    "e2e4", "e7e5", "g1f3", "d7d6", "d2d4", "c8g4", "d4e5", "g4f3", "d1f3", "d6e5", "f1c4",
    "g8f6", "f3b3", "d8e7", "b1c3", "c7c6", "c1g5", "b7b5", "c3b5", "c6b5", "c4b5", "b8d7",
    "e1c1", "a8d8", "d1d7", "d8d7", "h1d1", "e7e6", "b5d7", "f6d7", "b3b8", "d7b8", "d1d8",
];

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn mv(s: &str) -> Move {
    s.parse().unwrap()
}

fn board(config: BoardConfig) -> BoardController {
    BoardController::new(config).unwrap()
}

fn standard() -> BoardController {
    board(BoardConfig::default())
}

fn record(board: &mut BoardController) -> Arc<Mutex<Vec<BoardEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    board.subscribe_all(Box::new(move |e| sink.lock().unwrap().push(e.clone())));
    events
}

#[test]
fn test_e2e4_scenario() {
    let mut board = standard();
    let events = record(&mut board);

    board.push(mv("e2e4")).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![BoardEvent::MoveMade("e2e4".to_string())]
    );
    assert!(board.cell_at_square(sq("e2")).is_plain());
    assert_eq!(
        board.cell_at_square(sq("e4")).occupant(),
        Some(Piece::new(PieceKind::Pawn, PieceColor::White))
    );
    assert_eq!(board.position().side_to_move(), PieceColor::Black);
}

#[test]
fn test_promotion_defaults_to_queen() {
    let mut board = board(BoardConfig {
        fen: Some("7k/P7/8/8/8/8/8/K7 w - - 0 1".to_string()),
        ..Default::default()
    });
    let a7a8 = mv("a7a8");
    assert!(board.is_pseudo_legal_promotion(a7a8));
    assert!(!board.is_pseudo_legal_promotion(mv("a1a2")));

    let applied = board.push(a7a8).unwrap();
    assert_eq!(applied.promotion, Some(PieceKind::Queen));
    assert_eq!(
        board.cell_at_square(sq("a8")).occupant(),
        Some(Piece::new(PieceKind::Queen, PieceColor::White))
    );
}

#[test]
fn test_promotion_by_click() {
    let mut board = board(BoardConfig {
        fen: Some("7k/P7/8/8/8/8/8/K7 w - - 0 1".to_string()),
        sides: AccessibleSides::OnlyWhite,
        ..Default::default()
    });
    board.click(sq("a7")).unwrap();
    assert_eq!(
        board.click(sq("a8")).unwrap(),
        ClickOutcome::Moved(mv("a7a8q"))
    );
}

#[test]
fn test_white_only_accessibility() {
    let board = board(BoardConfig {
        sides: AccessibleSides::OnlyWhite,
        ..Default::default()
    });
    for (_, cell) in board.cells() {
        match cell.occupant() {
            Some(p) if p.color == PieceColor::White => {
                assert!(cell.is_accessible());
                assert!(cell.is_checkable());
            }
            _ => {
                assert!(!cell.is_accessible());
                assert!(!cell.is_checkable());
            }
        }
    }
}

#[test]
fn test_changing_accessibility_resyncs() {
    let mut board = standard();
    assert!(!board.cell_at_square(sq("e7")).is_checkable());
    board.set_accessible_sides(AccessibleSides::OnlyBlack);
    assert!(board.cell_at_square(sq("e7")).is_checkable());
    assert!(!board.cell_at_square(sq("e2")).is_checkable());
}

#[test]
fn test_illegal_moves_leave_position_untouched() {
    let mut board = standard();
    let events = record(&mut board);
    let start = board.position().piece_map();

    for text in ["a1d6", "b2b6", "c2d5", "a7a6", "e1g1"] {
        let result = board.push(mv(text));
        assert_eq!(result, Err(BoardError::IllegalMove(mv(text))));
        assert_eq!(board.position().piece_map(), start);
        assert_eq!(board.cell_piece_map(), start);
    }
    assert_eq!(board.fen(), STARTING_FEN);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_push_text_rejects_garbage() {
    let mut board = standard();
    assert!(matches!(
        board.push_text("hello"),
        Err(BoardError::InvalidMoveText(_))
    ));
    assert_eq!(board.push_text("e2e4"), Ok(mv("e2e4")));
}

#[test]
fn test_replay_keeps_cells_in_sync() {
    let mut board = standard();
    let events = record(&mut board);

    for text in OPERA_GAME {
        board.push_text(text).unwrap();
        assert_eq!(board.cell_piece_map(), board.position().piece_map());
    }

    let events = events.lock().unwrap();
    assert_eq!(
        events[events.len() - 2..],
        [
            BoardEvent::Checkmate {
                winner: PieceColor::White
            },
            BoardEvent::GameOver
        ]
    );
}

#[test]
fn test_stalemate_emits_draw_then_game_over() {
    let mut board = board(BoardConfig {
        fen: Some("7k/8/5Q1K/8/8/8/8/8 w - - 0 1".to_string()),
        ..Default::default()
    });
    let events = record(&mut board);

    board.push(mv("f6f7")).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            BoardEvent::MoveMade("f6f7".to_string()),
            BoardEvent::Draw,
            BoardEvent::GameOver,
        ]
    );
}

#[test]
fn test_quiet_move_emits_no_game_end() {
    let mut board = board(BoardConfig {
        fen: Some("7k/8/5Q1K/8/8/8/8/8 w - - 0 1".to_string()),
        ..Default::default()
    });
    let events = record(&mut board);

    board.push(mv("f6f1")).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![BoardEvent::MoveMade("f6f1".to_string())]
    );
}

#[test]
fn test_capture_to_bare_kings_emits_draw() {
    let mut board = board(BoardConfig {
        fen: Some("8/8/8/4k3/3R4/8/8/4K3 b - - 0 1".to_string()),
        ..Default::default()
    });
    let events = record(&mut board);

    board.push(mv("e5d4")).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            BoardEvent::MoveMade("e5d4".to_string()),
            BoardEvent::Draw,
            BoardEvent::GameOver,
        ]
    );
}

#[test]
fn test_castling_by_click_uses_king_move() {
    let mut board = board(BoardConfig {
        fen: Some("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".to_string()),
        sides: AccessibleSides::Both,
        ..Default::default()
    });
    board.click(sq("e1")).unwrap();
    assert!(board.highlighted_squares().contains(&sq("g1")));
    assert_eq!(
        board.click(sq("g1")).unwrap(),
        ClickOutcome::Moved(mv("e1g1"))
    );
    assert_eq!(
        board.cell_at_square(sq("f1")).occupant(),
        Some(Piece::new(PieceKind::Rook, PieceColor::White))
    );
}

#[test]
fn test_unchecked_moves() {
    let mut board = standard();
    let events = record(&mut board);
    board.move_piece_at(sq("e2"), sq("e4"));
    board.move_piece(mv("e7e5"));
    assert_eq!(board.ply(), 2);
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            BoardEvent::MoveMade("e2e4".to_string()),
            BoardEvent::MoveMade("e7e5".to_string())
        ]
    );
}

#[test]
fn test_pop_unpop_and_navigation() {
    let mut board = standard();
    for text in &OPERA_GAME[..6] {
        board.push_text(text).unwrap();
    }
    let events = record(&mut board);

    assert_eq!(board.pop(), Some(mv("c8g4")));
    assert_eq!(board.ply(), 5);
    assert_eq!(board.total_moves(), 6);
    assert!(!board.is_live());

    assert_eq!(board.unpop(), Some(mv("c8g4")));
    assert!(board.is_live());
    assert_eq!(board.unpop(), None);

    board.go_to_move(2);
    assert_eq!(board.ply(), 2);
    assert_eq!(board.cell_piece_map(), board.position().piece_map());
    board.go_to_start();
    assert_eq!(board.fen(), STARTING_FEN);
    assert_eq!(board.pop(), None);
    board.go_to_end();
    assert_eq!(board.ply(), 6);
    board.go_to_move(100);
    assert_eq!(board.ply(), 6);

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            BoardEvent::HistoryNavigated { ply: 5, total: 6 },
            BoardEvent::HistoryNavigated { ply: 6, total: 6 },
            BoardEvent::HistoryNavigated { ply: 2, total: 6 },
            BoardEvent::HistoryNavigated { ply: 0, total: 6 },
            BoardEvent::HistoryNavigated { ply: 6, total: 6 },
        ]
    );
}

#[test]
fn test_fresh_move_truncates_history() {
    let mut board = standard();
    board.push_text("e2e4").unwrap();
    board.push_text("e7e5").unwrap();
    board.pop();
    board.push_text("c7c5").unwrap();
    assert!(board.is_live());
    assert_eq!(board.total_moves(), 2);
    assert_eq!(board.game_moves(), vec![mv("e2e4"), mv("c7c5")]);
}

#[test]
fn test_block_on_pop_preserves_history() {
    let mut board = board(BoardConfig {
        sides: AccessibleSides::Both,
        block_on_pop: true,
        ..Default::default()
    });
    board.push_text("e2e4").unwrap();
    board.push_text("e7e5").unwrap();
    board.go_to_start();

    assert_eq!(board.click(sq("d2")).unwrap(), ClickOutcome::Blocked);
    assert_eq!(board.total_moves(), 2);

    // Checked against the live end: white to move there, so d7d5 fails.
    assert_eq!(
        board.push(mv("d7d5")),
        Err(BoardError::IllegalMove(mv("d7d5")))
    );
    assert_eq!(board.ply(), 0);

    board.push_text("g1f3").unwrap();
    assert!(board.is_live());
    assert_eq!(
        board.game_moves(),
        vec![mv("e2e4"), mv("e7e5"), mv("g1f3")]
    );
}

#[test]
fn test_marks_notify_every_time() {
    let mut board = standard();
    let marks = Arc::new(Mutex::new(Vec::new()));
    let sink = marks.clone();
    board.subscribe(
        EventKind::CellMarked,
        Box::new(move |e| sink.lock().unwrap().push(e.clone())),
    );
    board.set_marked(sq("d4"), false);
    board.set_marked(sq("d4"), false);
    board.right_click(sq("d4"));
    assert_eq!(
        *marks.lock().unwrap(),
        vec![
            BoardEvent::CellMarked {
                square: sq("d4"),
                marked: false
            },
            BoardEvent::CellMarked {
                square: sq("d4"),
                marked: false
            },
            BoardEvent::CellMarked {
                square: sq("d4"),
                marked: true
            },
        ]
    );
}

#[test]
fn test_flip_moves_pieces_on_grid() {
    let mut board = standard();
    let top_left = GridCoord::new(0, 0).unwrap();
    assert_eq!(board.square_of(top_left), sq("a8"));
    assert_eq!(
        board.cell(top_left).occupant(),
        Some(Piece::new(PieceKind::Rook, PieceColor::Black))
    );

    board.flip();
    assert!(board.is_flipped());
    assert_eq!(board.square_of(top_left), sq("h1"));
    assert_eq!(
        board.cell(top_left).occupant(),
        Some(Piece::new(PieceKind::Rook, PieceColor::White))
    );
    assert_eq!(board.cell_piece_map(), board.position().piece_map());
}

#[test]
fn test_reset_and_empty_board() {
    let mut board = board(BoardConfig {
        fen: None,
        sides: AccessibleSides::Both,
        ..Default::default()
    });
    assert!(board.cell_piece_map().is_empty());
    assert_eq!(board.click(sq("e2")).unwrap(), ClickOutcome::Ignored);

    board
        .add_piece(sq("e2"), Piece::new(PieceKind::Pawn, PieceColor::White))
        .unwrap();
    assert_eq!(board.click(sq("e2")).unwrap(), ClickOutcome::Selected(sq("e2")));
    assert!(board.highlighted_squares().is_empty());
    assert!(board.push(mv("e2e4")).is_err());

    board.reset();
    assert_eq!(board.fen(), STARTING_FEN);
    assert_eq!(board.cell_piece_map().len(), 32);

    board.push_text("e2e4").unwrap();
    board.pop();
    board.set_fen(None).unwrap();
    assert_eq!(board.total_moves(), 0);
    assert!(board.cell_piece_map().is_empty());
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut board = standard();
    let events = Arc::new(Mutex::new(0));
    let sink = events.clone();
    let id = board.subscribe(
        EventKind::MoveMade,
        Box::new(move |_| *sink.lock().unwrap() += 1),
    );
    board.push_text("e2e4").unwrap();
    assert!(board.unsubscribe(id));
    board.push_text("e7e5").unwrap();
    assert_eq!(*events.lock().unwrap(), 1);
}
