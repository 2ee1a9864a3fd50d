use chess::{Move, Outcome, Position, Square, STARTING_FEN};
use proptest::prelude::*;

fn square() -> impl Strategy<Value = Square> {
    (0u8..64).prop_map(|i| Square::new(i).unwrap())
}

proptest! {
    #[test]
    fn move_text_round_trips(from in square(), to in square(), promo in 0usize..5) {
        let mut mv = Move::new(from, to);
        if promo > 0 {
            mv = mv.with_promotion(chess::PieceKind::ALL[promo]);
        }
        let text = mv.to_string();
        prop_assert_eq!(text.parse::<Move>().unwrap(), mv);
    }

    #[test]
    fn random_playout_unwinds_to_start(choices in prop::collection::vec(any::<prop::sample::Index>(), 0..60)) {
        let mut pos = Position::new();
        let mut played = Vec::new();
        for choice in choices {
            if pos.outcome() != Outcome::Ongoing {
                break;
            }
            let moves = pos.legal_moves();
            let mv = moves[choice.index(moves.len())];
            prop_assert!(pos.is_legal(mv));
            pos.push(mv).unwrap();
            played.push(mv);
        }
        prop_assert_eq!(pos.move_stack(), played.clone());

        // Replaying the same moves unchecked reaches the same position.
        let mut replay = Position::new();
        for mv in &played {
            replay.push_unchecked(*mv);
        }
        prop_assert_eq!(replay.fen(), pos.fen());

        while let Some(mv) = pos.pop() {
            prop_assert_eq!(Some(mv), played.pop());
        }
        prop_assert_eq!(pos.fen(), STARTING_FEN);
    }
}
