use chess::{Move, Square};
use protocol::{ContentType, Message, Packet};
use proptest::prelude::*;

fn content_type() -> impl Strategy<Value = ContentType> {
    prop::sample::select(ContentType::ALL.to_vec())
}

proptest! {
    #[test]
    fn packets_survive_the_wire(ct in content_type(), payload in "\\PC*") {
        let packet = Packet::new(ct, payload);
        prop_assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn move_text_survives_a_move_packet(from in 0u8..64, to in 0u8..64) {
        let mv = Move::new(Square::new(from).unwrap(), Square::new(to).unwrap());
        let bytes = Message::Move(mv.to_string()).into_packet().encode();
        let received = Message::from_packet(Packet::decode(&bytes).unwrap());
        let Some(Message::Move(text)) = received else {
            panic!("expected a move message, got {received:?}");
        };
        prop_assert_eq!(text.parse::<Move>().unwrap(), mv);
    }
}
