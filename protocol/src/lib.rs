//! Wire packets exchanged with the game server.

pub mod message;
pub mod packet;

pub use message::Message;
pub use packet::{ContentType, Packet, PacketError};
