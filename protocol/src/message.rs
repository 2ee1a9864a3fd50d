use crate::packet::{ContentType, Packet};

/// A packet interpreted by content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Identity handshake, sent by the client with its username on connect.
    PlayerData(String),
    /// The receiver plays white. Carries the opponent's name.
    WhitePlayerData(String),
    /// The receiver plays black. Carries the opponent's name.
    BlackPlayerData(String),
    Chat(String),
    ServerMessage(String),
    /// Move text as emitted by the board.
    Move(String),
    Error(String),
}

impl Message {
    /// `None` packets carry nothing to dispatch.
    pub fn from_packet(packet: Packet) -> Option<Self> {
        let Packet {
            content_type,
            payload,
        } = packet;
        let message = match content_type {
            ContentType::None => return None,
            ContentType::PlayerData => Self::PlayerData(payload),
            ContentType::WhitePlayerData => Self::WhitePlayerData(payload),
            ContentType::BlackPlayerData => Self::BlackPlayerData(payload),
            ContentType::Message => Self::Chat(payload),
            ContentType::ServerMessage => Self::ServerMessage(payload),
            ContentType::Move => Self::Move(payload),
            ContentType::Error => Self::Error(payload),
        };
        Some(message)
    }

    pub fn into_packet(self) -> Packet {
        let (content_type, payload) = match self {
            Self::PlayerData(p) => (ContentType::PlayerData, p),
            Self::WhitePlayerData(p) => (ContentType::WhitePlayerData, p),
            Self::BlackPlayerData(p) => (ContentType::BlackPlayerData, p),
            Self::Chat(p) => (ContentType::Message, p),
            Self::ServerMessage(p) => (ContentType::ServerMessage, p),
            Self::Move(p) => (ContentType::Move, p),
            Self::Error(p) => (ContentType::Error, p),
        };
        Packet::new(content_type, payload)
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::PlayerData(_) => ContentType::PlayerData,
            Self::WhitePlayerData(_) => ContentType::WhitePlayerData,
            Self::BlackPlayerData(_) => ContentType::BlackPlayerData,
            Self::Chat(_) => ContentType::Message,
            Self::ServerMessage(_) => ContentType::ServerMessage,
            Self::Move(_) => ContentType::Move,
            Self::Error(_) => ContentType::Error,
        }
    }

    /// The packet a client sends right after connecting.
    pub fn handshake(username: &str) -> Packet {
        Self::PlayerData(username.to_string()).into_packet()
    }
}
