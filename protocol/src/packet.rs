use std::fmt;

/// Length value the data-stream format uses for a null string.
const NULL_LENGTH: u32 = u32::MAX;

/// Payload kind, the first byte of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    None = 0,
    PlayerData = 1,
    WhitePlayerData = 2,
    BlackPlayerData = 3,
    Message = 4,
    ServerMessage = 5,
    Move = 6,
    Error = 7,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        Self::None,
        Self::PlayerData,
        Self::WhitePlayerData,
        Self::BlackPlayerData,
        Self::Message,
        Self::ServerMessage,
        Self::Move,
        ContentType::Error,
    ];
}

impl TryFrom<u8> for ContentType {
    type Error = PacketError;

    fn try_from(byte: u8) -> Result<Self, PacketError> {
        Self::ALL
            .get(byte as usize)
            .copied()
            .ok_or(PacketError::UnknownContentType(byte))
    }
}

impl From<ContentType> for u8 {
    fn from(ct: ContentType) -> Self {
        ct as u8
    }
}

/// One framed message: a content type and a string payload.
///
/// Wire form: content type byte, big-endian u32 byte length of the payload
/// including a trailing NUL, the UTF-8 bytes, the NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub content_type: ContentType,
    pub payload: String,
}

impl Packet {
    pub fn new(content_type: ContentType, payload: impl Into<String>) -> Self {
        Self {
            content_type,
            payload: payload.into(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let bytes = self.payload.as_bytes();
        let mut buf = Vec::with_capacity(1 + 4 + bytes.len() + 1);
        buf.push(self.content_type.into());
        buf.extend_from_slice(&(bytes.len() as u32 + 1).to_be_bytes());
        buf.extend_from_slice(bytes);
        buf.push(0);
        buf
    }

    /// Decode exactly one packet. Trailing bytes are an error.
    pub fn decode(buf: &[u8]) -> Result<Self, PacketError> {
        let (packet, used) = Self::decode_prefix(buf)?;
        if used != buf.len() {
            return Err(PacketError::TrailingBytes(buf.len() - used));
        }
        Ok(packet)
    }

    /// Decode the packet at the start of `buf`, returning it with the number
    /// of bytes consumed.
    pub fn decode_prefix(buf: &[u8]) -> Result<(Self, usize), PacketError> {
        let (&type_byte, rest) = buf.split_first().ok_or(PacketError::Truncated)?;
        let content_type = ContentType::try_from(type_byte)?;

        let len_bytes: [u8; 4] = rest
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(PacketError::Truncated)?;
        let len = u32::from_be_bytes(len_bytes);
        if len == NULL_LENGTH {
            return Ok((Self::new(content_type, ""), 5));
        }
        let len = len as usize;
        let body = rest.get(4..4 + len).ok_or(PacketError::Truncated)?;

        let payload = match body.split_last() {
            None => "",
            Some((&0, text)) => {
                std::str::from_utf8(text).map_err(|_| PacketError::InvalidUtf8)?
            }
            Some(_) => return Err(PacketError::MissingTerminator),
        };
        tracing::trace!(?content_type, payload, "Decoded packet");
        Ok((Self::new(content_type, payload), 5 + len))
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.content_type, self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("Packet is truncated")]
    Truncated,
    #[error("Unknown content type: {0}")]
    UnknownContentType(u8),
    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("Payload is missing its NUL terminator")]
    MissingTerminator,
    #[error("{0} unexpected bytes after packet")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_move_packet() {
        let packet = Packet::new(ContentType::Move, "e2e4");
        assert_eq!(
            packet.encode(),
            vec![6, 0, 0, 0, 5, b'e', b'2', b'e', b'4', 0]
        );
    }

    #[test]
    fn test_decode_move_packet() {
        let bytes = [6, 0, 0, 0, 5, b'e', b'2', b'e', b'4', 0];
        let packet = Packet::decode(&bytes).unwrap();
        assert_eq!(packet.content_type, ContentType::Move);
        assert_eq!(packet.payload, "e2e4");
    }

    #[test]
    fn test_null_and_empty_payloads() {
        let null = [1, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            Packet::decode(&null).unwrap(),
            Packet::new(ContentType::PlayerData, "")
        );
        let zero = [0, 0, 0, 0, 0];
        assert_eq!(Packet::decode(&zero).unwrap().payload, "");
        assert_eq!(
            Packet::new(ContentType::Message, "").encode(),
            vec![4, 0, 0, 0, 1, 0]
        );
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(Packet::decode(&[]), Err(PacketError::Truncated));
        assert_eq!(Packet::decode(&[6, 0, 0]), Err(PacketError::Truncated));
        assert_eq!(
            Packet::decode(&[6, 0, 0, 0, 5, b'e']),
            Err(PacketError::Truncated)
        );
        assert_eq!(
            Packet::decode(&[9, 0, 0, 0, 1, 0]),
            Err(PacketError::UnknownContentType(9))
        );
        assert_eq!(
            Packet::decode(&[6, 0, 0, 0, 2, 0xC3, 0]),
            Err(PacketError::InvalidUtf8)
        );
        assert_eq!(
            Packet::decode(&[6, 0, 0, 0, 2, b'a', b'b']),
            Err(PacketError::MissingTerminator)
        );
        assert_eq!(
            Packet::decode(&[6, 0, 0, 0, 1, 0, 7]),
            Err(PacketError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_decode_prefix_consumes_one_packet() {
        let mut stream = Packet::new(ContentType::Message, "hi").encode();
        stream.extend(Packet::new(ContentType::Move, "e7e5").encode());
        let (first, used) = Packet::decode_prefix(&stream).unwrap();
        assert_eq!(first.payload, "hi");
        let (second, _) = Packet::decode_prefix(&stream[used..]).unwrap();
        assert_eq!(second, Packet::new(ContentType::Move, "e7e5"));
    }
}
