use thiserror::Error;

mod channel;

pub use channel::Channel;

pub const DEFAULT_PORT: u16 = 12345;
pub const MAX_FRAME_SIZE: usize = 2048;

/// Leading byte of every frame, telling the receiver what to do with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCode {
    Ack,
    Print,
    Input,
    Exit,
    Data,
}

impl MessageCode {
    pub fn as_byte(self) -> u8 {
        match self {
            MessageCode::Ack => b'1',
            MessageCode::Print => b'2',
            MessageCode::Input => b'3',
            MessageCode::Exit => b'4',
            MessageCode::Data => b'5',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'1' => Some(MessageCode::Ack),
            b'2' => Some(MessageCode::Print),
            b'3' => Some(MessageCode::Input),
            b'4' => Some(MessageCode::Exit),
            b'5' => Some(MessageCode::Data),
            _ => None,
        }
    }

    /// Whether the receiver owes an ACK before doing anything else.
    pub fn requires_ack(self) -> bool {
        !matches!(self, MessageCode::Ack | MessageCode::Data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub code: MessageCode,
    pub payload: String,
}

impl Message {
    pub fn new(code: MessageCode, payload: impl Into<String>) -> Self {
        Self {
            code,
            payload: payload.into(),
        }
    }

    /// Encodes the message as one frame, truncating the payload on a UTF-8
    /// boundary so the frame never exceeds `MAX_FRAME_SIZE`.
    pub fn encode(&self) -> Vec<u8> {
        let mut limit = self.payload.len().min(MAX_FRAME_SIZE - 1);
        while !self.payload.is_char_boundary(limit) {
            limit -= 1;
        }

        let mut frame = Vec::with_capacity(limit + 1);
        frame.push(self.code.as_byte());
        frame.extend_from_slice(&self.payload.as_bytes()[..limit]);
        frame
    }

    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&code, payload) = frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        let code = MessageCode::from_byte(code).ok_or(ProtocolError::UnknownCode(code))?;

        Ok(Self {
            code,
            payload: String::from_utf8_lossy(payload).into_owned(),
        })
    }

    /// The part of the payload a terminal shows: everything up to and
    /// including the first line feed.
    pub fn display_text(&self) -> &str {
        match self.payload.find('\n') {
            Some(end) => &self.payload[..=end],
            None => &self.payload,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("peer disconnected")]
    Disconnected,

    #[error("received an empty frame")]
    EmptyFrame,

    #[error("unknown message code {0:#04x}")]
    UnknownCode(u8),

    #[error("expected an acknowledgement, received {0:?}")]
    MissingAck(MessageCode),

    #[error("unexpected {0:?} message")]
    UnexpectedMessage(MessageCode),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// True when the session ended because the other side went away rather
    /// than because it spoke the protocol wrong.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ProtocolError::Disconnected => true,
            ProtocolError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
