//! Half-duplex message exchange over a byte stream.
//!
//! Every PRINT, INPUT and EXIT frame is answered with a one-byte ACK before
//! the receiver does anything else, and the sender does not return until it
//! has read that ACK. At most one unacknowledged frame is ever in flight, so
//! the transport never coalesces two display lines into one read.

use crate::{Message, MessageCode, ProtocolError, MAX_FRAME_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct Channel<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S> Channel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: vec![0u8; MAX_FRAME_SIZE],
        }
    }

    /// Writes one frame and, for codes that require it, waits for the peer's ACK.
    ///
    /// Returns the number of bytes written.
    pub async fn send(&mut self, code: MessageCode, payload: &str) -> Result<usize, ProtocolError> {
        let frame = Message::new(code, payload).encode();
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;

        if code.requires_ack() {
            self.wait_for_ack().await?;
        }

        Ok(frame.len())
    }

    /// Reads the next frame, acknowledging it first when its code asks for that.
    pub async fn recv(&mut self) -> Result<Message, ProtocolError> {
        let size = self.stream.read(&mut self.buffer).await?;
        if size == 0 {
            return Err(ProtocolError::Disconnected);
        }

        let message = Message::decode(&self.buffer[..size])?;
        if message.code.requires_ack() {
            self.write_ack().await?;
        }

        Ok(message)
    }

    pub async fn print(&mut self, text: &str) -> Result<(), ProtocolError> {
        self.send(MessageCode::Print, text).await.map(|_| ())
    }

    /// Sends an INPUT prompt and returns the peer's reply without its line terminator.
    pub async fn prompt(&mut self, text: &str) -> Result<String, ProtocolError> {
        self.send(MessageCode::Input, text).await?;

        loop {
            let reply = self.recv().await?;
            match reply.code {
                MessageCode::Data => {
                    return Ok(reply.payload.trim_end_matches(['\r', '\n']).to_string());
                }
                // Stray acknowledgement, nothing owed.
                MessageCode::Ack => continue,
                other => return Err(ProtocolError::UnexpectedMessage(other)),
            }
        }
    }

    pub async fn exit(&mut self, text: &str) -> Result<(), ProtocolError> {
        self.send(MessageCode::Exit, text).await.map(|_| ())
    }

    pub async fn send_data(&mut self, text: &str) -> Result<(), ProtocolError> {
        self.send(MessageCode::Data, text).await.map(|_| ())
    }

    async fn write_ack(&mut self) -> Result<(), ProtocolError> {
        self.stream.write_all(&[MessageCode::Ack.as_byte()]).await?;
        self.stream.flush().await?;
        Ok(())
    }

    // An ACK frame is a single byte; reading exactly one keeps any frame the
    // peer sends right after it intact for the next `recv`.
    async fn wait_for_ack(&mut self) -> Result<(), ProtocolError> {
        let mut code = [0u8; 1];
        if self.stream.read(&mut code).await? == 0 {
            return Err(ProtocolError::Disconnected);
        }

        match MessageCode::from_byte(code[0]) {
            Some(MessageCode::Ack) => Ok(()),
            Some(other) => Err(ProtocolError::MissingAck(other)),
            None => Err(ProtocolError::UnknownCode(code[0])),
        }
    }
}
