use log::{debug, info, warn};
use shared::{Channel, MessageCode, ProtocolError};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

const LOST_CONNECTION: &str = "Lost connection to the server. Disconnecting...\n";

/// Terminal side of a game session: the server drives, the client displays
/// and forwards keyboard lines.
pub struct Client<S> {
    channel: Channel<S>,
}

impl Client<TcpStream> {
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        info!("Connected to {}", stream.peer_addr()?);
        Ok(Self::new(stream))
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            channel: Channel::new(stream),
        }
    }

    /// Runs until the server sends EXIT, the connection drops, or `input`
    /// reaches end of file.
    pub async fn run<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<(), ProtocolError>
    where
        I: AsyncBufRead + Unpin,
        O: Write,
    {
        loop {
            let message = match self.channel.recv().await {
                Ok(message) => message,
                Err(e) if e.is_disconnect() => {
                    warn!("Connection lost: {}", e);
                    display(output, LOST_CONNECTION)?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            match message.code {
                MessageCode::Print => display(output, message.display_text())?,
                MessageCode::Input => {
                    display(output, message.display_text())?;

                    let mut line = String::new();
                    if input.read_line(&mut line).await? == 0 {
                        info!("Input closed, leaving the session");
                        return Ok(());
                    }

                    if let Err(e) = self.channel.send_data(&line).await {
                        if e.is_disconnect() {
                            display(output, LOST_CONNECTION)?;
                            return Ok(());
                        }
                        return Err(e);
                    }
                }
                MessageCode::Exit => {
                    display(output, message.display_text())?;
                    return Ok(());
                }
                MessageCode::Ack | MessageCode::Data => {
                    debug!("Ignoring {:?} from server", message.code);
                }
            }
        }
    }
}

fn display<O: Write>(output: &mut O, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes())?;
    output.flush()
}
