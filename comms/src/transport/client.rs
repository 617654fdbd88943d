use anyhow::Context;
use futures::{stream::SplitSink, SinkExt};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::{command, event};

use super::common::BoxedStream;

/// A client side WebSocket connection to the server
pub type ClientWebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [EventStream] is a stream of [crate::event::Event]s sent by the server
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select]
/// without the risk of missing events.
pub type EventStream = BoxedStream<anyhow::Result<event::Event>>;

/// [CommandWriter] is a wrapper around the sending half of a WebSocket which writes [crate::command::UserCommand]s to the server
pub struct CommandWriter {
    writer: SplitSink<ClientWebSocket, Message>,
}

impl CommandWriter {
    pub fn new(writer: SplitSink<ClientWebSocket, Message>) -> Self {
        Self { writer }
    }

    /// Send a [crate::command::UserCommand] to the server as a single text frame
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, the frame may or may not have been handed to the socket.
    pub async fn write(&mut self, command: &command::UserCommand) -> anyhow::Result<()> {
        self.write_raw(serde_json::to_string(command)?).await
    }

    /// Send an arbitrary text frame, bypassing the command schema
    pub async fn write_raw(&mut self, text: String) -> anyhow::Result<()> {
        self.writer
            .send(Message::Text(text))
            .await
            .context("could not write to the server")?;

        Ok(())
    }

    /// Send a command encoded as JSON in a binary frame
    pub async fn write_binary(&mut self, command: &command::UserCommand) -> anyhow::Result<()> {
        self.writer
            .send(Message::Binary(serde_json::to_vec(command)?))
            .await
            .context("could not write to the server")?;

        Ok(())
    }

    /// Send a close frame to the server
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.writer
            .close()
            .await
            .context("could not close the server socket")
    }
}

fn decode_frame(
    frame: Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> Option<anyhow::Result<event::Event>> {
    match frame.context("could not read frame from the server") {
        Ok(Message::Text(text)) => Some(
            serde_json::from_str::<event::Event>(&text)
                .context("failed to deserialize event from the server"),
        ),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    }
}

/// Splits a WebSocket into a stream of events and a command writer.
///
/// # Arguments
///
/// - `stream` - A connected [ClientWebSocket] to split
pub fn split_websocket(stream: ClientWebSocket) -> (EventStream, CommandWriter) {
    let (writer, reader) = futures::StreamExt::split(stream);

    (
        Box::pin(
            reader
                .take_while(|frame| !matches!(frame, Ok(Message::Close(_))))
                .filter_map(decode_frame),
        ),
        CommandWriter::new(writer),
    )
}

/// Open a WebSocket to `url` and split it.
///
/// Fails with the HTTP status when the server refuses the upgrade.
pub async fn connect(url: &str) -> anyhow::Result<(EventStream, CommandWriter)> {
    let (stream, _response) = tokio_tungstenite::connect_async(url)
        .await
        .with_context(|| format!("failed to connect to '{}'", url))?;

    Ok(split_websocket(stream))
}
