use anyhow::Context;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use tokio_stream::StreamExt;

use crate::{command, event};

use super::common::BoxedStream;

/// [CommandStream] is a stream of [crate::command::UserCommand]s sent by the client
///
/// The stream ends when the client sends a close frame or the socket is gone.
/// Control frames are consumed silently.
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing commands.
pub type CommandStream = BoxedStream<anyhow::Result<command::UserCommand>>;

/// [EventWriter] is a wrapper around the sending half of a [WebSocket] which writes [crate::event::Event]s to the client
pub struct EventWriter {
    writer: SplitSink<WebSocket, Message>,
}

impl EventWriter {
    pub fn new(writer: SplitSink<WebSocket, Message>) -> Self {
        Self { writer }
    }

    /// Send a [crate::event::Event] to the backing [WebSocket] as a single text frame
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, the frame may or may not have been handed to the socket.
    pub async fn write(&mut self, event: &event::Event) -> anyhow::Result<()> {
        let serialized = serde_json::to_string(event)?;

        self.writer
            .send(Message::Text(serialized))
            .await
            .context("could not write event to the client")?;

        Ok(())
    }

    /// Send a close frame and flush the socket
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.writer
            .close()
            .await
            .context("could not close the client socket")
    }
}

fn decode_frame(
    frame: Result<Message, axum::Error>,
) -> Option<anyhow::Result<command::UserCommand>> {
    match frame.context("could not read frame from the client") {
        Ok(Message::Text(text)) => Some(
            serde_json::from_str::<command::UserCommand>(&text)
                .context("failed to deserialize command from client"),
        ),
        Ok(Message::Binary(bytes)) => Some(
            serde_json::from_slice::<command::UserCommand>(&bytes)
                .context("failed to deserialize command from client"),
        ),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    }
}

/// Splits a WebSocket into a stream of commands and an event writer.
///
/// # Arguments
///
/// - `socket` - An upgraded [WebSocket] to split
pub fn split_websocket(socket: WebSocket) -> (CommandStream, EventWriter) {
    let (writer, reader) = futures::StreamExt::split(socket);

    (
        Box::pin(
            reader
                .take_while(|frame| !matches!(frame, Ok(Message::Close(_))))
                .filter_map(decode_frame),
        ),
        EventWriter::new(writer),
    )
}
