use std::{num::NonZeroUsize, sync::Arc};

use axum::extract::ws::WebSocket;
use comms::{
    event::{self, Event},
    transport::{
        self,
        server::{CommandStream, EventWriter},
    },
};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::room_manager::{MusicRoom, RoomManager, RoomWelcome};

use self::room_session::RoomSession;

mod room_session;

/// Given an upgraded socket and the room it asked for, handles the connection
/// until the client disconnects, sends something unreadable, falls too far behind,
/// or the server shuts down. The client is always unregistered on the way out.
pub async fn handle_user_session(
    room_manager: Arc<RoomManager>,
    room: Arc<MusicRoom>,
    outbound_capacity: NonZeroUsize,
    mut quit_rx: broadcast::Receiver<()>,
    socket: WebSocket,
) -> anyhow::Result<()> {
    // Split the socket into a command stream and an event writer with better ergonomics
    let (mut commands, event_writer) = transport::server::split_websocket(socket);
    let (outbound_tx, outbound_rx) = mpsc::channel(outbound_capacity.get());

    // The room may have been destroyed between the lookup and the upgrade
    let (handle, welcome) = match room.add_client(outbound_tx).await {
        Ok(joined) => joined,
        Err(e) => {
            info!(room = %room.code(), "refusing connection: {}", e);
            return event_writer.close().await;
        }
    };

    let mut session = RoomSession::new(handle, outbound_rx);
    let result = run_session(
        &mut session,
        &mut commands,
        event_writer,
        welcome,
        &mut quit_rx,
    )
    .await;

    session.leave(&room_manager).await;

    result
}

async fn run_session(
    session: &mut RoomSession,
    commands: &mut CommandStream,
    mut event_writer: EventWriter,
    welcome: RoomWelcome,
    quit_rx: &mut broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    // Welcome the client with the queue and how many are listening
    event_writer
        .write(&Event::Queue(event::QueueEvent {
            queue: welcome.queue,
        }))
        .await?;
    event_writer
        .write(&Event::Joined(event::JoinedEvent {
            users: welcome.users,
        }))
        .await?;

    loop {
        tokio::select! {
            // Pending events are written before the next command is read,
            // otherwise a client pipelining commands fills its own outbound queue
            biased;

            // Events broadcast in the room are written to the client in order
            event = session.recv() => match event {
                Some(event) => event_writer.write(&event).await?,
                None => {
                    warn!(room = %session.room_code(), "client could not keep up and was dropped from the room");
                    break;
                }
            },
            cmd = commands.next() => match cmd {
                Some(Ok(cmd)) => session.handle_user_command(cmd).await,
                // A malformed envelope or a broken socket ends the session, nothing is reported back
                Some(Err(e)) => {
                    debug!(room = %session.room_code(), "closing connection: {:#}", e);
                    break;
                }
                None => break,
            },
            // The server is shutting down, there is nobody left to notify
            Ok(_) = quit_rx.recv() => {
                debug!(room = %session.room_code(), "server shutting down, closing connection");
                break;
            }
        }
    }

    if let Err(e) = event_writer.close().await {
        debug!("socket was already gone: {:#}", e);
    }

    Ok(())
}
