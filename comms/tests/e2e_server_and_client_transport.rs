use std::sync::{Arc, Mutex};

use axum::{extract::WebSocketUpgrade, response::IntoResponse, routing::get, Router};
use comms::{
    command::{self, UserCommand},
    event::{self, Event},
    transport,
};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_stream::StreamExt;

#[tokio::test]
async fn assert_server_client_transport() {
    let (commands_tx, commands_rx) = oneshot::channel();
    let address = spawn_server(commands_tx).await;

    let client_collected_events = execute_client(&format!("ws://{}/ws", address)).await;
    let server_collected_commands = commands_rx.await.expect("server dropped the result");

    assert!(server_collected_commands.is_ok());
    assert!(client_collected_events.is_ok());

    assert_eq!(
        server_collected_commands.unwrap(),
        vec![
            UserCommand::QueueAdd(command::TrackCommand {
                track_id: "track-1".into(),
            }),
            UserCommand::Play(command::PlayCommand { track_id: None }),
            UserCommand::Unrecognized("shuffle".into()),
            UserCommand::Pause,
        ]
    );

    assert_eq!(
        client_collected_events.unwrap(),
        vec![
            Event::Queue(event::QueueEvent { queue: Vec::new() }),
            Event::Joined(event::JoinedEvent { users: 1 }),
        ]
    );
}

async fn spawn_server(
    commands_tx: oneshot::Sender<anyhow::Result<Vec<UserCommand>>>,
) -> std::net::SocketAddr {
    // bind to an ephemeral port to wait for the client connection
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to the port");
    let address = listener.local_addr().expect("listener has no address");

    let commands_tx = Arc::new(Mutex::new(Some(commands_tx)));
    let app = Router::new().route(
        "/ws",
        get(move |ws: WebSocketUpgrade| {
            let commands_tx = commands_tx.lock().unwrap().take();

            async move {
                ws.on_upgrade(move |socket| async move {
                    let result = execute_server(socket).await;
                    if let Some(commands_tx) = commands_tx {
                        let _ = commands_tx.send(result);
                    }
                })
                .into_response()
            }
        }),
    );

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });

    address
}

async fn execute_server(
    socket: axum::extract::ws::WebSocket,
) -> anyhow::Result<Vec<command::UserCommand>> {
    // break the client connection into higher level API for ease of use
    let (mut command_stream, mut event_writer) = transport::server::split_websocket(socket);
    // store commands received from the client
    let mut collected_commands = Vec::new();

    // welcome the client with the initial room state
    event_writer
        .write(&Event::Queue(event::QueueEvent { queue: Vec::new() }))
        .await?;
    event_writer
        .write(&Event::Joined(event::JoinedEvent { users: 1 }))
        .await?;

    // listen for commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        match result {
            // client has sent a valid command which we could read and parse
            Ok(command) => collected_commands.push(command),
            // client has sent a command which we could not read or parse
            // could be a bug in the client, malicious client, breaking api changes etc.
            Err(e) => return Err(anyhow::anyhow!("failed to read command: {}", e)),
        }
    }

    Ok(collected_commands)
}

async fn execute_client(url: &str) -> anyhow::Result<Vec<event::Event>> {
    // create a client connection to the server and split it
    let (mut event_stream, mut command_writer) = transport::client::connect(url).await?;
    // store events received from the server
    let mut collected_events = Vec::new();

    // read the two welcome events from the server
    for _ in 0..2 {
        match event_stream.next().await {
            // server has sent a valid event which we could read and parse
            Some(Ok(event)) => collected_events.push(event),
            // server has sent an event which we could not read or parse
            // could be a bug in the server, malicious server, breaking api changes etc.
            Some(Err(e)) => return Err(anyhow::anyhow!("could not parse event: {}", e)),
            // server has closed the connection, return an error
            None => return Err(anyhow::anyhow!("server closed the connection")),
        }
    }

    // send some commands to the server
    command_writer
        .write(&UserCommand::QueueAdd(command::TrackCommand {
            track_id: "track-1".into(),
        }))
        .await?;
    command_writer
        .write_raw(r#"{"type":"play"}"#.to_string())
        .await?;
    command_writer
        .write_raw(r#"{"type":"shuffle","payload":{}}"#.to_string())
        .await?;
    // binary frames carry the same JSON envelope
    command_writer.write_binary(&UserCommand::Pause).await?;

    command_writer.close().await?;

    Ok(collected_events)
}
