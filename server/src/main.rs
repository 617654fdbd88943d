use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use room_server::{build_router, config::Config, room_manager::RoomManagerBuilder, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::parse();
    info!(
        "Starting room-server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind
    );

    let room_manager = Arc::new(RoomManagerBuilder::new().build());
    let state = AppState::new(room_manager.clone(), config.outbound_capacity);
    let quit_tx = state.quit_tx.clone();

    if let Some(ttl) = config.empty_room_ttl() {
        let room_manager = room_manager.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ttl);
            loop {
                interval.tick().await;
                room_manager.reap_abandoned(ttl).await;
            }
        });
    }

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("could not bind to {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for the interrupt signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Server interrupted. Gracefully shutting down.");
            // open sessions close their sockets so the server can drain
            let _ = quit_tx.send(());
        })
        .await
        .context("server terminated unexpectedly")?;

    info!("Server shut down");

    Ok(())
}
