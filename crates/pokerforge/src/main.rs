//! pokerforge: planning poker server for terminal clients.
//!
//! Connect with `telnet <host> 2222` or `nc <host> 2222`, pick a room,
//! and estimate together.

use std::time::Duration;

use clap::Parser;
use pokerforge::prelude::*;

const DEFAULT_LOG_FILTER: &str = "pokerforge=info,pokerforge_transport=info,\
pokerforge_session=info,pokerforge_room=info";

#[derive(Parser)]
#[command(name = "pokerforge", about = "Multi-room planning poker over TCP")]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 2222)]
    port: u16,

    /// Maximum number of rooms hosted at once.
    #[arg(long, default_value_t = 5)]
    max_rooms: usize,

    /// Drop a participant after this many seconds without progress.
    #[arg(long)]
    wait_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), PokerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("0.0.0.0:{}", args.port);

    let server = PokerServer::builder()
        .bind(&addr)
        .registry_config(RegistryConfig {
            capacity: args.max_rooms,
        })
        .session_config(SessionConfig {
            wait_timeout: args.wait_timeout.map(Duration::from_secs),
            ..SessionConfig::default()
        })
        .build()
        .await?;

    tracing::info!("pokerforge listening on {}", addr);
    server.run().await
}
