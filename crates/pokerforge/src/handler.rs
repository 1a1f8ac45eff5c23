//! Per-connection handler: line pumps around one participant session.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a reader pump: socket lines → inbound channel
//!   2. Spawn a writer pump: outbound channel → socket
//!   3. Run the participant's session on the channels
//!   4. Flush what is left for the client, then close the socket

use std::sync::Arc;
use std::time::Duration;

use pokerforge_session::{SessionCoordinator, SessionOutcome};
use pokerforge_transport::{Connection, TcpLineConnection};
use tokio::sync::mpsc;

/// How long queued output may take to reach the client after its
/// session has ended.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpLineConnection,
    coordinator: SessionCoordinator,
) {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::info!(%conn_id, %peer, "client connected");

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    // --- Reader pump ---
    let reader = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            loop {
                match conn.recv_line().await {
                    Ok(Some(line)) => {
                        if inbound_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(%conn_id, "connection closed by peer");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                }
            }
        })
    };

    // --- Writer pump ---
    let mut writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = conn.send(&text).await {
                    tracing::debug!(%conn_id, error = %e, "send error");
                    break;
                }
            }
            let _ = conn.close().await;
        })
    };

    // --- Session ---
    let outcome = coordinator.handle(inbound_rx, outbound_tx).await;
    match &outcome {
        SessionOutcome::Left => {
            tracing::info!(%conn_id, %peer, "client left");
        }
        SessionOutcome::Rejected(e) => {
            tracing::info!(%conn_id, %peer, error = %e, "client rejected");
        }
        SessionOutcome::Dropped(e) => {
            tracing::info!(%conn_id, %peer, error = %e, "client dropped");
        }
    }

    // The session's sender is gone, but rooms may still hold clones of it
    // until their next delivery fails. Don't wait on them.
    if tokio::time::timeout(FLUSH_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
        let _ = conn.close().await;
    }
    reader.abort();
    tracing::debug!(%conn_id, "connection handler finished");
}
