//! `PokerServer` builder and accept loop.
//!
//! This is the entry point for running a Pokerforge server. It ties
//! together all the layers: transport → session → room.

use std::net::SocketAddr;
use std::sync::Arc;

use pokerforge_room::{RegistryConfig, RoomRegistry};
use pokerforge_session::{SessionConfig, SessionCoordinator};
use pokerforge_transport::{TcpLineTransport, Transport};

use crate::handler::handle_connection;
use crate::PokerError;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 2222;

/// Builder for configuring and starting a Pokerforge server.
///
/// # Example
///
/// ```rust,ignore
/// use pokerforge::prelude::*;
///
/// let server = PokerServer::builder()
///     .bind("0.0.0.0:2222")
///     .registry_config(RegistryConfig { capacity: 10 })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct PokerServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    session_config: SessionConfig,
}

impl PokerServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            registry_config: RegistryConfig::default(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Sets the per-participant session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<PokerServer, PokerError> {
        let transport = TcpLineTransport::bind(&self.bind_addr).await?;
        let registry = Arc::new(RoomRegistry::new(self.registry_config));
        let coordinator = SessionCoordinator::new(registry, self.session_config);

        Ok(PokerServer {
            transport,
            coordinator,
        })
    }
}

impl Default for PokerServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Pokerforge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PokerServer {
    transport: TcpLineTransport,
    coordinator: SessionCoordinator,
}

impl PokerServer {
    /// Creates a new builder.
    pub fn builder() -> PokerServerBuilder {
        PokerServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the registry holding this server's rooms.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        self.coordinator.registry()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. A failed
    /// accept is logged and the loop keeps going. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), PokerError> {
        tracing::info!(
            capacity = self.coordinator.registry().capacity(),
            "Pokerforge server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let coordinator = self.coordinator.clone();
                    tokio::spawn(async move {
                        handle_connection(conn, coordinator).await;
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
