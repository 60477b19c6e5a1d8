//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `ClientId` and an outbound channel.
//! - Spawns a per-client task that drives the shared engine directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use exchange_core::MatchingEngine;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

use crate::client;
use crate::config::Config;
use crate::types::{ClientId, ClientRegistry, OutboundRx, OutboundTx, SharedEngine};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Bind the configured address and serve until the task is cancelled.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, max_clients = ?config.max_clients, "listening");

    serve(listener, Arc::new(MatchingEngine::new()), config.max_clients).await
}

/// Accept connections on `listener` forever, one task per client.
pub async fn serve(
    listener: TcpListener,
    engine: SharedEngine,
    max_clients: Option<usize>,
) -> anyhow::Result<()> {
    let clients: ClientRegistry = Arc::new(RwLock::new(HashMap::new()));

    loop {
        let (stream, peer_addr) = listener.accept().await.context("accepting connection")?;

        let client_id = next_client_id();
        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

        {
            let mut guard = clients.write().await;
            if max_clients.is_some_and(|max| guard.len() >= max) {
                warn!(%peer_addr, ?max_clients, "rejecting connection: client limit reached");
                // Dropping the stream closes it.
                continue;
            }
            guard.insert(client_id, out_tx);
        }
        info!(client = client_id.0, %peer_addr, "accepted connection");

        let engine = Arc::clone(&engine);
        let clients = Arc::clone(&clients);
        tokio::spawn(async move {
            match client::run_client(client_id, stream, engine, out_rx, clients).await {
                Ok(()) => info!(client = client_id.0, "client disconnected"),
                Err(e) => error!(client = client_id.0, error = %format!("{e:#}"), "client error"),
            }
        });
    }
}
