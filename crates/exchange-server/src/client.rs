//! Per-connection I/O.
//!
//! Each connection gets a reader loop (this task) and a writer task.
//! The reader decodes input, runs it through the shared engine and
//! routes the resulting events; the writer drains the client's
//! outbound channel using the same protocol the client speaks.

use anyhow::Context;
use bytes::{BufMut, BytesMut};
use exchange_core::{InputMessage, OutputMessage};
use exchange_protocol::{binary_codec, csv_codec};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::router::route_output;
use crate::types::{ClientId, ClientRegistry, OutboundRx, Protocol, SharedEngine};

/// Upper bound on a single binary frame. The largest input frame is
/// well under this; anything bigger means the stream is out of sync.
const MAX_FRAME_LEN: usize = 1024;

/// Run the client I/O loop for a single connection.
///
/// The client must already be registered in `clients`; it is removed
/// again before this returns.
pub async fn run_client(
    client_id: ClientId,
    stream: TcpStream,
    engine: SharedEngine,
    out_rx: OutboundRx,
    clients: ClientRegistry,
) -> anyhow::Result<()> {
    let mut first_byte = [0u8; 1];
    let peeked = stream
        .peek(&mut first_byte)
        .await
        .context("peeking first byte");

    let result = match peeked {
        // Connected and closed without sending anything.
        Ok(0) => Ok(()),
        Ok(_) => {
            let protocol = Protocol::detect(first_byte[0]);
            info!(client = client_id.0, ?protocol, "protocol detected");

            let (read_half, write_half) = stream.into_split();
            let writer = tokio::spawn(run_writer(client_id, write_half, out_rx, protocol));

            let read_result = match protocol {
                Protocol::Csv => run_csv_reader(client_id, read_half, &engine, &clients).await,
                Protocol::Binary => {
                    run_binary_reader(client_id, read_half, &engine, &clients).await
                }
            };

            // Dropping our sender ends the writer once queued events are flushed.
            clients.write().await.remove(&client_id);
            if let Err(e) = writer.await {
                warn!(client = client_id.0, error = %e, "writer task failed");
            }
            return read_result;
        }
        Err(e) => Err(e),
    };

    clients.write().await.remove(&client_id);
    result
}

/// Feed one decoded message through the engine and route its events.
async fn handle_input(
    client_id: ClientId,
    msg: InputMessage,
    engine: &SharedEngine,
    clients: &ClientRegistry,
) {
    debug!(client = client_id.0, ?msg, "input");

    match engine.process_message(msg) {
        Ok(outputs) => {
            let guard = clients.read().await;
            for out in &outputs {
                route_output(client_id, out, &guard);
            }
        }
        Err(e) => warn!(client = client_id.0, error = %e, "message rejected"),
    }
}

async fn run_csv_reader(
    client_id: ClientId,
    read_half: OwnedReadHalf,
    engine: &SharedEngine,
    clients: &ClientRegistry,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await.context("reading CSV line")? {
        match csv_codec::parse_input_line(&line) {
            Ok(Some(msg)) => handle_input(client_id, msg, engine, clients).await,
            Ok(None) => {}
            Err(e) => warn!(client = client_id.0, error = %e, line = %line.trim(), "invalid CSV"),
        }
    }

    info!(client = client_id.0, "client closed connection");
    Ok(())
}

async fn run_binary_reader(
    client_id: ClientId,
    mut read_half: OwnedReadHalf,
    engine: &SharedEngine,
    clients: &ClientRegistry,
) -> anyhow::Result<()> {
    let mut frame = Vec::with_capacity(MAX_FRAME_LEN);

    loop {
        let mut len_buf = [0u8; 4];
        match read_half.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!(client = client_id.0, "client closed connection");
                return Ok(());
            }
            Err(e) => return Err(e).context("reading frame length"),
        }

        let frame_len = u32::from_be_bytes(len_buf) as usize;
        if frame_len == 0 {
            continue;
        }
        if frame_len > MAX_FRAME_LEN {
            anyhow::bail!("frame length {frame_len} exceeds {MAX_FRAME_LEN}");
        }

        frame.resize(frame_len, 0);
        read_half
            .read_exact(&mut frame)
            .await
            .context("reading frame body")?;

        match binary_codec::decode_input(&frame) {
            Ok(msg) => handle_input(client_id, msg, engine, clients).await,
            Err(e) => warn!(client = client_id.0, error = %e, "undecodable frame"),
        }
    }
}

async fn run_writer(
    client_id: ClientId,
    mut write_half: OwnedWriteHalf,
    mut out_rx: OutboundRx,
    protocol: Protocol,
) {
    let mut buf = BytesMut::with_capacity(256);

    while let Some(msg) = out_rx.recv().await {
        buf.clear();
        if let Err(e) = encode_event(&msg, protocol, &mut buf) {
            warn!(client = client_id.0, error = %e, "dropping unencodable event");
            continue;
        }
        if let Err(e) = write_half.write_all(&buf).await {
            warn!(client = client_id.0, error = %e, "write failed");
            break;
        }
    }

    let _ = write_half.shutdown().await;
    debug!(client = client_id.0, "writer finished");
}

/// Serialize one event in the connection's protocol.
fn encode_event(
    msg: &OutputMessage,
    protocol: Protocol,
    buf: &mut BytesMut,
) -> Result<(), exchange_protocol::ProtocolError> {
    match protocol {
        Protocol::Csv => {
            buf.put_slice(csv_codec::format_output_csv(msg).as_bytes());
            buf.put_u8(b'\n');
        }
        Protocol::Binary => {
            let mut payload = Vec::with_capacity(64);
            binary_codec::encode_output(msg, &mut payload)?;
            buf.put_u32(payload.len() as u32);
            buf.put_slice(&payload);
        }
    }
    Ok(())
}
