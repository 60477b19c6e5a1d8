//! Interactive client speaking the binary protocol.
//!
//! Reads CSV orders from stdin, sends them as length-prefixed binary
//! frames, and prints whatever events come back as CSV.

use std::env;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use exchange_protocol::csv_codec::{format_output_csv, parse_input_line};
use exchange_protocol::{decode_output, encode_input};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::var("EXCHANGE_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9000".to_string());

    println!("Connecting to {addr}...");
    let mut stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    println!("Connected. Type orders like:");
    println!("  B, 1, ABC, 100, 10");
    println!("  S, 2, ABC, 99, 5");
    println!("  C, 1");
    println!("Type 'quit' to leave.\n");

    let stdin = io::stdin();
    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let msg = match parse_input_line(trimmed) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let mut payload = Vec::with_capacity(64);
        encode_input(&msg, &mut payload)?;
        stream.write_all(&(payload.len() as u32).to_be_bytes()).await?;
        stream.write_all(&payload).await?;

        // Print responses until the connection goes quiet.
        loop {
            let mut len_buf = [0u8; 4];
            match timeout(Duration::from_millis(100), stream.read_exact(&mut len_buf)).await {
                Ok(res) => {
                    res.context("reading frame length")?;
                }
                Err(_) => break,
            }

            let mut frame = vec![0u8; u32::from_be_bytes(len_buf) as usize];
            stream.read_exact(&mut frame).await.context("reading frame")?;
            println!("<< {}", format_output_csv(&decode_output(&frame)?));
        }
    }

    Ok(())
}
