//! Multi-client TCP server for the matching engine.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::Context;
use clap::Parser;
use exchange_core::MatchingEngine;
use exchange_server::config::Config;
use exchange_server::{replay, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();

    if let Some(path) = &config.replay {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let engine = MatchingEngine::new();
        let stats = replay::replay(&engine, BufReader::new(file), io::stdout().lock())?;
        info!(?stats, "replay finished");
        return Ok(());
    }

    tokio::select! {
        res = server::run(&config) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            Ok(())
        }
    }
}
