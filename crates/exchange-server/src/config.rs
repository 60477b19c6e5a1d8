//! Configuration for the exchange TCP server.
//!
//! Every option can be given on the command line or through an
//! environment variable:
//!
//! - `EXCHANGE_BIND_ADDR`   (default: "0.0.0.0")
//! - `EXCHANGE_PORT`        (default: "9000")
//! - `EXCHANGE_MAX_CLIENTS` (default: unbounded)

use std::path::PathBuf;

use clap::Parser;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "exchange-server")]
#[command(about = "Matching engine with one task per client connection")]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    #[arg(long, env = "EXCHANGE_BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// TCP port to listen on.
    #[arg(short, long, env = "EXCHANGE_PORT", default_value_t = 9000)]
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    #[arg(long, env = "EXCHANGE_MAX_CLIENTS")]
    pub max_clients: Option<usize>,

    /// Replay a CSV input file through the engine, print events to
    /// stdout, and exit instead of listening.
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,
}

impl Config {
    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "exchange-server",
            "--bind-addr",
            "127.0.0.1",
            "--port",
            "9100",
            "--max-clients",
            "4",
        ])
        .unwrap();

        assert_eq!(config.socket_addr_string(), "127.0.0.1:9100");
        assert_eq!(config.max_clients, Some(4));
        assert!(config.replay.is_none());
    }

    #[test]
    fn replay_takes_a_path() {
        let config =
            Config::try_parse_from(["exchange-server", "--replay", "orders.csv"]).unwrap();
        assert_eq!(config.replay, Some(PathBuf::from("orders.csv")));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Config::try_parse_from(["exchange-server", "--port", "70000"]).is_err());
    }
}
