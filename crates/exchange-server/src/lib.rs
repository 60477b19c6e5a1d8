//! exchange-server
//!
//! Multi-client async TCP server for the matching engine. Every
//! connection task calls into one shared engine; there is no central
//! engine task.

pub mod config;
pub mod replay;
pub mod router;
pub mod server;
pub mod types;

mod client;
