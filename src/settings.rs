use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::line_server::HandlerSettings;

/// Connect Four server for two players over plain TCP.
#[derive(Parser, Debug, Clone)]
#[command(name = "server", version)]
pub struct ServerSettings {
    /// Address to listen on
    #[arg(long, env = "CONNECT_FOUR_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Seconds a player may think about a move
    #[arg(long, env = "CONNECT_FOUR_TURN_TIMEOUT", default_value_t = 300)]
    pub turn_timeout: u64,

    /// Seconds a player may take to enter a name
    #[arg(long, env = "CONNECT_FOUR_NAME_TIMEOUT", default_value_t = 60)]
    pub name_timeout: u64,

    /// Host another game after one finishes
    #[arg(long, env = "CONNECT_FOUR_KEEP_RUNNING")]
    pub keep_running: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CONNECT_FOUR_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerSettings {
    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            name_timeout: Duration::from_secs(self.name_timeout),
            turn_timeout: Duration::from_secs(self.turn_timeout),
        }
    }
}

/// Terminal client for the Connect Four server.
#[derive(Parser, Debug, Clone)]
#[command(name = "client", version)]
pub struct ClientSettings {
    /// Server address
    #[arg(long, env = "CONNECT_FOUR_SERVER", default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Name to join with, asked by the server when omitted
    #[arg(long)]
    pub name: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CONNECT_FOUR_LOG", default_value = "warn")]
    pub log_level: String,
}
