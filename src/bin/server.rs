extern crate connect_four;

use clap::Parser;
use dotenv::dotenv;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use connect_four::line_server::GameServer;
use connect_four::logging;
use connect_four::settings::ServerSettings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = ServerSettings::parse();
    logging::init(&settings.log_level)?;

    let server = GameServer::bind(settings.addr, settings.handler_settings()).await?;
    info!(addr = %server.local_addr()?, "listening for connections");

    let ct = CancellationToken::new();
    let mut games = tokio::spawn(server.run(ct.clone(), settings.keep_running));

    tokio::select! {
        joined = &mut games => return Ok(joined??),
        signal = signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!("unable to listen for shutdown signal: {}", err);
            }
        }
    }
    info!("shutting down");
    ct.cancel();
    games.await??;

    Ok(())
}
