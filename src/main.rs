// RoboCom - Robot Controller Communication Bridge
mod cli;
mod core;
mod domain;
mod infrastructure;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use crate::cli::Args;
use crate::domain::config::RobocomConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::SerialLink;
use crate::infrastructure::tcp::SocketServer;

fn main() -> anyhow::Result<()> {
    init_logging().map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RobocomConfig::load_from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RobocomConfig::load_default().context("loading default config")?,
    };
    args.apply_to(&mut config);

    if let Err(e) = run_bridge(&config) {
        error!("bridge stopped: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Forwarding loop: decoded controller messages go straight to the
/// GUI. Retry/reconnect policy stays with the operator; the process
/// exits once the serial link is lost.
fn run_bridge(config: &RobocomConfig) -> anyhow::Result<()> {
    let mut link = SerialLink::open(&config.serial.device, config.serial.baud_rate)
        .context("opening serial link")?;

    let mut server = SocketServer::new();
    server.open(config.gui.port).context("opening gui server")?;

    info!("waiting for gui client");
    let peer = server.accept_client().context("accepting gui client")?;
    info!(%peer, "bridge running");

    loop {
        let msg = match link.receive() {
            Ok(msg) => msg,
            Err(e) => {
                server.close();
                return Err(e).context("serial link lost");
            }
        };

        info!(message = %msg, "controller message");

        // A dead GUI client is not fatal; wait for it to come back.
        if server.send(msg).is_err() {
            info!("gui client gone, waiting for a new one");
            server.accept_client().context("re-accepting gui client")?;
        }
    }
}
