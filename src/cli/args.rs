use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for RoboCom
#[derive(Parser, Debug)]
#[command(
    name = "robocom",
    version = env!("CARGO_PKG_VERSION"),
    about = "Robot controller communication bridge",
    long_about = "Bridges a supervising GUI (TCP) and a motor microcontroller (serial), \
                  forwarding decoded controller messages to the GUI."
)]
pub struct Args {
    /// Serial device path (overrides the config file)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Serial baud rate (overrides the config file)
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// TCP port for the GUI server (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge CLI overrides into a loaded configuration.
    pub fn apply_to(&self, config: &mut crate::domain::config::RobocomConfig) {
        if let Some(device) = &self.device {
            config.serial.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(port) = self.port {
            config.gui.port = port;
        }
    }
}
