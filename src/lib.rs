pub mod cli;
pub mod core;
pub mod providers;
pub mod relay;
pub mod store;

use anyhow::Result;
use crate::core::config::AppConfig;

pub enum AppCommand {
    Returns {
        period: String,
        symbols: Vec<String>,
    },
    Serve {
        port: Option<u16>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Returns { period, symbols } => {
            cli::returns::run(config_path, &period, &symbols).await
        }
        AppCommand::Serve { port } => {
            let config = match config_path {
                Some(path) => AppConfig::load_from_path(path)?,
                None => AppConfig::load()?,
            };
            let port = config.resolve_port(port);
            relay::serve(&format!("0.0.0.0:{port}"), config.upstream_base_url()).await
        }
    }
}
