use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use slopes::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for slopes::AppCommand {
    fn from(cmd: Commands) -> slopes::AppCommand {
        match cmd {
            Commands::Returns { period, symbol } => slopes::AppCommand::Returns {
                period,
                symbols: symbol,
            },
            Commands::Serve { port } => slopes::AppCommand::Serve { port },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Compare period-over-period returns across assets
    Returns {
        /// Comparison period (YTD or MTD)
        #[arg(short, long, default_value = "YTD")]
        period: String,

        /// Restrict to specific symbols (repeatable)
        #[arg(short, long)]
        symbol: Vec<String>,
    },
    /// Run the finance API relay
    Serve {
        /// Listening port (overrides the PORT env var and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => slopes::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = slopes::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r##"---
assets:
  - symbol: "GLD"
    name: "Gold"
    color: "#FFD700"
  - symbol: "SPY"
    name: "S&P 500"
    color: "#1f77b4"
  - symbol: "GBTC"
    name: "Bitcoin"
    color: "#FF9900"
  - symbol: "AGG"
    name: "Bonds"
    color: "#2ca02c"
  - symbol: "EWY"
    name: "KOSPI"
    color: "#d62728"
  - symbol: "QQQ"
    name: "Nasdaq"
    color: "#9467bd"
  - symbol: "VNQ"
    name: "Real Estate"
    color: "#8c564b"

providers:
  relay:
    base_url: "http://localhost:3000"
  yahoo:
    base_url: "https://query1.finance.yahoo.com"

server:
  port: 3000
"##;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
