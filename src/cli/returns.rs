use crate::cli::ui;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::period::Period;
use crate::core::refresh::{ChartData, load_chart_data};
use crate::providers::relay::{ChartPayload, RelayProvider};
use crate::store::{DiskCache, MemoryCache};
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run(config_path: Option<&str>, period: &str, symbols: &[String]) -> Result<()> {
    let period: Period = period.parse()?;
    info!("Comparing {period} returns...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let assets: Vec<_> = if symbols.is_empty() {
        config.assets.clone()
    } else {
        config
            .assets
            .iter()
            .filter(|a| symbols.iter().any(|s| s.eq_ignore_ascii_case(&a.symbol)))
            .cloned()
            .collect()
    };
    if assets.is_empty() {
        println!("No assets selected, nothing to compare.");
        return Ok(());
    }

    let cache = open_cache(&config);
    let provider = RelayProvider::new(config.relay_base_url(), cache);

    let pb = ui::new_spinner("Fetching price data...");
    let data = load_chart_data(&provider, &assets, period, Utc::now()).await;
    pb.finish_and_clear();

    display_chart_data(&data?);
    Ok(())
}

/// Persistent cache under the data dir, or a process-local map when the
/// keyspace cannot be opened.
fn open_cache(config: &AppConfig) -> Arc<dyn Cache<ChartPayload>> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskCache::open(&path));
    match disk {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            debug!("Falling back to in-memory cache: {e}");
            Arc::new(MemoryCache::new())
        }
    }
}

fn display_chart_data(data: &ChartData) {
    let mut table = ui::new_styled_table();

    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell(&data.windows.previous.label()),
        ui::header_cell(&data.windows.current.label()),
    ]);

    for asset_return in &data.returns {
        table.add_row(vec![
            Cell::new(format!("{} ({})", asset_return.name, asset_return.symbol)),
            ui::change_cell(asset_return.start_return),
            ui::change_cell(asset_return.end_return),
        ]);
    }

    println!("{table}");
}
