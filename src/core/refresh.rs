//! Chart-data refresh: concurrent per-asset fetches joined into a sorted
//! return list, with a generation counter so a superseded refresh never
//! overwrites a newer one.

use crate::core::error::AppError;
use crate::core::period::{ComparisonWindows, Period, resolve_windows};
use crate::core::price::SeriesProvider;
use crate::core::returns::{Asset, AssetReturn};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument};

/// Everything the presentation layer needs for one chart refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub windows: ComparisonWindows,
    pub returns: Vec<AssetReturn>,
}

/// Hands out monotonically increasing refresh generations. A refresh that
/// finishes after a newer one has started is discarded instead of applied.
#[derive(Debug, Default)]
pub struct RefreshTracker {
    current: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current.load(Ordering::SeqCst) == generation.0
    }
}

/// Fetches both windows for every asset concurrently and computes the
/// return pairs, sorted by current-period return descending. Any single
/// failure aborts the whole refresh.
#[instrument(skip(provider, assets), fields(period = %period))]
pub async fn load_chart_data(
    provider: &dyn SeriesProvider,
    assets: &[Asset],
    period: Period,
    now: DateTime<Utc>,
) -> Result<ChartData, AppError> {
    let windows = resolve_windows(period, now);

    let fetches = assets.iter().map(|asset| async move {
        let previous = provider
            .fetch_series(&asset.symbol, windows.previous.start, windows.previous.end)
            .await?;
        let current = provider
            .fetch_series(&asset.symbol, windows.current.start, windows.current.end)
            .await?;
        AssetReturn::from_series(asset, &previous, &current)
    });

    let mut returns = try_join_all(fetches).await?;
    returns.sort_by(|a, b| b.end_return.total_cmp(&a.end_return));
    debug!(count = returns.len(), "Computed asset returns");

    Ok(ChartData { windows, returns })
}

/// [`load_chart_data`] guarded by a refresh generation: returns `Ok(None)`
/// when `generation` was superseded while the fetches were in flight.
pub async fn load_chart_data_guarded(
    tracker: &RefreshTracker,
    generation: Generation,
    provider: &dyn SeriesProvider,
    assets: &[Asset],
    period: Period,
    now: DateTime<Utc>,
) -> Result<Option<ChartData>, AppError> {
    let data = load_chart_data(provider, assets, period, now).await?;
    if !tracker.is_current(generation) {
        debug!(?generation, "Discarding result of superseded refresh");
        return Ok(None);
    }
    Ok(Some(data))
}
