//! Percentage return calculation over price series pairs.

use crate::core::error::AppError;
use crate::core::price::PriceSeries;
use serde::{Deserialize, Serialize};

/// Static asset metadata: a tradable symbol plus how the chart labels it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    pub color: String,
}

/// Period-over-period returns for one asset. Derived, immutable once
/// computed; recomputed on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturn {
    pub symbol: String,
    pub name: String,
    pub color: String,
    /// Return over the previous (closed) period, in percent.
    pub start_return: f64,
    /// Return over the current period through "now", in percent.
    pub end_return: f64,
}

impl AssetReturn {
    /// Computes the return pair for `asset` from the two windows' series.
    pub fn from_series(
        asset: &Asset,
        previous: &PriceSeries,
        current: &PriceSeries,
    ) -> Result<Self, AppError> {
        Ok(AssetReturn {
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            color: asset.color.clone(),
            start_return: period_return(previous)?,
            end_return: period_return(current)?,
        })
    }
}

/// (last − first) / first × 100, rounded to 2 decimal places.
pub fn period_return(series: &PriceSeries) -> Result<f64, AppError> {
    let (Some(first), Some(last)) = (series.first_close(), series.last_close()) else {
        return Err(AppError::EmptySeries {
            symbol: series.symbol.clone(),
        });
    };

    let pct = ((last - first) / first) * 100.0;
    Ok((pct * 100.0).round() / 100.0)
}
