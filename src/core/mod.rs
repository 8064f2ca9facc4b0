//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod period;
pub mod price;
pub mod refresh;
pub mod returns;

// Re-export main types for cleaner imports
pub use cache::{Cache, DEFAULT_TTL, series_cache_key};
pub use error::AppError;
pub use period::{ComparisonWindows, Period, PeriodWindow, resolve_windows};
pub use price::{PricePoint, PriceSeries, SeriesProvider};
pub use returns::{Asset, AssetReturn};
