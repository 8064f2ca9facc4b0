//! Error taxonomy shared by the fetch, relay and calculation layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Upstream error for {symbol}: status {status}: {message}")]
    Upstream {
        symbol: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response for {symbol}: {reason}")]
    MalformedResponse { symbol: String, reason: String },

    #[error("Unsupported period: {0}")]
    UnsupportedPeriod(String),

    #[error("No price points for {symbol}, cannot compute a return")]
    EmptySeries { symbol: String },
}
