//! Fetches historical price series through the relay, with TTL caching.

use crate::core::cache::{Cache, series_cache_key};
use crate::core::error::AppError;
use crate::core::price::{PricePoint, PriceSeries, SeriesProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

const INTERVAL: &str = "1d";

/// The upstream chart payload, relayed verbatim. Kept serializable so the
/// validated payload can be cached as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    pub chart: ChartResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    pub result: Vec<ChartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartItem {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub close: Option<Vec<Option<f64>>>,
}

/// Error envelope the relay produces on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

pub struct RelayProvider {
    base_url: String,
    cache: Arc<dyn Cache<ChartPayload>>,
}

impl RelayProvider {
    pub fn new(base_url: &str, cache: Arc<dyn Cache<ChartPayload>>) -> Self {
        RelayProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn validate(symbol: &str, payload: &ChartPayload) -> Result<(), AppError> {
        let item = payload
            .chart
            .result
            .first()
            .ok_or_else(|| AppError::MalformedResponse {
                symbol: symbol.to_string(),
                reason: "empty chart result".to_string(),
            })?;
        if item.indicators.quote.is_empty() {
            return Err(AppError::MalformedResponse {
                symbol: symbol.to_string(),
                reason: "no quote indicators".to_string(),
            });
        }
        Ok(())
    }

    /// Pairs timestamps with closes, dropping null closes the way the
    /// upstream emits them on non-trading days.
    fn to_series(symbol: &str, payload: &ChartPayload) -> PriceSeries {
        let item = &payload.chart.result[0];
        let timestamps = item.timestamp.as_deref().unwrap_or(&[]);
        let closes = item
            .indicators
            .quote
            .first()
            .and_then(|q| q.close.as_deref())
            .unwrap_or(&[]);

        let points = timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(ts, close)| {
                close.map(|close| PricePoint {
                    timestamp: *ts,
                    close,
                })
            })
            .collect();

        PriceSeries {
            symbol: symbol.to_string(),
            points,
        }
    }
}

#[async_trait]
impl SeriesProvider for RelayProvider {
    #[instrument(name = "SeriesFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, AppError> {
        if start > end {
            return Err(AppError::InvalidDateRange(format!(
                "start {start} is after end {end} for symbol {symbol}"
            )));
        }

        let key = series_cache_key(symbol, start, end);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Self::to_series(symbol, &cached));
        }

        let url = format!(
            "{}/api/yahoo-finance/{}?period1={}&period2={}&interval={}",
            self.base_url,
            symbol,
            start.timestamp(),
            end.timestamp(),
            INTERVAL
        );
        debug!("Requesting series from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("slopes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Upstream {
                symbol: symbol.to_string(),
                status: 0,
                message: format!("client error: {e}"),
            })?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                symbol: symbol.to_string(),
                status: 0,
                message: format!("request error: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::Upstream {
                symbol: symbol.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let payload = response.json::<ChartPayload>().await.map_err(|e| {
            AppError::MalformedResponse {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            }
        })?;
        Self::validate(symbol, &payload)?;

        self.cache.put(&key, payload.clone()).await;

        Ok(Self::to_series(symbol, &payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCache;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap(),
        )
    }

    fn provider_with_cache(base_url: &str) -> RelayProvider {
        RelayProvider::new(base_url, Arc::new(MemoryCache::new()))
    }

    async fn mock_chart_server(symbol: &str, body: &str, expected_hits: u64) -> MockServer {
        let server = MockServer::start().await;
        let (start, end) = window();

        Mock::given(method("GET"))
            .and(path(format!("/api/yahoo-finance/{symbol}")))
            .and(query_param("period1", start.timestamp().to_string()))
            .and(query_param("period2", end.timestamp().to_string()))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected_hits)
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_successful_series_fetch() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1767225600, 1767312000, 1767398400],
                    "indicators": {
                        "quote": [{ "close": [100.0, null, 110.0] }]
                    }
                }]
            }
        }"#;
        let server = mock_chart_server("SPY", body, 1).await;
        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        let series = provider.fetch_series("SPY", start, end).await.unwrap();

        // Null close is dropped, pairing stays aligned
        assert_eq!(series.symbol, "SPY");
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.first_close(), Some(100.0));
        assert_eq!(series.last_close(), Some(110.0));
        assert_eq!(series.points[1].timestamp, 1767398400);
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1767225600],
                    "indicators": { "quote": [{ "close": [100.0] }] }
                }]
            }
        }"#;
        // expect(1): the second call must not reach the network
        let server = mock_chart_server("SPY", body, 1).await;
        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        let first = provider.fetch_series("SPY", start, end).await.unwrap();
        let second = provider.fetch_series("SPY", start, end).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_start_after_end_is_rejected() {
        // No server needed, validation fails before any request
        let provider = provider_with_cache("http://localhost:1");
        let (start, end) = window();

        let err = provider.fetch_series("SPY", end, start).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[tokio::test]
    async fn test_empty_chart_result_is_malformed() {
        let body = r#"{"chart": {"result": []}}"#;
        let server = mock_chart_server("BAD", body, 1).await;
        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        let err = provider.fetch_series("BAD", start, end).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::MalformedResponse { ref symbol, .. } if symbol == "BAD"
        ));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_malformed() {
        let body = r#"{"charts": {}}"#;
        let server = mock_chart_server("BAD", body, 1).await;
        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        let err = provider.fetch_series("BAD", start, end).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_upstream_error_envelope_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/yahoo-finance/SPY"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"error": "Failed to fetch data from upstream", "details": "Not Found"}"#,
            ))
            .mount(&server)
            .await;

        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        let err = provider.fetch_series("SPY", start, end).await.unwrap_err();
        match err {
            AppError::Upstream {
                symbol,
                status,
                message,
            } => {
                assert_eq!(symbol, "SPY");
                assert_eq!(status, 404);
                assert_eq!(message, "Failed to fetch data from upstream");
            }
            other => panic!("Expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/yahoo-finance/SPY"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{}"))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider_with_cache(&server.uri());
        let (start, end) = window();

        assert!(provider.fetch_series("SPY", start, end).await.is_err());
        assert!(provider.fetch_series("SPY", start, end).await.is_err());
    }
}
