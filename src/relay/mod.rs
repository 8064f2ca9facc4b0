//! Relay for the upstream finance chart API.
//!
//! Validates the date-range query, forwards the request upstream with a
//! fixed timeout, and relays the JSON body verbatim on success. All
//! failures become a uniform `{error, details}` envelope.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

// The upstream rejects requests without a browser-looking agent.
const UPSTREAM_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Clone)]
pub struct RelayState {
    client: reqwest::Client,
    upstream_base: String,
}

#[derive(Debug, Deserialize)]
struct ChartQuery {
    period1: Option<String>,
    period2: Option<String>,
    interval: Option<String>,
}

pub fn router(upstream_base: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = RelayState {
        client: reqwest::Client::builder()
            .user_agent(UPSTREAM_USER_AGENT)
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .unwrap_or_default(),
        upstream_base: upstream_base.trim_end_matches('/').to_string(),
    };

    Router::new()
        .route("/api/yahoo-finance/:symbol", get(chart_relay))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the relay on `addr` and serves until shutdown.
pub async fn serve(addr: &str, upstream_base: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Relay listening on {}", addr);

    axum::serve(listener, router(upstream_base)).await?;

    Ok(())
}

fn envelope(status: StatusCode, message: &str, details: Value) -> Response {
    (status, Json(json!({ "error": message, "details": details }))).into_response()
}

async fn chart_relay(
    State(state): State<RelayState>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Response {
    let numeric = |v: &str| v.parse::<i64>().is_ok();
    let (period1, period2) = match (query.period1.as_deref(), query.period2.as_deref()) {
        (Some(p1), Some(p2)) if numeric(p1) && numeric(p2) => (p1, p2),
        _ => {
            return envelope(
                StatusCode::BAD_REQUEST,
                "Invalid date range",
                json!({ "period1": query.period1, "period2": query.period2 }),
            );
        }
    };

    let url = format!("{}/v8/finance/chart/{}", state.upstream_base, symbol);
    debug!(%url, %symbol, "Forwarding chart request upstream");

    let mut params = vec![("period1", period1), ("period2", period2)];
    if let Some(interval) = query.interval.as_deref() {
        params.push(("interval", interval));
    }

    let response = match state.client.get(&url).query(&params).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Upstream request failed for {}: {}", symbol, e);
            return envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data from upstream",
                json!(e.to_string()),
            );
        }
    };

    let status = response.status();
    let body = response.json::<Value>().await.ok();

    if !status.is_success() {
        let details = body
            .as_ref()
            .and_then(|b| b.get("error").cloned())
            .unwrap_or_else(|| json!(status.canonical_reason().unwrap_or("upstream error")));
        error!("Upstream returned {} for {}", status, symbol);
        return envelope(
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "Failed to fetch data from upstream",
            details,
        );
    }

    match body {
        // Relay the upstream body verbatim once the chart result shape checks out
        Some(value) if value.pointer("/chart/result").is_some() => {
            Json(value).into_response()
        }
        _ => {
            error!("Invalid upstream response shape for {}", symbol);
            envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data from upstream",
                json!("Invalid response from finance API"),
            )
        }
    }
}
