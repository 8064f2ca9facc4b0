use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Spawns the relay on an ephemeral port and returns its base URL.
async fn spawn_relay(upstream_base: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let router = slopes::relay::router(upstream_base);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base_url
}

#[test_log::test(tokio::test)]
async fn test_relay_rejects_non_numeric_period() {
    let relay = spawn_relay("http://localhost:1").await;

    let response = reqwest::get(format!(
        "{relay}/api/yahoo-finance/SPY?period1=abc&period2=1700000000&interval=1d"
    ))
    .await
    .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid date range");
    assert_eq!(body["details"]["period1"], "abc");
}

#[test_log::test(tokio::test)]
async fn test_relay_rejects_missing_period() {
    let relay = spawn_relay("http://localhost:1").await;

    let response = reqwest::get(format!("{relay}/api/yahoo-finance/SPY?period1=1700000000"))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid date range");
}

#[test_log::test(tokio::test)]
async fn test_relay_forwards_chart_body_verbatim() {
    let upstream = MockServer::start().await;
    let chart_body = r#"{
        "chart": {
            "result": [{
                "timestamp": [1700000000],
                "indicators": { "quote": [{ "close": [450.5] }] }
            }]
        }
    }"#;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/SPY"))
        .and(query_param("period1", "1700000000"))
        .and(query_param("period2", "1700100000"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chart_body))
        .mount(&upstream)
        .await;

    let relay = spawn_relay(&upstream.uri()).await;
    let response = reqwest::get(format!(
        "{relay}/api/yahoo-finance/SPY?period1=1700000000&period2=1700100000&interval=1d"
    ))
    .await
    .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let expected: Value = serde_json::from_str(chart_body).unwrap();
    assert_eq!(body, expected);
}

#[test_log::test(tokio::test)]
async fn test_relay_maps_upstream_status_into_envelope() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error": "No data found for symbol"}"#),
        )
        .mount(&upstream)
        .await;

    let relay = spawn_relay(&upstream.uri()).await;
    let response = reqwest::get(format!(
        "{relay}/api/yahoo-finance/NOPE?period1=1700000000&period2=1700100000"
    ))
    .await
    .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch data from upstream");
    assert_eq!(body["details"], "No data found for symbol");
}

#[test_log::test(tokio::test)]
async fn test_relay_flags_malformed_upstream_shape() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/SPY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"charts": {}}"#))
        .mount(&upstream)
        .await;

    let relay = spawn_relay(&upstream.uri()).await;
    let response = reqwest::get(format!(
        "{relay}/api/yahoo-finance/SPY?period1=1700000000&period2=1700100000"
    ))
    .await
    .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch data from upstream");
}
