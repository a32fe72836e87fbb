use data_ingestion::config::AlphaVantageConfig;
use data_ingestion::error::DataIngestionError;
use data_ingestion::fetcher::AlphaVantageClient;
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer, api_key: &str) -> AlphaVantageClient {
    let config = AlphaVantageConfig::new(api_key).with_base_url(server.base_url());
    AlphaVantageClient::new(config).expect("client should build")
}

#[tokio::test]
async fn fetch_sends_intraday_query_and_parses_bars() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/query")
                .query_param("function", "TIME_SERIES_INTRADAY")
                .query_param("symbol", "IBM")
                .query_param("interval", "5min")
                .query_param("apikey", "demo")
                .query_param("outputsize", "full");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "Meta Data": { "2. Symbol": "IBM" },
                    "Time Series (5min)": {
                        "2024-01-05 16:00:00": {
                            "1. open": "161.0100",
                            "2. high": "161.2000",
                            "3. low": "160.9000",
                            "4. close": "161.1000",
                            "5. volume": "47221"
                        },
                        "2024-01-05 15:55:00": {
                            "1. open": "160.8000",
                            "2. high": "161.0500",
                            "3. low": "160.7500",
                            "4. close": "161.0100",
                            "5. volume": "30112"
                        }
                    }
                }));
        })
        .await;

    let client = client_for(&server, "demo");
    let bars = client.fetch_intraday("IBM").await.expect("fetch should succeed");

    mock.assert_async().await;
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].timestamp, "2024-01-05 16:00:00");
    assert_eq!(bars[0].close, 161.1);
    assert_eq!(bars[1].volume, 30112.0);
}

#[tokio::test]
async fn rate_limited_response_is_data_unavailable() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/query");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "Information": "rate limit reached" }));
        })
        .await;

    let client = client_for(&server, "demo");
    let err = client.fetch_intraday("IBM").await.unwrap_err();

    match err {
        DataIngestionError::DataUnavailable(msg) => assert!(msg.contains("rate limit reached")),
        other => panic!("expected DataUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_api_key_is_sent_empty() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/query").query_param("apikey", "");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "Error Message": "the parameter apikey is invalid or missing" }));
        })
        .await;

    let client = client_for(&server, "");
    let err = client.fetch_intraday("IBM").await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, DataIngestionError::DataUnavailable(_)));
}
