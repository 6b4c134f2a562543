//! Router-level tests for the `/api/odds` endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use odds_aggregator::engine::aggregator::Aggregator;
use odds_aggregator::engine::cache::{CacheSettings, SportCache};
use odds_aggregator::engine::policy::BookmakerPolicy;
use odds_aggregator::provider::the_odds_api::OddsApiClient;
use odds_aggregator::server::{build_router, ServerState};
use odds_aggregator::types::OddsError;

use crate::mock_source::{bookmaker, game, MockSource};

fn app(source: &MockSource) -> axum::Router {
    let cache = SportCache::new(
        Arc::new(source.clone()),
        BookmakerPolicy::new(["A", "B"], 10),
        CacheSettings::default(),
    );
    let state = Arc::new(ServerState::new(Aggregator::new(Arc::new(cache)), "icehockey_nhl"));
    build_router(state)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_comma_separated_sports() {
    let source = MockSource::new();
    source.respond("a", "eu", vec![game("a1", "a", "2026-10-21T10:00:00Z", vec![bookmaker("A", 2.0, 1.8)])]);
    source.respond("b", "eu", vec![game("b1", "b", "2026-10-20T10:00:00Z", vec![bookmaker("B", 2.0, 1.8)])]);

    let (status, json) = get(app(&source), "/api/odds?sport=a,%20b").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json.as_array().unwrap().iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["b1", "a1"]);
    assert_eq!(json[0]["commence_time"], "2026-10-20T10:00:00Z");
}

#[tokio::test]
async fn test_repeated_sport_listed_once() {
    let source = MockSource::new();
    source.respond("a", "eu", vec![game("a1", "a", "2026-10-21T10:00:00Z", vec![bookmaker("A", 2.0, 1.8)])]);

    let (status, json) = get(app(&source), "/api/odds?sport=a,a").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_credential_is_401() {
    let source = MockSource::new();
    source.fail_sport("icehockey_nhl", OddsError::InvalidCredential);

    let (status, json) = get(app(&source), "/api/odds").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid API key");
}

#[tokio::test]
async fn test_transport_failure_is_500() {
    let source = MockSource::new();
    source.fail_sport("icehockey_nhl", OddsError::Transport { status: Some(503), message: "unavailable".into() });

    let (status, json) = get(app(&source), "/api/odds").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch odds data");
    assert_eq!(json["message"], "unavailable");
}

#[tokio::test]
async fn test_sort_by_value() {
    let source = MockSource::new();
    source.respond(
        "a",
        "eu",
        vec![
            game("flat", "a", "2026-10-20T10:00:00Z", vec![bookmaker("A", 2.0, 1.8), bookmaker("B", 2.0, 1.8)]),
            game("spread", "a", "2026-10-21T10:00:00Z", vec![bookmaker("A", 2.5, 1.8), bookmaker("B", 1.5, 1.8)]),
        ],
    );

    let (status, json) = get(app(&source), "/api/odds?sport=a&sort=value").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], "spread");
    assert_eq!(json[1]["id"], "flat");
}

#[tokio::test]
async fn test_unreachable_provider_response_hides_api_key() {
    const KEY: &str = "configured-key-7f3a";
    let client = OddsApiClient::new("http://127.0.0.1:9", SecretString::new(KEY.into()), Duration::from_secs(5)).unwrap();
    let cache = SportCache::new(Arc::new(client), BookmakerPolicy::new(["A"], 10), CacheSettings::default());
    let state = Arc::new(ServerState::new(Aggregator::new(Arc::new(cache)), "icehockey_nhl"));

    let resp = build_router(state)
        .oneshot(Request::builder().uri("/api/odds").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Failed to fetch odds data"));
    assert!(!text.contains(KEY));
    assert!(!text.contains("apiKey"));
}
