//! The Odds API (v4) integration.
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Endpoint: `GET {base}/sports/{sport}/odds`
//! Auth: `apiKey` query parameter. Quota is reported in the
//! `x-requests-remaining` / `x-requests-used` response headers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

use super::OddsSource;
use crate::types::{Match, OddsError, H2H_MARKET};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const ODDS_FORMAT: &str = "decimal";

/// Longest upstream error body kept in a transport diagnostic.
const MAX_ERROR_BODY: usize = 256;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The Odds API client. Cheap to share behind an `Arc`.
pub struct OddsApiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl OddsApiClient {
    /// Create a new client. `timeout` bounds each individual request.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("odds-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn odds_url(&self, sport: &str) -> String {
        format!("{}/sports/{}/odds", self.base_url, urlencoding::encode(sport))
    }

    /// Map a non-success upstream status onto the error taxonomy.
    fn classify_status(status: StatusCode, sport: &str, body: &str) -> OddsError {
        match status {
            StatusCode::UNAUTHORIZED => OddsError::InvalidCredential,
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => OddsError::UnknownSport {
                sport: sport.to_string(),
                status: status.as_u16(),
            },
            _ => {
                let body: String = body.chars().take(MAX_ERROR_BODY).collect();
                OddsError::Transport {
                    status: Some(status.as_u16()),
                    message: format!("Odds API error {status}: {body}"),
                }
            }
        }
    }

    fn log_quota(headers: &reqwest::header::HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("?")
                .to_string()
        };
        debug!(
            remaining = %header("x-requests-remaining"),
            used = %header("x-requests-used"),
            "Odds API quota"
        );
    }
}

// ---------------------------------------------------------------------------
// OddsSource trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn fetch_region(&self, sport: &str, region: &str) -> Result<Vec<Match>, OddsError> {
        let url = self.odds_url(sport);
        debug!(sport, region, url = %url, "Fetching odds");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.expose_secret().as_str()),
                ("regions", region),
                ("markets", H2H_MARKET),
                ("oddsFormat", ODDS_FORMAT),
                ("includeLinks", "true"),
            ])
            .send()
            .await
            .map_err(|e| OddsError::transport(format!("Odds API request failed: {}", e.without_url())))?;

        Self::log_quota(resp.headers());

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| OddsError::Transport {
                status: Some(status.as_u16()),
                message: format!("Failed to read Odds API response body: {}", e.without_url()),
            })?;

        if !status.is_success() {
            let err = Self::classify_status(status, sport, &body);
            warn!(sport, region, status = status.as_u16(), error = %err, "Odds API request rejected");
            return Err(err);
        }

        let matches: Vec<Match> = serde_json::from_str(&body).map_err(|e| OddsError::Transport {
            status: Some(status.as_u16()),
            message: format!("Failed to parse Odds API response: {e}"),
        })?;

        debug!(sport, region, count = matches.len(), "Odds fetched");
        Ok(matches)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
