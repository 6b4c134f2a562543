//! HTTP route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Days, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;

use crate::engine::aggregator::Aggregator;
use crate::engine::cache::SportCacheStatus;
use crate::engine::deviation::max_value;
use crate::types::{Match, OddsError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub aggregator: Aggregator,
    /// Sport served when a request names none.
    pub default_sport: String,
}

impl ServerState {
    pub fn new(aggregator: Aggregator, default_sport: impl Into<String>) -> Self {
        Self {
            aggregator,
            default_sport: default_sport.into(),
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Time window filter for `/api/odds`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Commencing before the end of the current day in UTC, not the
    /// caller's local day.
    Today,
    /// Commencing within the next seven days.
    Week,
    #[default]
    All,
}

impl Window {
    pub fn admits(self, m: &Match, now: DateTime<Utc>) -> bool {
        match self {
            Window::All => true,
            Window::Week => m.commence_time < now + Duration::days(7),
            Window::Today => {
                let end_of_day = now
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc());
                end_of_day.map_or(true, |end| m.commence_time < end)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Time,
    /// Largest positive price deviation first.
    Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct OddsQuery {
    /// Comma-separated sport keys.
    pub sport: Option<String>,
    /// `today|week|all`; day boundaries are computed in UTC.
    #[serde(default)]
    pub window: Window,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Split a comma-separated sport parameter, dropping empty and repeated
/// keys (first occurrence kept), falling back to `default` when nothing
/// usable remains.
pub fn parse_sports(param: Option<&str>, default: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let sports: Vec<String> = param
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .map(String::from)
        .collect();

    if sports.is_empty() {
        vec![default.to_string()]
    } else {
        sports
    }
}

/// Reorder by best value quote, descending. Matches without quotes go last.
pub fn sort_by_value(matches: Vec<Match>) -> Vec<Match> {
    let mut keyed: Vec<(Option<f64>, Match)> = matches.into_iter().map(|m| (max_value(&m), m)).collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, m)| m).collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Maps engine failures onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub OddsError);

impl From<OddsError> for ApiError {
    fn from(err: OddsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            OddsError::InvalidCredential => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid API key" }))
            }
            OddsError::UnknownSport { sport, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": format!("Unknown sport: {sport}") }),
            ),
            OddsError::Transport { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch odds data", "message": message }),
            ),
        };
        error!(status = status.as_u16(), error = %self.0, "Odds request failed");
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/odds?sport=a,b&window=today|week|all&sort=time|value
pub async fn get_odds(
    State(state): State<AppState>,
    Query(query): Query<OddsQuery>,
) -> Result<Json<Vec<Match>>, ApiError> {
    let sports = parse_sports(query.sport.as_deref(), &state.default_sport);
    let now = Utc::now();

    let matches: Vec<Match> = state
        .aggregator
        .aggregate(sports.as_slice())
        .await?
        .into_iter()
        .filter(|m| query.window.admits(m, now))
        .collect();

    let matches = match query.sort {
        SortOrder::Time => matches,
        SortOrder::Value => sort_by_value(matches),
    };
    Ok(Json(matches))
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheResponse {
    pub ttl_secs: u64,
    pub sports: Vec<SportCacheStatus>,
}

/// GET /api/cache
pub async fn get_cache(State(state): State<AppState>) -> Json<CacheResponse> {
    let cache = state.aggregator.cache();
    Json(CacheResponse {
        ttl_secs: cache.settings().ttl.as_secs(),
        sports: cache.status().await,
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
