//! Shared types for the odds aggregator.
//!
//! The data model mirrors the provider's odds payload (match → bookmakers →
//! markets → outcomes) so that upstream responses deserialize directly and
//! the merged result serializes back to the same wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market key for head-to-head (moneyline) odds.
pub const H2H_MARKET: &str = "h2h";

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A single sporting event with the bookmaker quotes attached to it.
///
/// `id` is assigned by the provider and is identical across regions for the
/// same real-world event, which is what makes region merging possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub sport_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_title: Option<String>,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} vs {} @ {} ({} bookmakers)",
            self.sport_key,
            self.home_team,
            self.away_team,
            self.commence_time.format("%Y-%m-%d %H:%M UTC"),
            self.bookmakers.len(),
        )
    }
}

impl Match {
    /// Look up a bookmaker on this match by key.
    pub fn bookmaker(&self, key: &str) -> Option<&Bookmaker> {
        self.bookmakers.iter().find(|b| b.key == key)
    }

    /// Helper to build a test/sample match with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: &str, bookmakers: Vec<Bookmaker>) -> Self {
        Match {
            id: id.to_string(),
            sport_key: "icehockey_nhl".to_string(),
            sport_title: Some("NHL".to_string()),
            commence_time: "2026-10-20T23:00:00Z".parse().unwrap(),
            home_team: "Boston Bruins".to_string(),
            away_team: "Toronto Maple Leafs".to_string(),
            bookmakers,
        }
    }
}

// ---------------------------------------------------------------------------
// Bookmaker / Market / Outcome
// ---------------------------------------------------------------------------

/// One bookmaker's quotes for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    /// Provider identifier, e.g. `"betsson"`.
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<Market>,
    /// Single affiliate link, as sent when links are requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Affiliate link list (alternate payload shape).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl Bookmaker {
    /// The head-to-head market, if this bookmaker quotes one.
    pub fn h2h(&self) -> Option<&Market> {
        self.markets.iter().find(|m| m.key == H2H_MARKET)
    }

    /// Decimal price this bookmaker offers on `outcome`, if any.
    pub fn price_for(&self, outcome: &str) -> Option<f64> {
        self.h2h()?
            .outcomes
            .iter()
            .find(|o| o.name == outcome)
            .map(|o| o.price)
    }

    /// First usable affiliate URL, preferring the link list.
    pub fn primary_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.first())
            .map(|l| l.url.as_str())
            .or(self.link.as_deref())
    }

    #[cfg(test)]
    pub fn sample(key: &str, home: f64, away: f64) -> Self {
        Bookmaker {
            key: key.to_string(),
            title: key.to_uppercase(),
            last_update: None,
            markets: vec![Market {
                key: H2H_MARKET.to_string(),
                last_update: None,
                outcomes: vec![
                    Outcome { name: "Boston Bruins".into(), price: home, point: None },
                    Outcome { name: "Toronto Maple Leafs".into(), price: away, point: None },
                ],
                link: None,
            }],
            link: None,
            links: None,
        }
    }
}

/// Affiliate link to a bookmaker page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

/// A betting market offered by a bookmaker. Only `h2h` is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A single priced result: home win, away win, or draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Team name or the draw label.
    pub name: String,
    /// Decimal odds.
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures surfaced by the upstream client and propagated untouched
/// through the cache and aggregator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OddsError {
    #[error("Upstream rejected the API credential")]
    InvalidCredential,

    #[error("Unknown sport: {sport}")]
    UnknownSport { sport: String, status: u16 },

    #[error("Transport failure: {message}")]
    Transport { status: Option<u16>, message: String },
}

impl OddsError {
    pub fn transport(message: impl Into<String>) -> Self {
        OddsError::Transport { status: None, message: message.into() }
    }

    /// Upstream HTTP status that produced this error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OddsError::InvalidCredential => Some(401),
            OddsError::UnknownSport { status, .. } => Some(*status),
            OddsError::Transport { status, .. } => *status,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
