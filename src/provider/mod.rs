//! Upstream odds providers.
//!
//! Defines the `OddsSource` trait the engine fetches through, and the
//! reqwest-backed implementation for The Odds API.

pub mod the_odds_api;

use async_trait::async_trait;

use crate::types::{Match, OddsError};

/// Abstraction over an odds provider.
///
/// One call is one outbound request for a single (sport, region) pair.
/// Implementors do not retry; failures are classified into `OddsError`
/// so callers never have to inspect message text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Fetch head-to-head odds for every upcoming match of `sport` as
    /// quoted by bookmakers in `region`.
    async fn fetch_region(&self, sport: &str, region: &str) -> Result<Vec<Match>, OddsError>;
}
