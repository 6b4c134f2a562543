//! Mock odds provider for integration testing.
//!
//! Provides a deterministic `OddsSource` implementation that returns
//! scripted matches per (sport, region), records every call, and can be
//! forced to fail. Everything is in-memory with no network access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use odds_aggregator::provider::OddsSource;
use odds_aggregator::types::*;

/// A mock odds provider for deterministic testing.
#[derive(Clone, Default)]
pub struct MockSource {
    responses: Arc<Mutex<HashMap<(String, String), Vec<Match>>>>,
    errors: Arc<Mutex<HashMap<String, OddsError>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the matches returned for one (sport, region) pair.
    pub fn respond(&self, sport: &str, region: &str, matches: Vec<Match>) {
        self.responses
            .lock()
            .unwrap()
            .insert((sport.to_string(), region.to_string()), matches);
    }

    /// Force every fetch for `sport` to fail with `err`.
    pub fn fail_sport(&self, sport: &str, err: OddsError) {
        self.errors.lock().unwrap().insert(sport.to_string(), err);
    }

    pub fn clear_errors(&self) {
        self.errors.lock().unwrap().clear();
    }

    /// Every (sport, region) fetched so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, sport: &str) -> usize {
        self.calls().iter().filter(|(s, _)| s == sport).count()
    }
}

#[async_trait]
impl OddsSource for MockSource {
    async fn fetch_region(&self, sport: &str, region: &str) -> Result<Vec<Match>, OddsError> {
        self.calls
            .lock()
            .unwrap()
            .push((sport.to_string(), region.to_string()));

        if let Some(err) = self.errors.lock().unwrap().get(sport) {
            return Err(err.clone());
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&(sport.to_string(), region.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn bookmaker(key: &str, home: f64, away: f64) -> Bookmaker {
    Bookmaker {
        key: key.to_string(),
        title: key.to_string(),
        last_update: None,
        markets: vec![Market {
            key: H2H_MARKET.to_string(),
            last_update: None,
            outcomes: vec![
                Outcome { name: "Home".into(), price: home, point: None },
                Outcome { name: "Away".into(), price: away, point: None },
            ],
            link: None,
        }],
        link: Some(format!("https://{key}.example/odds")),
        links: None,
    }
}

pub fn game(id: &str, sport: &str, kickoff: &str, bookmakers: Vec<Bookmaker>) -> Match {
    Match {
        id: id.to_string(),
        sport_key: sport.to_string(),
        sport_title: None,
        commence_time: kickoff.parse::<DateTime<Utc>>().unwrap(),
        home_team: "Home".to_string(),
        away_team: "Away".to_string(),
        bookmakers,
    }
}
