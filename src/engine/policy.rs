//! Bookmaker policy: which bookmakers are exposed, and how many per match.

use std::collections::HashSet;

use crate::config::BookmakersConfig;
use crate::types::Bookmaker;

/// Immutable allow-list plus per-match cap, fixed at startup.
#[derive(Debug, Clone)]
pub struct BookmakerPolicy {
    allowed: HashSet<String>,
    max_per_match: usize,
}

impl BookmakerPolicy {
    pub fn new<I, S>(allowed: I, max_per_match: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            max_per_match,
        }
    }

    pub fn from_config(cfg: &BookmakersConfig) -> Self {
        Self::new(cfg.allowed.iter().cloned(), cfg.max_per_match)
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        self.allowed.contains(key)
    }

    pub fn max_per_match(&self) -> usize {
        self.max_per_match
    }

    /// Keep allow-listed bookmakers in their current order, up to the cap.
    pub fn apply(&self, bookmakers: Vec<Bookmaker>) -> Vec<Bookmaker> {
        bookmakers
            .into_iter()
            .filter(|b| self.is_allowed(&b.key))
            .take(self.max_per_match)
            .collect()
    }
}

impl Default for BookmakerPolicy {
    fn default() -> Self {
        Self::from_config(&BookmakersConfig::default())
    }
}
