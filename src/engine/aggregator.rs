//! Multi-sport aggregation.
//!
//! Walks the requested sports in order through the cache, concatenates the
//! per-sport lists and sorts the result by kickoff. Any failure aborts the
//! whole request; a partial multi-sport response is never produced.

use std::sync::Arc;
use tracing::info;

use super::cache::SportCache;
use crate::types::{Match, OddsError};

pub struct Aggregator {
    cache: Arc<SportCache>,
}

impl Aggregator {
    pub fn new(cache: Arc<SportCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SportCache> {
        &self.cache
    }

    /// Combined odds for `sports`, ascending by commence time.
    ///
    /// Sports are fetched one after another and their lists concatenated
    /// as given. Equal commence times keep request order.
    pub async fn aggregate<S: AsRef<str>>(&self, sports: &[S]) -> Result<Vec<Match>, OddsError> {
        let mut combined = Vec::new();

        for sport in sports.iter().map(AsRef::as_ref) {
            let matches = self.cache.get(sport).await?;
            combined.extend(matches.iter().cloned());
        }

        combined.sort_by_key(|m| m.commence_time);

        info!(sports = sports.len(), matches = combined.len(), "Odds aggregated");
        Ok(combined)
    }
}
