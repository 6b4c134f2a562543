//! Per-sport odds cache.
//!
//! Each sport key owns one slot. A slot holds the merged match list and the
//! instant it was written; entries younger than the TTL are served as-is,
//! anything else triggers a refresh (both regions fetched concurrently,
//! then merged). The slot's mutex is held across the refresh, so concurrent
//! requests for the same sport queue behind the one in-flight fetch and are
//! answered with its outcome: the entry it wrote, or the error it hit.
//! Different sports never contend.
//!
//! A failed refresh leaves the previous entry (or its absence) untouched and
//! returns the error. Stale data is never served. Only callers that were
//! already waiting share a failure; later requests start a new refresh.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::merge::merge_regions;
use super::policy::BookmakerPolicy;
use crate::config::AppConfig;
use crate::provider::OddsSource;
use crate::types::{Match, OddsError};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Regions, freshness window and per-fetch timeout for a `SportCache`.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub primary_region: String,
    pub secondary_region: String,
    pub ttl: Duration,
    pub fetch_timeout: Duration,
}

impl CacheSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            primary_region: cfg.provider.primary_region.clone(),
            secondary_region: cfg.provider.secondary_region.clone(),
            ttl: cfg.cache.ttl(),
            fetch_timeout: cfg.provider.request_timeout(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    matches: Arc<Vec<Match>>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Debug, Default)]
struct SlotState {
    entry: Option<CacheEntry>,
    /// Error of the most recent refresh, cleared by the next success.
    last_failure: Option<OddsError>,
}

#[derive(Debug, Default)]
struct SlotInner {
    state: Mutex<SlotState>,
    /// Completed refresh attempts, bumped while the state lock is held.
    attempts: AtomicU64,
}

type Slot = Arc<SlotInner>;

/// Point-in-time view of one cache slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SportCacheStatus {
    pub sport: String,
    /// Matches in the stored entry. `None` when nothing has been stored yet,
    /// and also while `refreshing` is set: the entry is not inspected then.
    pub matches: Option<usize>,
    pub age_secs: Option<u64>,
    pub fresh: bool,
    /// A refresh currently holds the slot.
    pub refreshing: bool,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// TTL cache of merged odds, keyed by sport.
pub struct SportCache {
    source: Arc<dyn OddsSource>,
    policy: BookmakerPolicy,
    settings: CacheSettings,
    slots: RwLock<HashMap<String, Slot>>,
}

impl SportCache {
    pub fn new(source: Arc<dyn OddsSource>, policy: BookmakerPolicy, settings: CacheSettings) -> Self {
        Self {
            source,
            policy,
            settings,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Merged odds for `sport`, from cache when fresh, otherwise refetched.
    pub async fn get(&self, sport: &str) -> Result<Arc<Vec<Match>>, OddsError> {
        let slot = self.slot(sport).await;
        let seen = slot.attempts.load(Ordering::Acquire);
        let mut state = slot.state.lock().await;

        if let Some(cached) = state.entry.as_ref() {
            if cached.is_fresh(self.settings.ttl) {
                debug!(sport, age_ms = cached.fetched_at.elapsed().as_millis() as u64, "Cache hit");
                return Ok(Arc::clone(&cached.matches));
            }
        }

        // A refresh finished while we queued; reuse its failure.
        if slot.attempts.load(Ordering::Acquire) != seen {
            if let Some(err) = state.last_failure.as_ref() {
                debug!(sport, error = %err, "Sharing failed refresh with waiter");
                return Err(err.clone());
            }
        }

        debug!(sport, stale = state.entry.is_some(), "Cache miss");
        let result = self.refresh(sport).await;
        slot.attempts.fetch_add(1, Ordering::Release);

        match result {
            Ok(matches) => {
                let matches = Arc::new(matches);
                state.entry = Some(CacheEntry {
                    matches: Arc::clone(&matches),
                    fetched_at: Instant::now(),
                });
                state.last_failure = None;
                Ok(matches)
            }
            Err(e) => {
                state.last_failure = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Status of every sport requested so far, sorted by sport key.
    pub async fn status(&self) -> Vec<SportCacheStatus> {
        let slots = self.slots.read().await;
        let mut out: Vec<SportCacheStatus> = slots
            .iter()
            .map(|(sport, slot)| match slot.state.try_lock() {
                Ok(state) => SportCacheStatus {
                    sport: sport.clone(),
                    matches: state.entry.as_ref().map(|e| e.matches.len()),
                    age_secs: state.entry.as_ref().map(|e| e.fetched_at.elapsed().as_secs()),
                    fresh: state.entry.as_ref().is_some_and(|e| e.is_fresh(self.settings.ttl)),
                    refreshing: false,
                },
                Err(_) => SportCacheStatus {
                    sport: sport.clone(),
                    matches: None,
                    age_secs: None,
                    fresh: false,
                    refreshing: true,
                },
            })
            .collect();
        out.sort_by(|a, b| a.sport.cmp(&b.sport));
        out
    }

    async fn slot(&self, sport: &str) -> Slot {
        if let Some(slot) = self.slots.read().await.get(sport) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(
            slots
                .entry(sport.to_string())
                .or_insert_with(Slot::default),
        )
    }

    /// Fetch both regions concurrently and merge them.
    async fn refresh(&self, sport: &str) -> Result<Vec<Match>, OddsError> {
        let started = Instant::now();
        let (primary, secondary) = tokio::join!(
            self.fetch(sport, &self.settings.primary_region),
            self.fetch(sport, &self.settings.secondary_region),
        );

        let (primary, secondary) = match (primary, secondary) {
            (Ok(p), Ok(s)) => (p, s),
            (Err(e), _) | (_, Err(e)) => {
                warn!(sport, error = %e, "Odds refresh failed");
                return Err(e);
            }
        };

        let fetched = (primary.len(), secondary.len());
        let merged = merge_regions(primary, secondary, &self.policy);

        info!(
            sport,
            primary = fetched.0,
            secondary = fetched.1,
            merged = merged.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Odds refreshed"
        );
        Ok(merged)
    }

    async fn fetch(&self, sport: &str, region: &str) -> Result<Vec<Match>, OddsError> {
        let timeout = self.settings.fetch_timeout;
        tokio::time::timeout(timeout, self.source.fetch_region(sport, region))
            .await
            .map_err(|_| {
                OddsError::transport(format!(
                    "{region} odds fetch for {sport} timed out after {}s",
                    timeout.as_secs()
                ))
            })?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
