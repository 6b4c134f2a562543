//! Cross-region merge.
//!
//! Combines one sport's results from the primary and secondary regions.
//! The primary region defines which matches are reported; the secondary
//! region only contributes additional bookmakers to those matches. When a
//! bookmaker appears in both, the primary quote is kept.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::policy::BookmakerPolicy;
use crate::types::Match;

/// Merge `primary` and `secondary` into one deduplicated, policy-filtered
/// list, in `primary` order. Matches left with no bookmakers are dropped.
pub fn merge_regions(
    primary: Vec<Match>,
    secondary: Vec<Match>,
    policy: &BookmakerPolicy,
) -> Vec<Match> {
    let primary_count = primary.len();

    // Later duplicates overwrite earlier ones.
    let mut secondary_by_id: HashMap<String, Match> =
        secondary.into_iter().map(|m| (m.id.clone(), m)).collect();

    let merged: Vec<Match> = primary
        .into_iter()
        .filter_map(|mut m| {
            let mut bookmakers = std::mem::take(&mut m.bookmakers);
            if let Some(other) = secondary_by_id.remove(&m.id) {
                bookmakers.extend(other.bookmakers);
            }

            let mut seen = HashSet::new();
            bookmakers.retain(|b| seen.insert(b.key.clone()));

            m.bookmakers = policy.apply(bookmakers);
            (!m.bookmakers.is_empty()).then_some(m)
        })
        .collect();

    debug!(
        primary = primary_count,
        merged = merged.len(),
        "Regions merged"
    );
    merged
}
