//! Aggregation engine: bookmaker policy, region merge, per-sport cache,
//! multi-sport aggregation and price deviation analysis.

pub mod aggregator;
pub mod cache;
pub mod deviation;
pub mod merge;
pub mod policy;
