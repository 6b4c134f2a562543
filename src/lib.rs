//! Odds aggregator: multi-region sports odds with bookmaker allow-listing.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod provider;
pub mod engine;
pub mod server;
