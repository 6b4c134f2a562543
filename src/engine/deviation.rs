//! Price deviation analysis.
//!
//! For each outcome of a match, every bookmaker's head-to-head price is
//! compared against the mean price across all bookmakers quoting that
//! outcome. A quote more than 5% above the mean is flagged as value.

use serde::Serialize;

use crate::types::Match;

/// Deviation (in percent) beyond which a quote is flagged.
pub const VALUE_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteRating {
    Value,
    Fair,
    Poor,
}

impl QuoteRating {
    pub fn from_deviation(pct: f64) -> Self {
        if pct > VALUE_THRESHOLD_PCT {
            QuoteRating::Value
        } else if pct < -VALUE_THRESHOLD_PCT {
            QuoteRating::Poor
        } else {
            QuoteRating::Fair
        }
    }
}

/// One bookmaker's price on one outcome, relative to the market mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDeviation {
    pub outcome: String,
    pub bookmaker: String,
    pub price: f64,
    pub mean: f64,
    pub deviation_pct: f64,
    pub rating: QuoteRating,
}

/// Percentage difference between `price` and `mean`.
pub fn deviation_pct(price: f64, mean: f64) -> f64 {
    (price - mean) / mean * 100.0
}

/// Deviation of every head-to-head quote on the match, grouped by outcome
/// in the order outcomes first appear. Bookmakers without a head-to-head
/// market are skipped.
pub fn quote_deviations(m: &Match) -> Vec<QuoteDeviation> {
    let mut outcomes: Vec<&str> = Vec::new();
    for o in m.bookmakers.iter().filter_map(|b| b.h2h()).flat_map(|mk| mk.outcomes.iter()) {
        if !outcomes.contains(&o.name.as_str()) {
            outcomes.push(&o.name);
        }
    }

    let mut out = Vec::new();
    for outcome in outcomes {
        let quotes: Vec<(&str, f64)> = m
            .bookmakers
            .iter()
            .filter_map(|b| b.price_for(outcome).map(|p| (b.key.as_str(), p)))
            .filter(|(_, p)| *p > 0.0)
            .collect();
        if quotes.is_empty() {
            continue;
        }

        let mean = quotes.iter().map(|(_, p)| p).sum::<f64>() / quotes.len() as f64;
        out.extend(quotes.into_iter().map(|(bookmaker, price)| {
            let pct = deviation_pct(price, mean);
            QuoteDeviation {
                outcome: outcome.to_string(),
                bookmaker: bookmaker.to_string(),
                price,
                mean,
                deviation_pct: pct,
                rating: QuoteRating::from_deviation(pct),
            }
        }));
    }
    out
}

/// Largest deviation of any quote on the match; `None` without quotes.
pub fn max_value(m: &Match) -> Option<f64> {
    quote_deviations(m)
        .into_iter()
        .map(|q| q.deviation_pct)
        .fold(None, |best, d| Some(best.map_or(d, |b: f64| b.max(d))))
}
