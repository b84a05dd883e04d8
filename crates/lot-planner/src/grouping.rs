//! Ticker grouping and per-ticker aggregation.
//!
//! Groups are derived from the flat lot list on every read rather than
//! kept as a persistent structure; lot counts are small enough that the
//! rebuild is cheaper than maintaining an incremental cache.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gains_core::{Lot, PriceMap};

/// All lots sharing one instrument, in original list order.
#[derive(Debug, Clone)]
pub struct TickerGroup<'a> {
    pub ticker: &'a str,
    pub lots: Vec<&'a Lot>,
}

/// Group lots by instrument.
///
/// Tickers come out in first-seen order and each group keeps the original
/// lot order, so repeated grouping of the same list renders identically.
pub fn group_by_ticker(lots: &[Lot]) -> Vec<TickerGroup<'_>> {
    let mut groups: Vec<TickerGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for lot in lots {
        match index.get(lot.instrument.as_str()) {
            Some(&i) => groups[i].lots.push(lot),
            None => {
                index.insert(lot.instrument.as_str(), groups.len());
                groups.push(TickerGroup {
                    ticker: lot.instrument.as_str(),
                    lots: vec![lot],
                });
            }
        }
    }
    groups
}

/// Aggregated position and unrealized P/L for one ticker.
///
/// `total_qty` is always computed. The P/L fields are `None` whenever the
/// ticker has no known price; callers must render that as unavailable,
/// never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub total_qty: f64,
    pub net_pl: Option<f64>,
    /// Sum of the non-negative per-lot P/L values.
    pub gains_only: Option<f64>,
    /// Sum of the negative per-lot P/L values, kept signed (non-positive).
    pub losses_only: Option<f64>,
}

impl<'a> TickerGroup<'a> {
    /// Aggregate quantity and unrealized P/L against a current price.
    pub fn summarize(&self, price: Option<f64>) -> TickerSummary {
        let total_qty: f64 = self.lots.iter().map(|lot| lot.qty).sum();
        let price = match price {
            Some(p) => p,
            None => {
                return TickerSummary {
                    total_qty,
                    net_pl: None,
                    gains_only: None,
                    losses_only: None,
                }
            }
        };

        let mut net_pl = 0.0;
        let mut gains_only = 0.0;
        let mut losses_only = 0.0;
        for lot in &self.lots {
            let pl = lot.unrealized_pl(price);
            net_pl += pl;
            if pl >= 0.0 {
                gains_only += pl;
            } else {
                losses_only += pl;
            }
        }
        TickerSummary {
            total_qty,
            net_pl: Some(net_pl),
            gains_only: Some(gains_only),
            losses_only: Some(losses_only),
        }
    }

    /// Summarize using the group's price from a price map.
    pub fn summarize_with(&self, prices: &PriceMap) -> TickerSummary {
        self.summarize(prices.get(self.ticker))
    }

    /// The group's lots whose holding period is long-term as of `as_of`.
    ///
    /// Lots with an unknown holding period are never treated as long-term.
    pub fn long_term_lots(&self, as_of: NaiveDate) -> Vec<&'a Lot> {
        self.lots
            .iter()
            .copied()
            .filter(|lot| lot.holding_period(as_of).is_long_term())
            .collect()
    }
}
