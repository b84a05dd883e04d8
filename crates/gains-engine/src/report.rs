//! Report assembly.
//!
//! Wraps FIFO matching with the past vs current-year summary split and
//! the full report payload.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};

use gains_core::dates::parse_mdy;
use gains_core::{CapitalGainsReport, GainsSummary, RealizedGain, TradeRecord};

use crate::matcher::{LotMatcher, MatchConfig};

/// Split realized gains into past years vs the as-of year.
///
/// A gain lands in `past_gains` when its sell year is strictly before the
/// as-of year, otherwise in `current_year_gains`. Gains whose sell date
/// fails to parse are left out of both buckets.
pub fn summarize_gains(
    gains: &BTreeMap<String, Vec<RealizedGain>>,
    as_of: NaiveDate,
) -> GainsSummary {
    let mut summary = GainsSummary::default();
    for (instrument, realized) in gains {
        for gain in realized {
            let sell_date = match parse_mdy(&gain.sell_date) {
                Some(date) => date,
                None => {
                    tracing::warn!(
                        "Skipping {} gain with unparseable sell date {:?}",
                        instrument, gain.sell_date
                    );
                    continue;
                }
            };
            if sell_date.year() < as_of.year() {
                summary.past_gains += gain.gain_loss;
            } else {
                summary.current_year_gains += gain.gain_loss;
            }
        }
    }
    summary
}

/// End-to-end capital gains calculation over a trade history.
#[derive(Debug, Clone)]
pub struct CapitalGainsEngine {
    matcher: LotMatcher,
    as_of: NaiveDate,
}

impl CapitalGainsEngine {
    pub fn new() -> Self {
        Self {
            matcher: LotMatcher::new(),
            as_of: Utc::now().date_naive(),
        }
    }

    pub fn with_config(config: MatchConfig) -> Self {
        Self {
            matcher: LotMatcher::with_config(config),
            as_of: Utc::now().date_naive(),
        }
    }

    /// Pin the date the summary year split is computed against.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Match a full trade history and assemble the report payload.
    pub fn calculate(&self, trades: &[TradeRecord]) -> CapitalGainsReport {
        let result = self.matcher.match_trades(trades);
        let summary = summarize_gains(&result.gains, self.as_of);
        tracing::info!(
            "Calculated gains for {} instruments, {} unsold lots left",
            result.gains.len(),
            result.unsold_lots.len()
        );
        CapitalGainsReport {
            gains: result.gains,
            summary,
            unsold_lots: result.unsold_lots,
            remaining_tickers: result.remaining_tickers,
        }
    }
}

impl Default for CapitalGainsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gains_core::GainType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gain(sell_date: &str, gain_loss: f64) -> RealizedGain {
        RealizedGain {
            instrument: "AAPL".to_string(),
            sell_date: sell_date.to_string(),
            buy_date: "01/01/2020".to_string(),
            quantity: 1.0,
            buy_price: 100.0,
            sell_price: 100.0 + gain_loss,
            gain_loss,
            gain_type: GainType::LongTerm,
        }
    }

    #[test]
    fn test_summary_splits_on_sell_year() {
        let mut gains = BTreeMap::new();
        gains.insert(
            "AAPL".to_string(),
            vec![gain("06/15/2021", 50.0), gain("02/01/2023", 30.0)],
        );
        gains.insert("MSFT".to_string(), vec![gain("11/30/2022", -20.0)]);

        let summary = summarize_gains(&gains, date(2023, 8, 1));
        assert_relative_eq!(summary.past_gains, 30.0);
        assert_relative_eq!(summary.current_year_gains, 30.0);
    }

    #[test]
    fn test_future_year_sells_count_as_current() {
        let mut gains = BTreeMap::new();
        gains.insert("AAPL".to_string(), vec![gain("01/15/2024", 10.0)]);

        let summary = summarize_gains(&gains, date(2023, 8, 1));
        assert_relative_eq!(summary.past_gains, 0.0);
        assert_relative_eq!(summary.current_year_gains, 10.0);
    }

    #[test]
    fn test_unparseable_sell_dates_excluded_from_summary() {
        let mut gains = BTreeMap::new();
        gains.insert(
            "AAPL".to_string(),
            vec![gain("garbage", 100.0), gain("03/01/2023", 5.0)],
        );

        let summary = summarize_gains(&gains, date(2023, 8, 1));
        assert_relative_eq!(summary.past_gains, 0.0);
        assert_relative_eq!(summary.current_year_gains, 5.0);
    }

    #[test]
    fn test_engine_end_to_end() {
        let trades = vec![
            TradeRecord::buy("01/10/2021", "AAPL", 10.0, 100.0).unwrap(),
            TradeRecord::sell("06/10/2022", "AAPL", 4.0, 150.0).unwrap(),
            TradeRecord::sell("02/10/2023", "AAPL", 4.0, 130.0).unwrap(),
            TradeRecord::buy("03/05/2023", "TSLA", 2.0, 200.0).unwrap(),
        ];
        let engine = CapitalGainsEngine::new().with_as_of(date(2023, 8, 1));
        let report = engine.calculate(&trades);

        // 2022 sale is past, 2023 sale is current year
        assert_relative_eq!(report.summary.past_gains, 200.0);
        assert_relative_eq!(report.summary.current_year_gains, 120.0);

        // 2 AAPL shares unsold plus the TSLA position
        assert_eq!(report.unsold_lots.len(), 2);
        assert_relative_eq!(report.unsold_lots[0].qty, 2.0);
        assert_eq!(
            report.remaining_tickers,
            vec!["AAPL".to_string(), "TSLA".to_string()]
        );
    }

    #[test]
    fn test_report_wire_shape() {
        let trades = vec![
            TradeRecord::buy("01/10/2023", "AAPL", 10.0, 100.0).unwrap(),
            TradeRecord::sell("06/10/2023", "AAPL", 4.0, 150.0).unwrap(),
        ];
        let engine = CapitalGainsEngine::new().with_as_of(date(2023, 8, 1));
        let value = serde_json::to_value(engine.calculate(&trades)).unwrap();

        assert!(value.get("gains").is_some());
        assert!(value.get("summary").is_some());
        assert!(value["summary"].get("past_gains").is_some());
        assert!(value["summary"].get("current_year_gains").is_some());
        assert!(value.get("remaining_tickers").is_some());

        let lot = &value["unsold_lots"][0];
        assert_eq!(lot["lotId"], "AAPL-1");
        assert!(lot.get("costBasisPerShare").is_some());
        assert_eq!(lot["purchaseDate"], "01/10/2023");

        let matched = &value["gains"]["AAPL"][0];
        assert_eq!(matched["gain_type"], "short_term");
        assert_eq!(matched["sell_date"], "06/10/2023");
    }
}
