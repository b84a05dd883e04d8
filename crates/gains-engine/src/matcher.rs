//! FIFO lot matching.
//!
//! Replays a trade history per instrument, consuming buys oldest-first, to
//! produce the realized gains and the unsold tax lots left behind.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gains_core::dates::parse_mdy;
use gains_core::{GainType, Lot, RealizedGain, TradeRecord, TransCode};

/// Residual share quantities at or below this are treated as fully consumed.
const QTY_EPSILON: f64 = 1e-9;

/// Matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Holding periods strictly greater than this many days realize
    /// long-term gains.
    pub long_term_threshold_days: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            long_term_threshold_days: 365,
        }
    }
}

/// Everything FIFO matching yields for one trade history.
///
/// `gains` has an entry for every instrument seen in the input, even when no
/// sale was matched for it. `unsold_lots` keeps instruments in first-seen
/// order with each instrument's lots in purchase-date order.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub gains: BTreeMap<String, Vec<RealizedGain>>,
    pub unsold_lots: Vec<Lot>,
    pub remaining_tickers: Vec<String>,
}

/// A buy that still has unconsumed shares.
struct OpenBuy<'a> {
    trade: &'a TradeRecord,
    date: NaiveDate,
    remaining: f64,
    /// 1-based position among the instrument's buys; keeps generated lot
    /// ids stable no matter how many earlier buys were consumed.
    ordinal: usize,
}

/// Matches sells against buys first-in-first-out.
#[derive(Debug, Clone, Default)]
pub struct LotMatcher {
    config: MatchConfig,
}

impl LotMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Run FIFO matching over a whole trade history.
    pub fn match_trades(&self, trades: &[TradeRecord]) -> MatchResult {
        let mut order: Vec<&str> = Vec::new();
        let mut by_instrument: HashMap<&str, Vec<&TradeRecord>> = HashMap::new();
        for trade in trades {
            let entry = by_instrument.entry(trade.instrument.as_str()).or_default();
            if entry.is_empty() {
                order.push(trade.instrument.as_str());
            }
            entry.push(trade);
        }

        let mut result = MatchResult::default();
        for instrument in order {
            let (realized, lots) = self.match_instrument(instrument, &by_instrument[instrument]);
            if !lots.is_empty() {
                result.remaining_tickers.push(instrument.to_string());
            }
            result.unsold_lots.extend(lots);
            result.gains.insert(instrument.to_string(), realized);
        }
        result
    }

    /// Match one instrument's trades, in activity-date order.
    fn match_instrument(
        &self,
        instrument: &str,
        trades: &[&TradeRecord],
    ) -> (Vec<RealizedGain>, Vec<Lot>) {
        let mut dated: Vec<(NaiveDate, &TradeRecord)> = Vec::with_capacity(trades.len());
        for &trade in trades {
            match parse_mdy(&trade.activity_date) {
                Some(date) => dated.push((date, trade)),
                None => tracing::warn!(
                    "Skipping {} {} trade with unparseable date {:?}",
                    instrument, trade.trans_code, trade.activity_date
                ),
            }
        }
        // Stable sort: same-day trades keep their input order
        dated.sort_by_key(|(date, _)| *date);

        let mut buys: VecDeque<OpenBuy> = VecDeque::new();
        let mut sells: Vec<(NaiveDate, &TradeRecord)> = Vec::new();
        for (date, trade) in dated {
            match trade.trans_code {
                TransCode::Buy => {
                    let ordinal = buys.len() + 1;
                    buys.push_back(OpenBuy {
                        trade,
                        date,
                        remaining: trade.quantity,
                        ordinal,
                    });
                }
                TransCode::Sell => sells.push((date, trade)),
                TransCode::Dividend => {}
            }
        }

        let mut realized = Vec::new();
        for (sell_date, sell) in sells {
            let mut remaining_sell = sell.quantity;
            while remaining_sell > QTY_EPSILON {
                let buy = match buys.front_mut() {
                    Some(buy) => buy,
                    None => {
                        tracing::warn!(
                            "Sell of {:.5} {} on {} exceeds matched buys by {:.5}; excess dropped",
                            sell.quantity, instrument, sell.activity_date, remaining_sell
                        );
                        break;
                    }
                };

                let matched = remaining_sell.min(buy.remaining);
                let days_held = (sell_date - buy.date).num_days();
                let gain_type = if days_held > self.config.long_term_threshold_days {
                    GainType::LongTerm
                } else {
                    GainType::ShortTerm
                };

                realized.push(RealizedGain {
                    instrument: instrument.to_string(),
                    sell_date: sell.activity_date.clone(),
                    buy_date: buy.trade.activity_date.clone(),
                    quantity: matched,
                    buy_price: buy.trade.price,
                    sell_price: sell.price,
                    gain_loss: (sell.price - buy.trade.price) * matched,
                    gain_type,
                });

                remaining_sell -= matched;
                buy.remaining -= matched;
                if buy.remaining <= QTY_EPSILON {
                    buys.pop_front();
                }
            }
        }

        let unsold = buys
            .into_iter()
            .filter(|buy| buy.remaining > QTY_EPSILON)
            .map(|buy| Lot {
                lot_id: format!("{}-{}", instrument, buy.ordinal),
                instrument: instrument.to_string(),
                qty: buy.remaining,
                cost_basis_per_share: buy.trade.price,
                purchase_date: Some(buy.trade.activity_date.clone()),
            })
            .collect();

        (realized, unsold)
    }
}
