//! Sell planning over unsold lots.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gains_core::{CapitalGainsReport, GainsError, GainsSummary, HoldingPeriod, Lot, PriceMap};

use crate::grouping::{group_by_ticker, TickerGroup, TickerSummary};
use crate::selection::SelectionSet;

/// Interactive planning state: unsold lots, last known prices, and the
/// planned-sale selection.
///
/// Every query recomputes from the current (lots, prices, selection)
/// triple, so identical state always produces identical output.
#[derive(Debug, Clone)]
pub struct SellPlanner {
    lots: Vec<Lot>,
    prices: PriceMap,
    selection: SelectionSet,
    summary: GainsSummary,
    as_of: NaiveDate,
}

impl SellPlanner {
    pub fn new() -> Self {
        Self {
            lots: Vec::new(),
            prices: PriceMap::new(),
            selection: SelectionSet::new(),
            summary: GainsSummary::default(),
            as_of: Utc::now().date_naive(),
        }
    }

    /// Pin the date holding periods are classified against.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    /// Adopt a fresh calculation result, replacing the lot list and the
    /// realized-gains summary. Resets the selection; prices persist.
    pub fn load_report(&mut self, report: &CapitalGainsReport) {
        self.summary = report.summary;
        self.set_lots(report.unsold_lots.clone());
    }

    /// Parse and adopt a stored report payload.
    ///
    /// On a malformed payload the planner state is left untouched.
    pub fn load_report_payload(&mut self, payload: &str) -> Result<(), GainsError> {
        let report = CapitalGainsReport::from_json(payload)?;
        self.load_report(&report);
        Ok(())
    }

    /// Replace the lot list. Resets the selection.
    pub fn set_lots(&mut self, lots: Vec<Lot>) {
        tracing::info!("Loaded {} unsold lots, selection reset", lots.len());
        self.lots = lots;
        self.selection.clear();
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn prices(&self) -> &PriceMap {
        &self.prices
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn summary(&self) -> GainsSummary {
        self.summary
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Merge a batch of price updates. Symbols absent from the batch keep
    /// their previous price.
    pub fn merge_prices<I>(&mut self, updates: I) -> usize
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        self.prices.merge(updates)
    }

    /// Merge a raw price-service JSON payload.
    ///
    /// On any payload error the existing prices stay in place.
    pub fn apply_price_payload(&mut self, payload: &str) -> Result<usize, GainsError> {
        self.prices.merge_payload(payload)
    }

    /// Flip one lot's planned-sale membership.
    ///
    /// Ids are not validated against the lot list; an unknown id becomes
    /// selection noise with no visible effect.
    pub fn toggle_lot(&mut self, lot_id: &str) -> bool {
        self.selection.toggle(lot_id)
    }

    /// Bulk toggle for one ticker's long-term lots.
    ///
    /// Recomputes the ticker's long-term subset as of the planner date,
    /// then applies the select-or-clear policy: with every long-term lot
    /// already selected, all of the ticker's lots are cleared; otherwise
    /// the long-term lots are selected.
    pub fn toggle_ticker_long_term(&mut self, ticker: &str) {
        let as_of = self.as_of;
        let all: Vec<&Lot> = self
            .lots
            .iter()
            .filter(|lot| lot.instrument == ticker)
            .collect();
        if all.is_empty() {
            tracing::debug!("No lots for ticker {}, bulk toggle ignored", ticker);
            return;
        }
        let long_term: Vec<&Lot> = all
            .iter()
            .copied()
            .filter(|lot| lot.holding_period(as_of).is_long_term())
            .collect();
        let all_long_term_selected = self.selection.all_selected(&long_term);
        self.selection
            .toggle_ticker_long_term(&long_term, all_long_term_selected, &all);
    }

    /// Ticker groups over the current lot list, in first-seen order.
    pub fn groups(&self) -> Vec<TickerGroup<'_>> {
        group_by_ticker(&self.lots)
    }

    /// Projected additional realized gain across the current selection.
    ///
    /// Sums unrealized P/L over every selected lot whose ticker has a
    /// known price. Selected lots without a known price are left out of
    /// the sum rather than counted as zero.
    pub fn planned_additional_gain(&self) -> f64 {
        let mut total = 0.0;
        for lot in &self.lots {
            if !self.selection.contains(&lot.lot_id) {
                continue;
            }
            let price = match self.prices.get(&lot.instrument) {
                Some(p) => p,
                None => continue,
            };
            total += lot.unrealized_pl(price);
        }
        total
    }

    /// Current-year realized gains plus the planned additional gain.
    ///
    /// A planning aid for "what would this year look like if I sold the
    /// selection now", not a tax computation.
    pub fn projected_current_year_total(&self) -> f64 {
        self.summary.current_year_gains + self.planned_additional_gain()
    }

    /// Snapshot of every ticker block, shaped for rendering.
    pub fn overview(&self) -> Vec<TickerOverview> {
        group_by_ticker(&self.lots)
            .iter()
            .map(|group| self.ticker_overview(group))
            .collect()
    }

    fn ticker_overview(&self, group: &TickerGroup<'_>) -> TickerOverview {
        let price = self.prices.get(group.ticker);
        let long_term = group.long_term_lots(self.as_of);
        TickerOverview {
            ticker: group.ticker.to_string(),
            price,
            summary: group.summarize(price),
            long_term_count: long_term.len(),
            all_long_term_selected: self.selection.all_selected(&long_term),
            lots: group
                .lots
                .iter()
                .map(|lot| LotOverview {
                    lot_id: lot.lot_id.clone(),
                    qty: lot.qty,
                    cost_basis_per_share: lot.cost_basis_per_share,
                    purchase_date: lot.purchase_date.clone(),
                    holding_period: lot.holding_period(self.as_of),
                    unrealized_pl: price.map(|p| lot.unrealized_pl(p)),
                    selected: self.selection.contains(&lot.lot_id),
                })
                .collect(),
        }
    }
}

impl Default for SellPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// One ticker block prepared for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerOverview {
    pub ticker: String,
    pub price: Option<f64>,
    pub summary: TickerSummary,
    /// How many of the ticker's lots are long-term as of the planner date.
    /// Zero means the bulk toggle has nothing to act on.
    pub long_term_count: usize,
    pub all_long_term_selected: bool,
    pub lots: Vec<LotOverview>,
}

/// One lot row prepared for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotOverview {
    pub lot_id: String,
    pub qty: f64,
    pub cost_basis_per_share: f64,
    pub purchase_date: Option<String>,
    pub holding_period: HoldingPeriod,
    /// `None` when the ticker has no known price.
    pub unrealized_pl: Option<f64>,
    pub selected: bool,
}
