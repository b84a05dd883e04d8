//! Lot Planner
//!
//! Interactive sell planning over unsold tax lots: holding-period
//! classification, per-ticker aggregation of unrealized P/L, planned-sale
//! selection state, and the projected-gain rollup across the selection.

pub mod grouping;
pub mod planner;
pub mod selection;

pub use grouping::{group_by_ticker, TickerGroup, TickerSummary};
pub use planner::{LotOverview, SellPlanner, TickerOverview};
pub use selection::SelectionSet;
