//! Gains Engine
//!
//! FIFO matching of sells against buys per instrument, realized gain
//! classification, and assembly of the full capital gains report with its
//! past vs current-year summary.

pub mod matcher;
pub mod report;

pub use matcher::{LotMatcher, MatchConfig, MatchResult};
pub use report::{summarize_gains, CapitalGainsEngine};
