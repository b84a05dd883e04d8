//! Core data model for the sell-all capital-gains tools.
//!
//! Shared by the realized-gains engine and the lot planner: tax lots, trade
//! records, price bookkeeping, and the strict `mm/dd/yyyy` date handling the
//! upstream service speaks.

pub mod dates;
pub mod error;
pub mod prices;
pub mod types;

pub use error::*;
pub use prices::*;
pub use types::*;
