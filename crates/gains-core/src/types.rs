//! Shared data model for the capital-gains pipeline.
//!
//! Wire field names are part of the service contract: tax lots serialize
//! camelCase (`lotId`, `costBasisPerShare`, `purchaseDate`), everything else
//! snake_case. Money math is `f64`, same as the rest of the workspace.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{first_anniversary, parse_mdy};
use crate::error::GainsError;

/// Brokerage activity transaction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransCode {
    Buy,
    Sell,
    /// Cash dividend; carried through but never matched against lots.
    #[serde(rename = "CDIV")]
    Dividend,
}

impl std::fmt::Display for TransCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransCode::Buy => write!(f, "Buy"),
            TransCode::Sell => write!(f, "Sell"),
            TransCode::Dividend => write!(f, "CDIV"),
        }
    }
}

/// One already-parsed row of brokerage trade history.
///
/// Dates stay in their `mm/dd/yyyy` wire form; the matcher parses them when
/// it needs calendar arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub activity_date: String,
    pub instrument: String,
    pub trans_code: TransCode,
    pub quantity: f64,
    pub price: f64,
    /// Signed cash flow: negative for purchases, positive for proceeds.
    pub amount: f64,
}

impl TradeRecord {
    /// Validated constructor; use the `buy`/`sell`/`dividend` shorthands
    /// where the cash flow follows from quantity and price.
    pub fn new(
        activity_date: impl Into<String>,
        instrument: impl Into<String>,
        trans_code: TransCode,
        quantity: f64,
        price: f64,
        amount: f64,
    ) -> anyhow::Result<Self> {
        let instrument = instrument.into();
        if instrument.trim().is_empty() {
            anyhow::bail!("instrument must be non-empty");
        }
        if !quantity.is_finite() || quantity < 0.0 {
            anyhow::bail!("quantity must be a non-negative number");
        }
        if !price.is_finite() || price < 0.0 {
            anyhow::bail!("price must be a non-negative number");
        }
        if !amount.is_finite() {
            anyhow::bail!("amount must be a number");
        }
        Ok(Self {
            activity_date: activity_date.into(),
            instrument,
            trans_code,
            quantity,
            price,
            amount,
        })
    }

    pub fn buy(
        activity_date: impl Into<String>,
        instrument: impl Into<String>,
        quantity: f64,
        price: f64,
    ) -> anyhow::Result<Self> {
        let amount = -(quantity * price);
        Self::new(activity_date, instrument, TransCode::Buy, quantity, price, amount)
    }

    pub fn sell(
        activity_date: impl Into<String>,
        instrument: impl Into<String>,
        quantity: f64,
        price: f64,
    ) -> anyhow::Result<Self> {
        let amount = quantity * price;
        Self::new(activity_date, instrument, TransCode::Sell, quantity, price, amount)
    }

    pub fn dividend(
        activity_date: impl Into<String>,
        instrument: impl Into<String>,
        amount: f64,
    ) -> anyhow::Result<Self> {
        Self::new(activity_date, instrument, TransCode::Dividend, 0.0, 0.0, amount)
    }
}

/// Short- vs long-term treatment of a realized (matched) gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainType {
    ShortTerm,
    LongTerm,
}

impl GainType {
    pub fn is_long_term(&self) -> bool {
        matches!(self, GainType::LongTerm)
    }
}

impl std::fmt::Display for GainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GainType::ShortTerm => write!(f, "Short-term"),
            GainType::LongTerm => write!(f, "Long-term"),
        }
    }
}

/// Holding-period classification of an unsold lot as of some date.
///
/// `Unknown` covers absent or unparseable purchase dates and is rendered
/// downstream as "—", never as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
    ShortTerm,
    LongTerm,
    Unknown,
}

impl HoldingPeriod {
    /// Classify a `mm/dd/yyyy` purchase date against an as-of date.
    ///
    /// Long-term once the as-of date is on or after the first anniversary
    /// of the purchase; strictly before the anniversary is short-term.
    pub fn classify(purchase_date: Option<&str>, as_of: NaiveDate) -> Self {
        let purchased = match purchase_date.and_then(parse_mdy) {
            Some(d) => d,
            None => return HoldingPeriod::Unknown,
        };
        match first_anniversary(purchased) {
            Some(anniversary) if as_of >= anniversary => HoldingPeriod::LongTerm,
            Some(_) => HoldingPeriod::ShortTerm,
            None => HoldingPeriod::Unknown,
        }
    }

    pub fn is_long_term(&self) -> bool {
        matches!(self, HoldingPeriod::LongTerm)
    }

    /// Display label used by rendering collaborators.
    pub fn label(&self) -> &'static str {
        match self {
            HoldingPeriod::ShortTerm => "Short-term",
            HoldingPeriod::LongTerm => "Long-term",
            HoldingPeriod::Unknown => "—",
        }
    }
}

/// An unsold tax lot.
///
/// `lot_id` is unique within one result set and stable for the session;
/// `qty` is positive and `cost_basis_per_share` non-negative. Lots are
/// immutable once produced; only their selection membership changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub lot_id: String,
    pub instrument: String,
    pub qty: f64,
    pub cost_basis_per_share: f64,
    /// `mm/dd/yyyy`; absent or unparseable means the holding period is
    /// unknown.
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl Lot {
    pub fn new(
        lot_id: impl Into<String>,
        instrument: impl Into<String>,
        qty: f64,
        cost_basis_per_share: f64,
        purchase_date: Option<String>,
    ) -> anyhow::Result<Self> {
        let instrument = instrument.into();
        if instrument.trim().is_empty() {
            anyhow::bail!("instrument must be non-empty");
        }
        if !qty.is_finite() || qty <= 0.0 {
            anyhow::bail!("qty must be positive");
        }
        if !cost_basis_per_share.is_finite() || cost_basis_per_share < 0.0 {
            anyhow::bail!("cost_basis_per_share must be non-negative");
        }
        Ok(Self {
            lot_id: lot_id.into(),
            instrument,
            qty,
            cost_basis_per_share,
            purchase_date,
        })
    }

    /// Holding-period classification as of `as_of`.
    pub fn holding_period(&self, as_of: NaiveDate) -> HoldingPeriod {
        HoldingPeriod::classify(self.purchase_date.as_deref(), as_of)
    }

    /// Unrealized gain/loss against a current price.
    pub fn unrealized_pl(&self, current_price: f64) -> f64 {
        (current_price - self.cost_basis_per_share) * self.qty
    }
}

/// One FIFO match of a sell against a buy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedGain {
    pub instrument: String,
    pub sell_date: String,
    pub buy_date: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub gain_loss: f64,
    pub gain_type: GainType,
}

/// Realized gains split into past years vs the current (as-of) year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GainsSummary {
    pub past_gains: f64,
    pub current_year_gains: f64,
}

/// Everything a full calculation produces for one trade history.
///
/// Serializes to the report payload consumed by planning front ends;
/// `gains` is keyed by instrument in sorted order so output is
/// deterministic for identical input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapitalGainsReport {
    pub gains: BTreeMap<String, Vec<RealizedGain>>,
    pub summary: GainsSummary,
    pub unsold_lots: Vec<Lot>,
    pub remaining_tickers: Vec<String>,
}

impl CapitalGainsReport {
    /// Parse a stored or received report payload.
    pub fn from_json(payload: &str) -> Result<Self, GainsError> {
        serde_json::from_str(payload).map_err(|e| GainsError::InvalidReport(e.to_string()))
    }
}
