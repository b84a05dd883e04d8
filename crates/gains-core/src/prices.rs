//! Current-price bookkeeping.
//!
//! A symbol absent from the map means "price unknown", never zero. Updates
//! merge into the existing map rather than replacing it, so a failed refresh
//! leaves the last known prices in place.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::GainsError;

/// Sparse map from instrument symbol to last known price.
#[derive(Debug, Clone, Default)]
pub struct PriceMap {
    prices: HashMap<String, f64>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known price for a symbol, if any.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.prices.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }

    /// Record a single price. Non-finite or negative values are rejected;
    /// returns whether the value was accepted.
    pub fn insert(&mut self, symbol: impl Into<String>, price: f64) -> bool {
        if !price.is_finite() || price < 0.0 {
            return false;
        }
        self.prices.insert(symbol.into(), price);
        true
    }

    /// Merge a batch of updates into the map. Symbols absent from the batch
    /// keep their previous price; invalid values are skipped. Returns the
    /// number of accepted entries.
    pub fn merge<I>(&mut self, updates: I) -> usize
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut accepted = 0;
        for (symbol, price) in updates {
            if self.insert(symbol, price) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Merge a raw price-service JSON payload.
    ///
    /// Accepts both documented response shapes, `{"prices": {sym: px}}` and
    /// a flat `{sym: px}` map. Non-numeric entries are skipped; a payload
    /// that is not an object at all is an error and the map is untouched.
    pub fn merge_payload(&mut self, payload: &str) -> Result<usize, GainsError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| GainsError::InvalidPrice(e.to_string()))?;
        let object = match &value {
            Value::Object(object) => match object.get("prices") {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(GainsError::InvalidPrice(
                        "\"prices\" field is not an object".to_string(),
                    ))
                }
                None => object,
            },
            _ => {
                return Err(GainsError::InvalidPrice(
                    "price payload is not a JSON object".to_string(),
                ))
            }
        };

        let mut accepted = 0;
        for (symbol, price) in object {
            match price.as_f64() {
                Some(p) if self.insert(symbol.clone(), p) => accepted += 1,
                _ => tracing::debug!("Skipping non-numeric price entry for {}", symbol),
            }
        }
        Ok(accepted)
    }
}

impl FromIterator<(String, f64)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut map = PriceMap::new();
        map.merge(iter);
        map
    }
}
