//! Planned-sale selection state.

use std::collections::HashSet;

use gains_core::Lot;

/// The set of lot ids the user has marked as planned to sell.
///
/// Advisory client-side state only: ids are not validated against the
/// current lot list, so a stale id is harmless noise that never matches a
/// lot. The set is reset whenever a new lot list arrives.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    selected: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, lot_id: &str) -> bool {
        self.selected.contains(lot_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Flip membership of one lot id.
    ///
    /// Returns whether the id is selected after the toggle.
    pub fn toggle(&mut self, lot_id: &str) -> bool {
        if self.selected.remove(lot_id) {
            false
        } else {
            self.selected.insert(lot_id.to_string());
            true
        }
    }

    /// Whether every lot in `lots` is selected.
    ///
    /// An empty slice is never "all selected"; the bulk toggle below must
    /// not see a ticker without long-term lots as fully selected.
    pub fn all_selected(&self, lots: &[&Lot]) -> bool {
        !lots.is_empty() && lots.iter().all(|lot| self.contains(&lot.lot_id))
    }

    /// Bulk toggle for one ticker's long-term lots.
    ///
    /// With `all_long_term_selected`, clears ALL of the ticker's lots,
    /// short-term included, giving a one-click undo. Otherwise selects the
    /// long-term lots and leaves short-term membership untouched; short-term
    /// lots are never auto-selected.
    pub fn toggle_ticker_long_term(
        &mut self,
        long_term_lots: &[&Lot],
        all_long_term_selected: bool,
        all_lots: &[&Lot],
    ) {
        if all_long_term_selected {
            for lot in all_lots {
                self.selected.remove(&lot.lot_id);
            }
        } else {
            for lot in long_term_lots {
                self.selected.insert(lot.lot_id.clone());
            }
        }
    }
}
