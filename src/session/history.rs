//! Fit history and the flexibility ordering used by the error panel

use serde::{Deserialize, Serialize};

/// One recorded fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub k: usize,
    pub train_mse: f64,
    pub val_mse: f64,
}

/// A history entry placed on the flexibility axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexibilityPoint {
    pub flexibility: i64,
    pub k: usize,
    pub train_mse: f64,
    pub val_mse: f64,
}

/// `n_train - k`; smaller neighbourhoods are more flexible
pub fn flexibility(n_train: usize, k: usize) -> i64 {
    n_train as i64 - k as i64
}

/// Append-only record of fits in call order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitHistory {
    entries: Vec<HistoryEntry>,
}

impl FitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in call order
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries sorted by flexibility ascending; ties keep call order
    pub fn by_flexibility(&self, n_train: usize) -> Vec<FlexibilityPoint> {
        let mut points: Vec<FlexibilityPoint> = self
            .entries
            .iter()
            .map(|e| FlexibilityPoint {
                flexibility: flexibility(n_train, e.k),
                k: e.k,
                train_mse: e.train_mse,
                val_mse: e.val_mse,
            })
            .collect();
        // sort_by_key is stable
        points.sort_by_key(|p| p.flexibility);
        points
    }
}
