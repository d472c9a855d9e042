//! Series provider seam.
//!
//! The core never reads files. Whatever aggregates raw sales into daily,
//! zero-filled series implements `SeriesProvider`; the runner ships a CSV-backed
//! one, tests use `VecSeriesProvider`.

use std::collections::BTreeMap;

use crate::domain::{DemandSeries, SeriesError};

/// Supplies one contiguous daily demand series per item.
pub trait SeriesProvider: Send + Sync {
    /// Item identifiers in a stable (sorted) order.
    fn items(&self) -> Vec<String>;

    /// The series for `item`.
    ///
    /// Unknown items yield `SeriesError::UnknownItem`; a series that exists
    /// but cannot be built yields the construction error.
    fn series(&self, item: &str) -> Result<DemandSeries, SeriesError>;
}

/// In-memory provider keyed by item.
#[derive(Debug, Clone, Default)]
pub struct VecSeriesProvider {
    series: BTreeMap<String, DemandSeries>,
}

impl VecSeriesProvider {
    pub fn new(series: impl IntoIterator<Item = DemandSeries>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|s| (s.item().to_string(), s))
                .collect(),
        }
    }
}

impl SeriesProvider for VecSeriesProvider {
    fn items(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    fn series(&self, item: &str) -> Result<DemandSeries, SeriesError> {
        self.series
            .get(item)
            .cloned()
            .ok_or_else(|| SeriesError::UnknownItem {
                item: item.to_string(),
            })
    }
}
