//! Transaction loading, cleaning, and daily aggregation.
//!
//! Raw point-of-sale exports are messy: free-text item names, placeholder
//! values like `ERROR` or `UNKNOWN` in numeric and date columns. Loading runs
//! in three steps:
//! 1. `read_transactions` reads the CSV as strings and checks the header
//! 2. `clean_transactions` normalises items, parses dates and numbers, and
//!    drops unusable rows
//! 3. `aggregate_daily` sums per (date, item) and zero-fills every item over
//!    the global date range
//!
//! The resulting `DailyDemand` is the runner's `SeriesProvider`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use demandlab_core::domain::{DemandSeries, SeriesError};
use demandlab_core::provider::SeriesProvider;

use crate::config::CleanConfig;

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Transaction ID",
    "Item",
    "Quantity",
    "Price Per Unit",
    "Total Spent",
    "Transaction Date",
];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
}

// ─── Reading ─────────────────────────────────────────────────────────

/// One input row, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txn_id: String,
    pub item: String,
    pub quantity: String,
    pub price_per_unit: String,
    pub total_spent: String,
    pub transaction_date: String,
}

/// Read a transactions CSV from disk.
pub fn read_transactions(path: &Path) -> Result<Vec<RawTransaction>, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.display().to_string(),
            source,
        })?;
    let rows = read_records(reader)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "transactions read");
    Ok(rows)
}

/// Read transactions from any CSV source.
pub fn parse_transactions<R: Read>(source: R) -> Result<Vec<RawTransaction>, LoadError> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    read_records(reader)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawTransaction>, LoadError> {
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&c| position(c).is_none())
        .map(|&c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }
    let idx: Vec<usize> = REQUIRED_COLUMNS.iter().filter_map(|&c| position(c)).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(idx[i]).unwrap_or("").to_string();
        rows.push(RawTransaction {
            txn_id: field(0),
            item: field(1),
            quantity: field(2),
            price_per_unit: field(3),
            total_spent: field(4),
            transaction_date: field(5),
        });
    }
    Ok(rows)
}

// ─── Cleaning ────────────────────────────────────────────────────────

/// A cleaned, typed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_id: String,
    pub item: String,
    pub date: NaiveDate,
    pub quantity: f64,
    pub price_per_unit: Option<f64>,
    pub total_spent: Option<f64>,
}

// `%Y` takes any number of digits, so "1/5/23" matches `%m/%d/%Y` as year 23.
// Such years fall outside `PLAUSIBLE_YEARS` and parsing moves on to `%y`.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d.%m.%Y", "%d.%m.%y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Years a transaction date may fall in.
pub const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn plausible(date: &NaiveDate) -> bool {
    PLAUSIBLE_YEARS.contains(&date.year())
}

/// Parse a transaction date; `None` for placeholders, garbage, and years
/// outside `PLAUSIBLE_YEARS`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .filter_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .find(plausible)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
                .find(plausible)
        })
}

/// Parse a finite number; `None` otherwise.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalise and filter raw rows.
///
/// - item names are trimmed and lower-cased; empty names are dropped
/// - rows with an unparseable date are dropped
/// - a non-numeric quantity counts as 0; negative quantities are dropped
/// - items listed in `config.drop_items` are dropped
///
/// Output is sorted by date, then item.
pub fn clean_transactions(rows: &[RawTransaction], config: &CleanConfig) -> Vec<Transaction> {
    let mut out: Vec<Transaction> = rows
        .iter()
        .filter_map(|row| {
            let item = row.item.trim().to_lowercase();
            if item.is_empty() || config.drop_items.iter().any(|d| *d == item) {
                return None;
            }
            let date = parse_date(&row.transaction_date)?;
            let quantity = parse_number(&row.quantity).unwrap_or(0.0);
            if quantity < 0.0 {
                return None;
            }
            Some(Transaction {
                txn_id: row.txn_id.clone(),
                item,
                date,
                quantity,
                price_per_unit: parse_number(&row.price_per_unit),
                total_spent: parse_number(&row.total_spent),
            })
        })
        .collect();

    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.item.cmp(&b.item)));
    tracing::debug!(kept = out.len(), dropped = rows.len() - out.len(), "transactions cleaned");
    out
}

// ─── Aggregation ─────────────────────────────────────────────────────

/// One (date, item) row of the zero-filled daily table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub item: String,
    pub demand_qty: f64,
    pub revenue: f64,
    pub txn_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ItemDays {
    demand: Vec<f64>,
    revenue: Vec<f64>,
    txn_count: Vec<usize>,
}

/// Zero-filled daily demand for every item over one shared calendar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyDemand {
    start: Option<NaiveDate>,
    n_days: usize,
    items: BTreeMap<String, ItemDays>,
}

/// Aggregate transactions into a zero-filled daily table.
pub fn aggregate_daily(txns: &[Transaction]) -> DailyDemand {
    let (Some(start), Some(end)) = (
        txns.iter().map(|t| t.date).min(),
        txns.iter().map(|t| t.date).max(),
    ) else {
        return DailyDemand::default();
    };
    let n_days = (end - start).num_days() as usize + 1;

    let mut ids: BTreeMap<(&str, usize), BTreeSet<&str>> = BTreeMap::new();
    let mut items: BTreeMap<String, ItemDays> = BTreeMap::new();
    for t in txns {
        let day = (t.date - start).num_days() as usize;
        let entry = items.entry(t.item.clone()).or_insert_with(|| ItemDays {
            demand: vec![0.0; n_days],
            revenue: vec![0.0; n_days],
            txn_count: vec![0; n_days],
        });
        entry.demand[day] += t.quantity;
        entry.revenue[day] += t.total_spent.unwrap_or(0.0);
        ids.entry((t.item.as_str(), day))
            .or_default()
            .insert(t.txn_id.as_str());
    }
    for ((item, day), set) in ids {
        if let Some(entry) = items.get_mut(item) {
            entry.txn_count[day] = set.len();
        }
    }

    tracing::info!(days = n_days, items = items.len(), "daily demand aggregated");
    DailyDemand {
        start: Some(start),
        n_days,
        items,
    }
}

impl DailyDemand {
    pub fn n_days(&self) -> usize {
        self.n_days
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start.map(|s| s + Duration::days(self.n_days as i64 - 1))
    }

    /// Every row, ordered by item then date.
    pub fn rows(&self) -> Vec<DailyRow> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        self.items
            .iter()
            .flat_map(|(item, days)| {
                (0..self.n_days).map(move |i| DailyRow {
                    date: start + Duration::days(i as i64),
                    item: item.clone(),
                    demand_qty: days.demand[i],
                    revenue: days.revenue[i],
                    txn_count: days.txn_count[i],
                })
            })
            .collect()
    }
}

impl SeriesProvider for DailyDemand {
    fn items(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Summed daily quantities can still overflow to infinity; that
    /// surfaces here as `SeriesError::InvalidQuantity`.
    fn series(&self, item: &str) -> Result<DemandSeries, SeriesError> {
        match (self.items.get(item), self.start) {
            (Some(days), Some(start)) => DemandSeries::new(item, start, days.demand.clone()),
            _ => Err(SeriesError::UnknownItem {
                item: item.to_string(),
            }),
        }
    }
}

// ─── One-shot loading ────────────────────────────────────────────────

/// Daily demand plus the provenance counts reported in run metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDemand {
    pub daily: DailyDemand,
    /// Transactions that survived cleaning.
    pub n_txn_rows: usize,
}

/// Read, clean, and aggregate a transactions CSV.
pub fn load_daily_demand(path: &Path, config: &CleanConfig) -> Result<LoadedDemand, LoadError> {
    let raw = read_transactions(path)?;
    let txns = clean_transactions(&raw, config);
    Ok(LoadedDemand {
        daily: aggregate_daily(&txns),
        n_txn_rows: txns.len(),
    })
}
