//! CSV Loader
//!
//! Reads the engineered feature table. Older exports lack the three business
//! features, so they are derived from the raw sales columns when missing.

use crate::table::{ObservationRecord, SalesTable, StoreId};
use crate::StorageError;
use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use feature_engine::{FeatureRecord, FEATURE_DIMENSION, FEATURE_NAMES};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const STORE_COLUMN: &str = "Store Number";
const TARGET_COLUMN: &str = "Total_Sales";
const YEAR_COLUMN: &str = "Year";
const MONTH_COLUMN: &str = "Month";
const DATE_COLUMN: &str = "Date";

const RETAIL_COLUMN: &str = "State Bottle Retail";
const COST_COLUMN: &str = "State Bottle Cost";
const SALE_DOLLARS_COLUMN: &str = "Sale (Dollars)";
const BOTTLES_COLUMN: &str = "Bottles Sold";

const PROMOTION_MONTHS: [u32; 2] = [11, 12];

/// Where each feature value comes from
#[derive(Debug, Clone, Copy)]
enum FeatureSource {
    Column(usize),
    ProfitMargin { retail: usize, cost: usize },
    PromotionMonth,
    AveragePrice { sales: usize, bottles: usize },
    Missing,
}

/// Where the calendar position comes from
#[derive(Debug, Clone, Copy)]
enum CalendarSource {
    Columns { year: usize, month: usize },
    Date { date: usize, year: Option<usize> },
}

struct ColumnLayout {
    store: usize,
    target: usize,
    calendar: CalendarSource,
    features: [FeatureSource; FEATURE_DIMENSION],
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord) -> Result<Self, StorageError> {
        let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let required = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| StorageError::MissingColumn(name.to_string()))
        };

        let store = required(STORE_COLUMN)?;
        let target = required(TARGET_COLUMN)?;

        let calendar = match (index.get(YEAR_COLUMN), index.get(MONTH_COLUMN)) {
            (Some(&year), Some(&month)) => CalendarSource::Columns { year, month },
            (year, _) => CalendarSource::Date {
                date: required(DATE_COLUMN)?,
                year: year.copied(),
            },
        };

        let mut features = [FeatureSource::Missing; FEATURE_DIMENSION];
        for (slot, name) in features.iter_mut().zip(FEATURE_NAMES) {
            *slot = match index.get(name) {
                Some(&col) => FeatureSource::Column(col),
                None => Self::backfill(name, &index)?,
            };
        }

        Ok(Self {
            store,
            target,
            calendar,
            features,
        })
    }

    fn backfill(name: &str, index: &HashMap<&str, usize>) -> Result<FeatureSource, StorageError> {
        let pair = |a: &str, b: &str| index.get(a).copied().zip(index.get(b).copied());
        let source = match name {
            "Profit_Margin" => match pair(RETAIL_COLUMN, COST_COLUMN) {
                Some((retail, cost)) => FeatureSource::ProfitMargin { retail, cost },
                None => FeatureSource::Missing,
            },
            "Is_Promotion_Month" => FeatureSource::PromotionMonth,
            "Average_Price" => match pair(SALE_DOLLARS_COLUMN, BOTTLES_COLUMN) {
                Some((sales, bottles)) => FeatureSource::AveragePrice { sales, bottles },
                None => FeatureSource::Missing,
            },
            other => return Err(StorageError::MissingColumn(other.to_string())),
        };
        debug!("Backfilling {} from {:?}", name, source);
        Ok(source)
    }
}

/// Parse a numeric cell; blanks read as NaN
fn number(record: &StringRecord, col: usize) -> Option<f64> {
    let raw = record.get(col)?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    raw.replace(['$', ','], "").parse().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%m/%d/%Y"))
        .ok()
}

fn invalid(record: &StringRecord, col: usize, column: &str, row: usize) -> StorageError {
    StorageError::InvalidValue {
        column: column.to_string(),
        row,
        value: record.get(col).unwrap_or_default().to_string(),
    }
}

fn parse_row(
    layout: &ColumnLayout,
    record: &StringRecord,
    row: usize,
) -> Result<Option<ObservationRecord>, StorageError> {
    let store = match number(record, layout.store) {
        Some(v) if v.is_finite() => v as StoreId,
        Some(_) => return Ok(None),
        None => return Err(invalid(record, layout.store, STORE_COLUMN, row)),
    };

    let (year, month) = match layout.calendar {
        CalendarSource::Columns { year, month } => {
            let y = number(record, year)
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(record, year, YEAR_COLUMN, row))?;
            let m = number(record, month)
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(record, month, MONTH_COLUMN, row))?;
            (y as i32, m as u32)
        }
        CalendarSource::Date { date, year } => {
            let parsed = record
                .get(date)
                .and_then(parse_date)
                .ok_or_else(|| invalid(record, date, DATE_COLUMN, row))?;
            let y = match year.and_then(|col| number(record, col)) {
                Some(v) if v.is_finite() => v as i32,
                _ => parsed.year(),
            };
            (y, parsed.month())
        }
    };

    let total_sales =
        number(record, layout.target).ok_or_else(|| invalid(record, layout.target, TARGET_COLUMN, row))?;

    let mut values = [f64::NAN; FEATURE_DIMENSION];
    for (i, source) in layout.features.iter().enumerate() {
        values[i] = match *source {
            FeatureSource::Column(col) => {
                number(record, col).ok_or_else(|| invalid(record, col, FEATURE_NAMES[i], row))?
            }
            FeatureSource::ProfitMargin { retail, cost } => {
                match (number(record, retail), number(record, cost)) {
                    (Some(r), Some(c)) => (r - c) / r,
                    _ => f64::NAN,
                }
            }
            FeatureSource::PromotionMonth => {
                if PROMOTION_MONTHS.contains(&month) {
                    1.0
                } else {
                    0.0
                }
            }
            FeatureSource::AveragePrice { sales, bottles } => {
                match (number(record, sales), number(record, bottles)) {
                    (Some(s), Some(b)) if b != 0.0 && (s / b).is_finite() => s / b,
                    _ => 0.0,
                }
            }
            FeatureSource::Missing => f64::NAN,
        };
    }

    let features = FeatureRecord::from_values(year, month, &values).map_err(|_| {
        let col = match layout.calendar {
            CalendarSource::Columns { month, .. } => month,
            CalendarSource::Date { date, .. } => date,
        };
        invalid(record, col, MONTH_COLUMN, row)
    })?;

    Ok(Some(ObservationRecord {
        store,
        total_sales,
        features,
    }))
}

/// Read a sales table from any CSV source
pub fn read_csv<R: Read>(reader: R) -> Result<SalesTable, StorageError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        match parse_row(&layout, &record, i + 1)? {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} rows without a store number", skipped);
    }

    Ok(SalesTable::new(rows))
}

/// Load a sales table from a CSV file on disk
pub fn load_csv(path: impl AsRef<Path>) -> Result<SalesTable, StorageError> {
    let path = path.as_ref();
    info!("Loading sales table from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_csv(std::io::BufReader::new(file))
}
