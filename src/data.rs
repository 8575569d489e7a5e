//! Record store: the customer dataset loaded from CSV into memory.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

/// One row of the customer table. Nullable columns deserialize empty CSV
/// fields to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: i64,
    pub age: Option<i64>,
    pub income: Option<f64>,
    pub account_type: Option<String>,
    pub balance: Option<f64>,
    pub tenure_years: Option<f64>,
    pub churned: u8,
    pub branch: Option<String>,
}

/// Immutable, ordered collection of customer records.
///
/// Populated once at load time and read-only for the rest of the session;
/// every view is a pure function of `records`.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<CustomerRecord>,
    /// One `InvalidRecord` per row the lenient loader dropped (malformed or
    /// duplicate id).
    skipped: Vec<crate::Error>,
}

impl RecordStore {
    /// Load the dataset from a CSV file.
    ///
    /// The loader is lenient: rows that fail to deserialize, or that repeat
    /// an already-seen `customer_id`, are skipped rather than aborting the
    /// load; each skip is recorded as an `InvalidRecord` error carrying the
    /// offending line. A missing file is fatal.
    ///
    /// # Arguments
    /// * `path` - Path to the CSV file with a header row
    ///
    /// # Returns
    /// * `RecordStore` holding every valid record in file order
    pub fn load(path: &str) -> crate::Result<Self> {
        if !Path::new(path).exists() {
            return Err(crate::Error::MissingDataset {
                path: path.to_string(),
            });
        }

        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers = rdr.headers()?.clone();

        let mut records = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut skipped = Vec::new();

        for result in rdr.records() {
            let invalid = match result {
                Ok(raw) => {
                    let line = raw.position().map(|p| p.line()).unwrap_or(0);
                    match raw.deserialize::<CustomerRecord>(Some(&headers)) {
                        Ok(record) => {
                            if seen_ids.insert(record.customer_id) {
                                records.push(record);
                                continue;
                            }
                            crate::Error::InvalidRecord {
                                line,
                                reason: format!("duplicate customer_id {}", record.customer_id),
                            }
                        }
                        Err(err) => crate::Error::InvalidRecord {
                            line,
                            reason: err.to_string(),
                        },
                    }
                }
                Err(err) => {
                    let line = err.position().map(|p| p.line()).unwrap_or(0);
                    crate::Error::InvalidRecord {
                        line,
                        reason: err.to_string(),
                    }
                }
            };
            tracing::warn!(error = %invalid, "skipping record");
            skipped.push(invalid);
        }

        Ok(Self { records, skipped })
    }

    /// Build a store directly from records, deduplicating on `customer_id`.
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for record in records {
            if seen_ids.insert(record.customer_id) {
                kept.push(record);
            } else {
                skipped.push(crate::Error::InvalidRecord {
                    line: 0,
                    reason: format!("duplicate customer_id {}", record.customer_id),
                });
            }
        }
        Self {
            records: kept,
            skipped,
        }
    }

    /// Full ordered record sequence.
    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    /// Number of rows the loader dropped.
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }

    /// The `InvalidRecord` error recorded for each dropped row.
    pub fn skip_errors(&self) -> &[crate::Error] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
