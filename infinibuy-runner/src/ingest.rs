//! Position import from a ledger CSV.
//!
//! Traders keep a daily ledger (one row per trading day) exported from a
//! spreadsheet. The importer reads the **last dated row** and extracts the
//! average cost and holdings from it. The policy is:
//! 1. Headers are matched against the configured aliases (case-insensitive).
//! 2. If a required column is missing → defaults `(0.0, 0)` with a
//!    `FieldsNotFound` diagnostic.
//! 3. If the file has a date column, the last row (in file order) whose date
//!    parses is used; otherwise the last non-empty row.
//! 4. Unreadable files and malformed numbers are typed [`IngestError`]s;
//!    [`import_or_default`] degrades those to defaults as well.
//!
//! Nothing here ever reaches into the engine: the output is two scalars and a
//! status the caller can show.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ImportColumns;

/// Accepted date formats, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

/// Errors from reading a ledger file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// How the imported values were obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    /// Values read from `row` (1-based, header excluded).
    Found {
        row: usize,
        date: Option<NaiveDate>,
    },
    /// Expected columns are absent; values are defaults.
    FieldsNotFound { missing: Vec<String> },
    /// Header present but no usable row.
    NoRows,
    /// The file could not be read; values are defaults.
    Unreadable { reason: String },
}

/// Imported position with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionImport {
    pub average_cost: f64,
    pub holdings: u64,
    pub status: ImportStatus,
}

impl PositionImport {
    fn defaults(status: ImportStatus) -> Self {
        Self {
            average_cost: 0.0,
            holdings: 0,
            status,
        }
    }

    /// True when values came from the file rather than defaults.
    pub fn is_found(&self) -> bool {
        matches!(self.status, ImportStatus::Found { .. })
    }

    /// Human-readable warning for anything other than a clean import.
    pub fn warning(&self) -> Option<String> {
        match &self.status {
            ImportStatus::Found { .. } => None,
            ImportStatus::FieldsNotFound { missing } => {
                Some(format!("fields not found: {}", missing.join(", ")))
            }
            ImportStatus::NoRows => Some("no dated rows found".to_string()),
            ImportStatus::Unreadable { reason } => Some(format!("could not read ledger: {reason}")),
        }
    }
}

/// Import the position from a CSV file.
pub fn import_position(path: &Path, columns: &ImportColumns) -> Result<PositionImport, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let import = import_position_from_reader(file, columns)?;
    info!(path = %path.display(), status = ?import.status, "ledger imported");
    Ok(import)
}

/// Import from any reader, e.g. an uploaded file held in memory.
pub fn import_position_from_reader<R: Read>(
    reader: R,
    columns: &ImportColumns,
) -> Result<PositionImport, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |aliases: &[String]| {
        headers.iter().position(|h| {
            aliases
                .iter()
                .any(|alias| h.trim().eq_ignore_ascii_case(alias.trim()))
        })
    };

    let date_idx = find(&columns.date);
    let avg_idx = find(&columns.average_cost);
    let qty_idx = find(&columns.holdings);

    let (avg_idx, qty_idx) = match (avg_idx, qty_idx) {
        (Some(a), Some(q)) => (a, q),
        (a, q) => {
            let mut missing = Vec::new();
            if a.is_none() {
                missing.push(columns.average_cost.first().cloned().unwrap_or_default());
            }
            if q.is_none() {
                missing.push(columns.holdings.first().cloned().unwrap_or_default());
            }
            return Ok(PositionImport::defaults(ImportStatus::FieldsNotFound { missing }));
        }
    };

    // Last dated row wins; without a date column, the last non-empty row.
    let mut chosen: Option<(usize, Option<NaiveDate>, csv::StringRecord)> = None;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        match date_idx {
            Some(di) => {
                if let Some(date) = record.get(di).and_then(parse_date) {
                    chosen = Some((row, Some(date), record));
                }
            }
            None => {
                if record.iter().any(|field| !field.is_empty()) {
                    chosen = Some((row, None, record));
                }
            }
        }
    }

    let Some((row, date, record)) = chosen else {
        return Ok(PositionImport::defaults(ImportStatus::NoRows));
    };

    let average_cost = parse_cell(&record, avg_idx, row, &headers)?;
    let holdings = parse_cell(&record, qty_idx, row, &headers)?;
    // Whole shares only; "3.7" is a ledger error, not 3 shares.
    if holdings.fract() != 0.0 || holdings > u64::MAX as f64 {
        return Err(IngestError::InvalidNumber {
            row,
            column: headers.get(qty_idx).unwrap_or("").to_string(),
            value: record.get(qty_idx).unwrap_or("").to_string(),
        });
    }

    Ok(PositionImport {
        average_cost,
        holdings: holdings as u64,
        status: ImportStatus::Found { row, date },
    })
}

/// Import, degrading every failure to defaults plus a diagnostic.
pub fn import_or_default(path: &Path, columns: &ImportColumns) -> PositionImport {
    match import_position(path, columns) {
        Ok(import) => {
            if let Some(warning) = import.warning() {
                warn!(path = %path.display(), "{warning}");
            }
            import
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ledger import failed, using defaults");
            PositionImport::defaults(ImportStatus::Unreadable {
                reason: e.to_string(),
            })
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // "2024-03-01 00:00:00" → "2024-03-01"
    let token = raw.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Parse a money or share cell: `$1,234.50` → 1234.5, empty → 0.
fn parse_cell(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    headers: &csv::StringRecord,
) -> Result<f64, IngestError> {
    let raw = record.get(idx).unwrap_or("");
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(IngestError::InvalidNumber {
            row,
            column: headers.get(idx).unwrap_or("").to_string(),
            value: raw.to_string(),
        }),
    }
}
