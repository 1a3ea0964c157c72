// 📐 Shape Layer - Column Schemas
// Which columns each dataset must (or should) carry

use crate::error::{AnalyticsError, Result};
use serde::Serialize;

// ============================================================================
// DATASET KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatasetKind {
    /// Raw transaction log - every column is required
    Transactions,
    /// Customer RFM scores - optional report sections
    Rfm,
    /// Monthly revenue roll-up - optional report section
    Monthly,
}

impl DatasetKind {
    pub fn name(&self) -> &str {
        match self {
            DatasetKind::Transactions => "transactions",
            DatasetKind::Rfm => "rfm",
            DatasetKind::Monthly => "monthly",
        }
    }
}

/// Columns the transaction log must have, or the run aborts
pub const TRANSACTION_COLUMNS: [&str; 7] = [
    "invoiceno",
    "stockcode",
    "quantity",
    "unitprice",
    "invoicedate",
    "customerid",
    "country",
];

/// Needed by the segment breakdown
pub const RFM_SEGMENT_COLUMNS: [&str; 1] = ["customer_segment"];

/// Needed by the frequency/monetary scatter
pub const RFM_SCATTER_COLUMNS: [&str; 5] = [
    "frequency",
    "monetary",
    "customer_segment",
    "recency",
    "customerid",
];

pub const MONTHLY_COLUMNS: [&str; 2] = ["month", "revenue"];

// ============================================================================
// SCHEMA WARNING
// ============================================================================

/// A report section that could not run because its columns are absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaWarning {
    pub dataset: DatasetKind,
    pub section: String,
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} skipped: missing columns {} (available: {})",
            self.dataset.name(),
            self.section,
            self.missing.join(", "),
            self.available.join(", ")
        )
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// Lowercase and trim header names so lookups are case-insensitive
pub fn normalize_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect()
}

/// Columns from `expected` that are not in `available`, in `expected` order
pub fn missing_columns(available: &[String], expected: &[&str]) -> Vec<String> {
    expected
        .iter()
        .filter(|col| !available.iter().any(|a| a == *col))
        .map(|col| col.to_string())
        .collect()
}

/// Fatal check used for the transaction log
pub fn require_columns(kind: DatasetKind, available: &[String], expected: &[&str]) -> Result<()> {
    let missing = missing_columns(available, expected);
    if missing.is_empty() {
        return Ok(());
    }

    Err(AnalyticsError::MissingColumns {
        dataset: kind.name().to_string(),
        missing,
        available: available.to_vec(),
    })
}

/// Non-fatal check used for optional sections
pub fn check_section(
    kind: DatasetKind,
    section: &str,
    available: &[String],
    expected: &[&str],
) -> std::result::Result<(), SchemaWarning> {
    let missing = missing_columns(available, expected);
    if missing.is_empty() {
        return Ok(());
    }

    Err(SchemaWarning {
        dataset: kind,
        section: section.to_string(),
        missing,
        available: available.to_vec(),
    })
}
