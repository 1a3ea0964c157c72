use crate::error::{AnalyticsError, Result};
use crate::schema::{self, DatasetKind, TRANSACTION_COLUMNS};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Timestamp layouts seen in retail exports, tried in order
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// One line item of the transaction log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub invoice_no: String,
    pub stock_code: String,
    /// None when the source cell is empty
    pub customer_id: Option<String>,
    pub country: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub invoice_date: NaiveDateTime,
    pub total_price: f64,
}

impl Transaction {
    /// Build a line item with total_price = quantity × unit_price
    pub fn new(
        invoice_no: &str,
        stock_code: &str,
        customer_id: Option<&str>,
        country: &str,
        quantity: i64,
        unit_price: f64,
        invoice_date: NaiveDateTime,
    ) -> Self {
        Transaction {
            invoice_no: invoice_no.to_string(),
            stock_code: stock_code.to_string(),
            customer_id: customer_id.map(|c| c.to_string()),
            country: country.to_string(),
            quantity,
            unit_price,
            invoice_date,
            total_price: quantity as f64 * unit_price,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.invoice_date.date()
    }

    pub fn weekday(&self) -> Weekday {
        self.invoice_date.weekday()
    }
}

/// Raw CSV row; numbers stay as text so bad cells can be reported by row
#[derive(Debug, Deserialize)]
struct TransactionRow {
    invoiceno: String,
    stockcode: String,
    quantity: String,
    unitprice: String,
    invoicedate: String,
    #[serde(default)]
    customerid: Option<String>,
    country: String,
    #[serde(default)]
    total_price: Option<String>,
}

/// Customer RFM score row. Every field is optional; section checks decide what runs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RfmRecord {
    #[serde(default, rename = "customerid")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub recency: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub monetary: Option<f64>,
    #[serde(default)]
    pub customer_segment: Option<String>,
}

/// Monthly revenue roll-up row
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonthlyRecord {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub revenue: Option<f64>,
}

/// Where the three input files live
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub transactions: PathBuf,
    pub rfm: PathBuf,
    pub monthly: PathBuf,
}

/// Immutable snapshot of every input, shared by all report sections
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub transactions: Vec<Transaction>,
    pub rfm: Vec<RfmRecord>,
    pub monthly: Vec<MonthlyRecord>,
    pub transaction_columns: Vec<String>,
    pub rfm_columns: Vec<String>,
    pub monthly_columns: Vec<String>,
}

impl Datasets {
    /// Load all three files. Any failure here is fatal for the run.
    pub fn load(paths: &DatasetPaths) -> Result<Datasets> {
        let (transaction_columns, transactions) = load_transactions(&paths.transactions)?;

        let rfm_table = RawTable::read(DatasetKind::Rfm, &paths.rfm)?;
        let rfm: Vec<RfmRecord> = rfm_table.deserialize_rows(DatasetKind::Rfm)?;

        let monthly_table = RawTable::read(DatasetKind::Monthly, &paths.monthly)?;
        let monthly: Vec<MonthlyRecord> = monthly_table.deserialize_rows(DatasetKind::Monthly)?;

        info!(
            transactions = transactions.len(),
            rfm_customers = rfm.len(),
            months = monthly.len(),
            "datasets loaded"
        );

        Ok(Datasets {
            transactions,
            rfm,
            monthly,
            transaction_columns,
            rfm_columns: rfm_table.headers,
            monthly_columns: monthly_table.headers,
        })
    }
}

// ============================================================================
// CSV PLUMBING
// ============================================================================

/// A CSV file with normalised headers, rows not yet typed
struct RawTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RawTable {
    fn read(kind: DatasetKind, path: &Path) -> Result<RawTable> {
        let text = read_text(path)?;
        Self::parse(kind, &text)
    }

    fn parse(kind: DatasetKind, text: &str) -> Result<RawTable> {
        let csv_err = |source: csv::Error| AnalyticsError::Csv {
            dataset: kind.name().to_string(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Fields)
            .from_reader(text.as_bytes());

        let headers = schema::normalize_headers(rdr.headers().map_err(csv_err)?.iter());

        let rows = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        debug!(dataset = kind.name(), rows = rows.len(), columns = ?headers, "csv parsed");

        Ok(RawTable { headers, rows })
    }

    fn deserialize_rows<T: DeserializeOwned>(&self, kind: DatasetKind) -> Result<Vec<T>> {
        let header_record = StringRecord::from(self.headers.clone());

        self.rows
            .iter()
            .map(|row| {
                row.deserialize(Some(&header_record))
                    .map_err(|source| AnalyticsError::Csv {
                        dataset: kind.name().to_string(),
                        source,
                    })
            })
            .collect()
    }
}

/// Read a file as UTF-8, falling back to Latin-1 for legacy exports
fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| AnalyticsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            debug!(path = %path.display(), "not valid UTF-8, decoding as Latin-1");
            Ok(err.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

/// Load and type the transaction log from a file
pub fn load_transactions(path: &Path) -> Result<(Vec<String>, Vec<Transaction>)> {
    let text = read_text(path)?;
    parse_transactions(&text)
}

/// Type the transaction log from CSV text. Missing columns and bad cells are errors.
pub fn parse_transactions(text: &str) -> Result<(Vec<String>, Vec<Transaction>)> {
    let kind = DatasetKind::Transactions;
    let table = RawTable::parse(kind, text)?;
    schema::require_columns(kind, &table.headers, &TRANSACTION_COLUMNS)?;

    let rows: Vec<TransactionRow> = table.deserialize_rows(kind)?;
    let mut transactions = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        // 1-based, header is line 1
        let line = idx + 2;
        let invalid = |field: &str, value: &str| AnalyticsError::InvalidValue {
            dataset: kind.name().to_string(),
            row: line,
            field: field.to_string(),
            value: value.to_string(),
        };

        let quantity =
            parse_quantity(&row.quantity).ok_or_else(|| invalid("quantity", &row.quantity))?;
        let unit_price =
            parse_amount(&row.unitprice).ok_or_else(|| invalid("unitprice", &row.unitprice))?;
        let invoice_date = parse_timestamp(&row.invoicedate)
            .ok_or_else(|| invalid("invoicedate", &row.invoicedate))?;

        let customer_id = row
            .customerid
            .as_deref()
            .map(normalize_customer_id)
            .filter(|c| !c.is_empty());

        let mut tx = Transaction::new(
            &row.invoiceno,
            &row.stockcode,
            customer_id.as_deref(),
            &row.country,
            quantity,
            unit_price,
            invoice_date,
        );

        // A supplied total_price wins over the derived one
        if let Some(total) = row.total_price.as_deref() {
            tx.total_price = parse_amount(total).ok_or_else(|| invalid("total_price", total))?;
        }

        transactions.push(tx);
    }

    Ok((table.headers, transactions))
}

/// Finite decimal; `f64::from_str` alone would let "NaN" and "inf" through
fn parse_amount(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer quantity; tolerates "6.0" from float-typed exports
fn parse_quantity(value: &str) -> Option<i64> {
    if let Ok(q) = value.parse::<i64>() {
        return Some(q);
    }

    let q = parse_amount(value)?;
    if q.fract() == 0.0 {
        Some(q as i64)
    } else {
        None
    }
}

/// Customer ids exported through a float column come out as "17850.0"
pub fn normalize_customer_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(stem) if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) => {
            stem.to_string()
        }
        _ => trimmed.to_string(),
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
