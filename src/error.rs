use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {dataset}: {source}")]
    Csv {
        dataset: String,
        #[source]
        source: csv::Error,
    },

    #[error("{dataset} is missing required columns {missing:?} (available: {available:?})")]
    MissingColumns {
        dataset: String,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("{dataset} row {row}: invalid {field} value '{value}'")]
    InvalidValue {
        dataset: String,
        row: usize,
        field: String,
        value: String,
    },

    #[error("average order value is undefined: no orders")]
    NoOrders,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// Load failures abort the run; everything else is recovered by the caller
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Io { .. }
                | AnalyticsError::Csv { .. }
                | AnalyticsError::MissingColumns { .. }
                | AnalyticsError::InvalidValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
