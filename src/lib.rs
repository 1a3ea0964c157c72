// Retail Analytics - Core Library
// Loads the retail datasets, computes the rollups, writes the report

pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod report;
pub mod schema;
pub mod segments;

// Re-export commonly used types
pub use aggregator::{
    CountryRevenue, DailyRevenue, TotalMetrics, WeeklyRevenue,
    total_metrics, daily_revenue, weekly_revenue, country_revenue,
    weekday_name, DEFAULT_TOP_COUNTRIES, WEEKDAYS,
};
pub use analysis::{Analysis, AnalysisEngine};
pub use config::Config;
pub use dataset::{
    Datasets, DatasetPaths, Transaction, RfmRecord, MonthlyRecord,
    load_transactions, parse_transactions, parse_timestamp,
};
pub use error::{AnalyticsError, Result};
pub use report::{export_charts, render_report, write_report, format_money};
pub use schema::{DatasetKind, SchemaWarning};
pub use segments::{SegmentCount, RfmPoint, MonthlyPoint};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
