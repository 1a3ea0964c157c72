// 📊 Analysis Engine - runs every report section over one dataset snapshot
//
// Transaction rollups always run. RFM and monthly sections degrade:
// when their columns are absent the section is skipped and a
// SchemaWarning is recorded instead.

use crate::aggregator::{
    self, CountryRevenue, DailyRevenue, TotalMetrics, WeeklyRevenue, DEFAULT_TOP_COUNTRIES,
};
use crate::dataset::Datasets;
use crate::schema::{
    self, DatasetKind, SchemaWarning, MONTHLY_COLUMNS, RFM_SCATTER_COLUMNS, RFM_SEGMENT_COLUMNS,
};
use crate::segments::{self, MonthlyPoint, RfmPoint, SegmentCount};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub totals: TotalMetrics,
    pub daily: Vec<DailyRevenue>,
    pub weekly: WeeklyRevenue,
    pub countries: Vec<CountryRevenue>,
    pub segments: Option<Vec<SegmentCount>>,
    pub rfm_scatter: Option<Vec<RfmPoint>>,
    pub monthly: Option<Vec<MonthlyPoint>>,
    pub warnings: Vec<SchemaWarning>,
}

impl Analysis {
    pub fn skipped_sections(&self) -> Vec<&str> {
        self.warnings.iter().map(|w| w.section.as_str()).collect()
    }
}

pub struct AnalysisEngine {
    /// How many countries the country rollup keeps
    pub top_countries: usize,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        AnalysisEngine {
            top_countries: DEFAULT_TOP_COUNTRIES,
        }
    }

    pub fn with_top_countries(top_countries: usize) -> Self {
        AnalysisEngine { top_countries }
    }

    pub fn run(&self, data: &Datasets) -> Analysis {
        let mut warnings = Vec::new();

        let totals = aggregator::total_metrics(&data.transactions);
        info!(
            revenue = totals.revenue,
            orders = totals.order_count,
            customers = totals.customer_count,
            products = totals.product_count,
            "total metrics"
        );

        let daily = aggregator::daily_revenue(&data.transactions);
        info!(days = daily.len(), "daily revenue computed");

        let weekly = aggregator::weekly_revenue(&data.transactions);
        if let Some((day, revenue)) = weekly.best_day() {
            info!(day = aggregator::weekday_name(day), revenue, "best weekday");
        }

        let countries = aggregator::country_revenue(&data.transactions, self.top_countries);
        info!(countries = countries.len(), "country revenue computed");

        let segment_breakdown = section(
            &mut warnings,
            schema::check_section(
                DatasetKind::Rfm,
                "rfm segments",
                &data.rfm_columns,
                &RFM_SEGMENT_COLUMNS,
            ),
            || segments::segment_counts(&data.rfm),
        );

        let rfm_scatter = section(
            &mut warnings,
            schema::check_section(
                DatasetKind::Rfm,
                "rfm scatter",
                &data.rfm_columns,
                &RFM_SCATTER_COLUMNS,
            ),
            || segments::rfm_scatter(&data.rfm),
        );

        let monthly = section(
            &mut warnings,
            schema::check_section(
                DatasetKind::Monthly,
                "monthly trend",
                &data.monthly_columns,
                &MONTHLY_COLUMNS,
            ),
            || segments::monthly_trend(&data.monthly),
        );

        Analysis {
            totals,
            daily,
            weekly,
            countries,
            segments: segment_breakdown,
            rfm_scatter,
            monthly,
            warnings,
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `build` if the column check passed, otherwise log and keep the warning
fn section<T>(
    warnings: &mut Vec<SchemaWarning>,
    check: Result<(), SchemaWarning>,
    build: impl FnOnce() -> T,
) -> Option<T> {
    match check {
        Ok(()) => Some(build()),
        Err(warning) => {
            warn!("{}", warning);
            warnings.push(warning);
            None
        }
    }
}
