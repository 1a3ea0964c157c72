use crate::aggregator::DEFAULT_TOP_COUNTRIES;
use crate::dataset::DatasetPaths;
use crate::report::DEFAULT_REPORT_COUNTRIES;
use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "retail-analytics")]
#[command(about = "Descriptive analytics over online-retail transaction, RFM and monthly datasets")]
pub struct Config {
    /// Directory holding the input CSV files
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Transaction log file name, relative to --data-dir
    #[arg(long, default_value = "online_retail_clean.csv")]
    pub transactions: PathBuf,

    /// RFM scores file name, relative to --data-dir
    #[arg(long, default_value = "rfm_analysis.csv")]
    pub rfm: PathBuf,

    /// Monthly revenue file name, relative to --data-dir
    #[arg(long, default_value = "monthly_revenue.csv")]
    pub monthly: PathBuf,

    /// Where chart data series are written
    #[arg(short, long, default_value = "visualizations")]
    pub output_dir: PathBuf,

    /// Summary report path
    #[arg(short, long, default_value = "ANALYSIS_REPORT.txt")]
    pub report: PathBuf,

    /// Countries kept in the country rollup
    #[arg(
        long,
        default_value_t = DEFAULT_TOP_COUNTRIES,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub top_countries: usize,

    /// Countries listed in the text report
    #[arg(long, default_value_t = DEFAULT_REPORT_COUNTRIES)]
    pub report_countries: usize,

    /// Skip writing chart data series
    #[arg(long)]
    pub no_charts: bool,
}

impl Config {
    /// Input locations; absolute file names ignore --data-dir
    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            transactions: self.data_dir.join(&self.transactions),
            rfm: self.data_dir.join(&self.rfm),
            monthly: self.data_dir.join(&self.monthly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["retail-analytics"]).unwrap();

        assert_eq!(config.top_countries, 10);
        assert_eq!(config.report_countries, 5);
        assert!(!config.no_charts);
        assert_eq!(config.report, Path::new("ANALYSIS_REPORT.txt"));

        let paths = config.dataset_paths();
        assert_eq!(paths.transactions, Path::new("data/online_retail_clean.csv"));
        assert_eq!(paths.monthly, Path::new("data/monthly_revenue.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "retail-analytics",
            "--data-dir",
            "/srv/retail",
            "--rfm",
            "scores.csv",
            "--top-countries",
            "3",
            "--no-charts",
        ])
        .unwrap();

        assert_eq!(config.top_countries, 3);
        assert!(config.no_charts);
        assert_eq!(config.dataset_paths().rfm, Path::new("/srv/retail/scores.csv"));
    }

    #[test]
    fn test_zero_top_countries_rejected() {
        assert!(Config::try_parse_from(["retail-analytics", "--top-countries", "0"]).is_err());
    }
}
