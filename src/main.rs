use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use retail_analytics::{
    export_charts, render_report, write_report, AnalysisEngine, Config, Datasets,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("retail_analytics=info")),
        )
        .init();

    let config = Config::parse();

    if let Err(err) = run(&config) {
        error!("{:#}", err);
        eprintln!("❌ {:#}", err);
        eprintln!("   Check that the CSV files are in '{}'", config.data_dir.display());
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    info!(version = retail_analytics::VERSION, "retail analytics starting");

    // 1. Load
    let data = Datasets::load(&config.dataset_paths()).context("Failed to load datasets")?;

    // 2. Aggregate
    let analysis = AnalysisEngine::with_top_countries(config.top_countries).run(&data);

    // 3. Chart series
    let exported = if config.no_charts {
        info!("chart export disabled");
        Vec::new()
    } else {
        export_charts(&analysis, &config.output_dir).context("Failed to export chart series")?
    };

    // 4. Report
    let report = render_report(&analysis, config.report_countries, &exported);
    println!("{}", report);
    write_report(&config.report, &report).context("Failed to write report")?;

    info!(
        charts = exported.len(),
        skipped = analysis.warnings.len(),
        "analysis complete"
    );

    Ok(())
}
