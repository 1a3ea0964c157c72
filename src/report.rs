// 📝 Report output - chart data series (JSON) and the plain-text summary

use crate::aggregator::weekday_name;
use crate::analysis::Analysis;
use crate::error::{AnalyticsError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Countries listed in the text report
pub const DEFAULT_REPORT_COUNTRIES: usize = 5;

// ============================================================================
// CHART SERIES
// ============================================================================

/// Everything a renderer needs to draw one chart
#[derive(Debug, Serialize)]
struct ChartSeries<'a, T: Serialize> {
    chart: &'a str,
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    points: &'a [T],
}

#[derive(Debug, Serialize)]
struct WeekdayPoint {
    day: &'static str,
    revenue: f64,
    /// The bar a renderer should highlight
    best: bool,
}

fn write_series<T: Serialize>(
    dir: &Path,
    file_name: &str,
    series: &ChartSeries<'_, T>,
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(series)?;
    std::fs::write(&path, json).map_err(|source| AnalyticsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), points = series.points.len(), "chart series saved");
    Ok(path)
}

/// Write one JSON file per available chart; skipped sections produce nothing
pub fn export_charts(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| AnalyticsError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::new();

    written.push(write_series(
        dir,
        "01_daily_revenue.json",
        &ChartSeries {
            chart: "line",
            title: "Daily Revenue Trend",
            x_label: "Date",
            y_label: "Revenue ($)",
            points: analysis.daily.as_slice(),
        },
    )?);

    let best = analysis.weekly.best_day().map(|(day, _)| day);
    let weekly: Vec<WeekdayPoint> = analysis
        .weekly
        .iter()
        .map(|(day, revenue)| WeekdayPoint {
            day: weekday_name(day),
            revenue,
            best: Some(day) == best,
        })
        .collect();
    written.push(write_series(
        dir,
        "02_weekly_revenue.json",
        &ChartSeries {
            chart: "bar",
            title: "Revenue by Weekday",
            x_label: "Day",
            y_label: "Revenue ($)",
            points: weekly.as_slice(),
        },
    )?);

    if let Some(segments) = &analysis.segments {
        written.push(write_series(
            dir,
            "03_rfm_segments.json",
            &ChartSeries {
                chart: "donut",
                title: "Customer Segmentation (RFM)",
                x_label: "Segment",
                y_label: "Customers",
                points: segments.as_slice(),
            },
        )?);
    }

    if let Some(points) = &analysis.rfm_scatter {
        written.push(write_series(
            dir,
            "04_rfm_scatter.json",
            &ChartSeries {
                chart: "scatter",
                title: "RFM: Frequency vs Monetary",
                x_label: "Purchase Count",
                y_label: "Total Spent ($)",
                points: points.as_slice(),
            },
        )?);
    }

    written.push(write_series(
        dir,
        "05_top_countries.json",
        &ChartSeries {
            chart: "horizontal_bar",
            title: "Top Countries by Revenue",
            x_label: "Revenue ($)",
            y_label: "Country",
            points: analysis.countries.as_slice(),
        },
    )?);

    if let Some(points) = &analysis.monthly {
        written.push(write_series(
            dir,
            "06_monthly_trend.json",
            &ChartSeries {
                chart: "line",
                title: "Monthly Revenue Trend",
                x_label: "Month",
                y_label: "Revenue ($)",
                points: points.as_slice(),
            },
        )?);
    }

    Ok(written)
}

// ============================================================================
// TEXT REPORT
// ============================================================================

/// `1234567.891` -> `$1,234,567.89`
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the summary report. `exported` lists the chart files written this run.
pub fn render_report(analysis: &Analysis, report_countries: usize, exported: &[PathBuf]) -> String {
    let totals = &analysis.totals;
    let mut lines: Vec<String> = vec![
        RULE.to_string(),
        "ONLINE RETAIL DATA ANALYSIS - SUMMARY REPORT".to_string(),
        RULE.to_string(),
        String::new(),
    ];

    let avg = match totals.avg_order_value() {
        Ok(value) => format_money(value),
        Err(err) => {
            warn!("{}", err);
            "n/a".to_string()
        }
    };
    section_header(&mut lines, "KEY METRICS:");
    lines.push(format!("Total Revenue:             {}", format_money(totals.revenue)));
    lines.push(format!("Total Orders:              {}", format_count(totals.order_count)));
    lines.push(format!("Total Customers:           {}", format_count(totals.customer_count)));
    lines.push(format!("Total Products:            {}", format_count(totals.product_count)));
    lines.push(format!("Average Order Value:       {}", avg));
    lines.push(String::new());

    section_header(&mut lines, "RFM SEGMENTATION:");
    match &analysis.segments {
        Some(segments) if !segments.is_empty() => {
            let width = segments.iter().map(|s| s.segment.len()).max().unwrap_or(0);
            lines.extend(segments.iter().map(|s| {
                format!(
                    "{:<width$}  {:>8}  ({:.1}%)",
                    s.segment,
                    format_count(s.count),
                    s.share * 100.0,
                )
            }));
        }
        Some(_) => lines.push("No segmented customers".to_string()),
        None => lines.push("Not available (customer_segment column missing)".to_string()),
    }
    lines.push(String::new());

    section_header(&mut lines, &format!("TOP {} COUNTRIES (Revenue):", report_countries));
    let top: Vec<_> = analysis.countries.iter().take(report_countries).collect();
    if top.is_empty() {
        lines.push("No transactions".to_string());
    }
    let width = top.iter().map(|c| c.country.len()).max().unwrap_or(0);
    lines.extend(
        top.iter()
            .map(|c| format!("{:<width$}  {}", c.country, format_money(c.revenue))),
    );
    lines.push(String::new());

    section_header(&mut lines, "BEST SALES DAY:");
    lines.push(match analysis.weekly.best_day() {
        Some((day, revenue)) => format!("{} - {}", weekday_name(day), format_money(revenue)),
        None => "No transactions".to_string(),
    });
    lines.push(String::new());

    if !analysis.warnings.is_empty() {
        section_header(&mut lines, "SKIPPED SECTIONS:");
        lines.extend(analysis.warnings.iter().map(|w| w.to_string()));
        lines.push(String::new());
    }

    section_header(&mut lines, "EXPORTED CHART SERIES:");
    if exported.is_empty() {
        lines.push("None".to_string());
    }
    lines.extend(
        exported
            .iter()
            .enumerate()
            .map(|(i, path)| format!("{}. {}", i + 1, path.display())),
    );
    lines.push(String::new());

    lines.push(RULE.to_string());
    lines.push("ANALYSIS COMPLETE".to_string());
    lines.push(RULE.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn section_header(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push(THIN_RULE.to_string());
}

pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| AnalyticsError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, text).map_err(|source| AnalyticsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), "report saved");
    Ok(())
}
