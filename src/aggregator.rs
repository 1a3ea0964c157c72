// 🧮 Aggregator - revenue rollups over the transaction log
//
// Every function is pure: it reads an immutable slice of transactions
// and returns a fresh view. Nothing here logs or touches the filesystem.

use crate::dataset::Transaction;
use crate::error::{AnalyticsError, Result};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Default number of countries kept by `country_revenue`
pub const DEFAULT_TOP_COUNTRIES: usize = 10;

/// Monday..Sunday, the fixed display order for weekly revenue
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ============================================================================
// TOTAL METRICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalMetrics {
    pub revenue: f64,
    pub order_count: usize,
    pub customer_count: usize,
    pub product_count: usize,
}

impl TotalMetrics {
    /// revenue / order_count; undefined when there are no orders
    pub fn avg_order_value(&self) -> Result<f64> {
        if self.order_count == 0 {
            return Err(AnalyticsError::NoOrders);
        }
        Ok(self.revenue / self.order_count as f64)
    }
}

/// Revenue is folded from the per-date buckets in date order, the same
/// summation `daily_revenue` exposes, so the daily series adds up to it exactly.
pub fn total_metrics(records: &[Transaction]) -> TotalMetrics {
    let mut invoices = HashSet::new();
    let mut customers = HashSet::new();
    let mut products = HashSet::new();

    for tx in records {
        invoices.insert(tx.invoice_no.as_str());
        products.insert(tx.stock_code.as_str());
        if let Some(customer) = tx.customer_id.as_deref() {
            customers.insert(customer);
        }
    }

    TotalMetrics {
        revenue: revenue_by_date(records).into_values().sum(),
        order_count: invoices.len(),
        customer_count: customers.len(),
        product_count: products.len(),
    }
}

// ============================================================================
// DAILY REVENUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

fn revenue_by_date(records: &[Transaction]) -> BTreeMap<NaiveDate, f64> {
    let mut by_date = BTreeMap::new();
    for tx in records {
        *by_date.entry(tx.date()).or_insert(0.0) += tx.total_price;
    }
    by_date
}

/// Revenue per calendar date, ascending by date
pub fn daily_revenue(records: &[Transaction]) -> Vec<DailyRevenue> {
    revenue_by_date(records)
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

// ============================================================================
// WEEKLY REVENUE
// ============================================================================

/// Revenue per weekday. Always holds all seven days; days without sales are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRevenue {
    revenue: [f64; 7],
    record_counts: [usize; 7],
}

impl WeeklyRevenue {
    pub fn get(&self, day: Weekday) -> f64 {
        self.revenue[day.num_days_from_monday() as usize]
    }

    /// (weekday, revenue) in Monday..Sunday order
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEKDAYS.iter().map(move |&day| (day, self.get(day)))
    }

    /// Line items sold on `day`
    pub fn record_count(&self, day: Weekday) -> usize {
        self.record_counts[day.num_days_from_monday() as usize]
    }

    /// Highest-revenue weekday among days with sales, earliest in the week on ties.
    /// Zero-filled days never win.
    pub fn best_day(&self) -> Option<(Weekday, f64)> {
        self.iter()
            .filter(|(day, _)| self.record_count(*day) > 0)
            .fold(None, |best, (day, revenue)| match best {
                Some((_, top)) if top >= revenue => best,
                _ => Some((day, revenue)),
            })
    }
}

pub fn weekly_revenue(records: &[Transaction]) -> WeeklyRevenue {
    let mut revenue = [0.0; 7];
    let mut record_counts = [0; 7];

    for tx in records {
        let idx = tx.weekday().num_days_from_monday() as usize;
        revenue[idx] += tx.total_price;
        record_counts[idx] += 1;
    }

    WeeklyRevenue {
        revenue,
        record_counts,
    }
}

// ============================================================================
// COUNTRY REVENUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRevenue {
    pub country: String,
    pub revenue: f64,
    pub order_count: usize,
    pub customer_count: usize,
}

#[derive(Default)]
struct CountryAccumulator<'a> {
    revenue: f64,
    invoices: HashSet<&'a str>,
    customers: HashSet<&'a str>,
}

/// Top `top_n` countries by revenue. Groups start in country-name order and the
/// sort is stable, so equal revenues stay alphabetical.
pub fn country_revenue(records: &[Transaction], top_n: usize) -> Vec<CountryRevenue> {
    let mut groups: BTreeMap<&str, CountryAccumulator> = BTreeMap::new();

    for tx in records {
        let acc = groups.entry(tx.country.as_str()).or_default();
        acc.revenue += tx.total_price;
        acc.invoices.insert(tx.invoice_no.as_str());
        if let Some(customer) = tx.customer_id.as_deref() {
            acc.customers.insert(customer);
        }
    }

    let mut rows: Vec<CountryRevenue> = groups
        .into_iter()
        .map(|(country, acc)| CountryRevenue {
            country: country.to_string(),
            revenue: round_cents(acc.revenue),
            order_count: acc.invoices.len(),
            customer_count: acc.customers.len(),
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows.truncate(top_n);
    rows
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    fn create_test_transaction(
        invoice: &str,
        quantity: i64,
        price: f64,
        date: &str,
        country: &str,
        customer: Option<&str>,
    ) -> Transaction {
        Transaction::new(invoice, "SKU-1", customer, country, quantity, price, ts(date))
    }

    /// Three line items: two on Monday in the UK, one on Tuesday in the US
    fn scenario() -> Vec<Transaction> {
        vec![
            create_test_transaction("A", 2, 5.00, "2023-01-02", "UK", Some("1")),
            create_test_transaction("A", 1, 3.00, "2023-01-02", "UK", Some("1")),
            create_test_transaction("B", 4, 2.50, "2023-01-03", "US", Some("2")),
        ]
    }

    #[test]
    fn test_total_metrics_scenario() {
        let metrics = total_metrics(&scenario());

        assert_eq!(metrics.revenue, 23.00);
        assert_eq!(metrics.order_count, 2);
        assert_eq!(metrics.customer_count, 2);
        assert_eq!(metrics.avg_order_value().unwrap(), 11.50);
    }

    #[test]
    fn test_total_metrics_counts_distinct_products() {
        let mut records = scenario();
        records[2].stock_code = "SKU-2".to_string();

        assert_eq!(total_metrics(&records).product_count, 2);
    }

    #[test]
    fn test_empty_input_has_no_average() {
        let metrics = total_metrics(&[]);

        assert_eq!(metrics.revenue, 0.0);
        assert_eq!(metrics.order_count, 0);
        assert!(matches!(metrics.avg_order_value(), Err(AnalyticsError::NoOrders)));
    }

    #[test]
    fn test_null_customers_count_for_revenue_only() {
        let records = vec![
            create_test_transaction("A", 1, 10.0, "2023-01-02", "UK", None),
            create_test_transaction("B", 1, 5.0, "2023-01-02", "UK", Some("7")),
        ];

        let metrics = total_metrics(&records);
        assert_eq!(metrics.revenue, 15.0);
        assert_eq!(metrics.customer_count, 1);

        let countries = country_revenue(&records, 10);
        assert_eq!(countries[0].customer_count, 1);
        assert_eq!(countries[0].order_count, 2);
    }

    #[test]
    fn test_daily_revenue_scenario() {
        let daily = daily_revenue(&scenario());

        assert_eq!(
            daily,
            vec![
                DailyRevenue {
                    date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                    revenue: 13.00,
                },
                DailyRevenue {
                    date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                    revenue: 10.00,
                },
            ]
        );
    }

    #[test]
    fn test_daily_revenue_sorted_and_sums_to_total() {
        let records = vec![
            create_test_transaction("C", 3, 1.25, "2023-02-10", "UK", Some("1")),
            create_test_transaction("A", 2, 5.00, "2023-01-02", "UK", Some("1")),
            create_test_transaction("D", -1, 4.50, "2023-02-10", "FR", Some("3")),
            create_test_transaction("B", 8, 0.75, "2023-01-05", "DE", None),
        ];

        let daily = daily_revenue(&records);
        let dates: Vec<_> = daily.iter().map(|d| d.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);

        let sum: f64 = daily.iter().map(|d| d.revenue).sum();
        assert_eq!(sum, total_metrics(&records).revenue);
    }

    #[test]
    fn test_daily_revenue_sums_to_total_with_cent_prices() {
        // Cent prices like 4.37 are not exact in binary
        let dates = ["2023-03-01", "2023-03-02", "2023-03-03", "2023-03-06", "2023-03-07"];
        let mut seed: u64 = 42;
        let mut next = |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };

        for _ in 0..25 {
            let records: Vec<Transaction> = (0..20)
                .map(|i| {
                    let price = (next(1000) + 1) as f64 / 100.0;
                    let quantity = next(12) as i64 + 1;
                    let date = dates[next(dates.len() as u64) as usize];
                    create_test_transaction(&format!("INV-{i}"), quantity, price, date, "UK", None)
                })
                .collect();

            let daily_sum: f64 = daily_revenue(&records).iter().map(|d| d.revenue).sum();
            assert_eq!(daily_sum, total_metrics(&records).revenue);
        }
    }

    #[test]
    fn test_weekly_revenue_scenario() {
        let weekly = weekly_revenue(&scenario());

        assert_eq!(weekly.get(Weekday::Mon), 13.00);
        assert_eq!(weekly.get(Weekday::Tue), 10.00);
        for day in [Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun] {
            assert_eq!(weekly.get(day), 0.0);
        }
        assert_eq!(weekly.best_day(), Some((Weekday::Mon, 13.00)));
    }

    #[test]
    fn test_weekly_revenue_always_seven_days_in_order() {
        // 2023-01-08 is a Sunday
        let records = vec![create_test_transaction("A", 1, 2.0, "2023-01-08", "UK", None)];
        let weekly = weekly_revenue(&records);

        let days: Vec<_> = weekly.iter().map(|(day, _)| day).collect();
        assert_eq!(days, WEEKDAYS.to_vec());
        assert_eq!(weekly.get(Weekday::Sun), 2.0);

        assert_eq!(weekly_revenue(&[]).iter().count(), 7);
        assert_eq!(weekly_revenue(&[]).best_day(), None);
    }

    #[test]
    fn test_best_day_prefers_earliest_on_tie() {
        let records = vec![
            create_test_transaction("A", 1, 5.0, "2023-01-04", "UK", None), // Wed
            create_test_transaction("B", 1, 5.0, "2023-01-03", "UK", None), // Tue
        ];

        assert_eq!(weekly_revenue(&records).best_day(), Some((Weekday::Tue, 5.0)));
    }

    #[test]
    fn test_best_day_ignores_days_without_sales() {
        // Returns-only Monday nets negative; the empty days stay at 0
        let records = vec![create_test_transaction("C1", -1, 5.0, "2023-01-02", "UK", None)];
        let weekly = weekly_revenue(&records);

        assert_eq!(weekly.get(Weekday::Tue), 0.0);
        assert_eq!(weekly.record_count(Weekday::Mon), 1);
        assert_eq!(weekly.record_count(Weekday::Tue), 0);
        assert_eq!(weekly.best_day(), Some((Weekday::Mon, -5.0)));
    }

    #[test]
    fn test_country_revenue_sorted_and_truncated() {
        let records = vec![
            create_test_transaction("A", 1, 10.0, "2023-01-02", "France", Some("1")),
            create_test_transaction("B", 1, 30.0, "2023-01-02", "Germany", Some("2")),
            create_test_transaction("C", 1, 20.0, "2023-01-02", "Spain", Some("3")),
            create_test_transaction("D", 1, 5.0, "2023-01-02", "Germany", Some("2")),
        ];

        let top = country_revenue(&records, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].country, "Germany");
        assert_eq!(top[0].revenue, 35.0);
        assert_eq!(top[0].order_count, 2);
        assert_eq!(top[0].customer_count, 1);
        assert_eq!(top[1].country, "Spain");

        let all = country_revenue(&records, DEFAULT_TOP_COUNTRIES);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].revenue >= w[1].revenue));
    }

    #[test]
    fn test_country_revenue_ties_stay_alphabetical() {
        let records = vec![
            create_test_transaction("A", 1, 10.0, "2023-01-02", "Norway", None),
            create_test_transaction("B", 1, 10.0, "2023-01-02", "Austria", None),
            create_test_transaction("C", 1, 10.0, "2023-01-02", "Japan", None),
        ];

        let countries: Vec<_> = country_revenue(&records, 10)
            .into_iter()
            .map(|c| c.country)
            .collect();
        assert_eq!(countries, vec!["Austria", "Japan", "Norway"]);
    }

    #[test]
    fn test_country_revenue_rounds_to_cents() {
        let records = vec![create_test_transaction("A", 3, 0.333, "2023-01-02", "UK", None)];

        assert_eq!(country_revenue(&records, 10)[0].revenue, 1.0);
    }

    #[test]
    fn test_aggregates_are_idempotent() {
        let records = scenario();

        assert_eq!(total_metrics(&records), total_metrics(&records));
        assert_eq!(daily_revenue(&records), daily_revenue(&records));
        assert_eq!(weekly_revenue(&records), weekly_revenue(&records));
        assert_eq!(country_revenue(&records, 1), country_revenue(&records, 1));
    }
}
