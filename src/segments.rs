// RFM segment breakdown, RFM scatter points and the monthly trend series.
// Inputs come pre-scored from upstream; this module only reshapes them.

use crate::dataset::{normalize_customer_id, MonthlyRecord, RfmRecord};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCount {
    pub segment: String,
    pub count: usize,
    /// count / all RFM rows
    pub share: f64,
}

/// Customers per segment, largest first. Equal counts keep first-seen order.
pub fn segment_counts(rfm: &[RfmRecord]) -> Vec<SegmentCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for row in rfm {
        let Some(segment) = row.customer_segment.as_deref() else {
            continue;
        };
        let count = counts.entry(segment).or_insert(0);
        if *count == 0 {
            order.push(segment);
        }
        *count += 1;
    }

    let total = rfm.len();
    let mut result: Vec<SegmentCount> = order
        .into_iter()
        .map(|segment| {
            let count = counts[segment];
            SegmentCount {
                segment: segment.to_string(),
                count,
                share: count as f64 / total as f64,
            }
        })
        .collect();

    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmPoint {
    pub customer_id: String,
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
    pub segment: String,
}

/// One point per customer with a complete RFM row
pub fn rfm_scatter(rfm: &[RfmRecord]) -> Vec<RfmPoint> {
    rfm.iter()
        .filter_map(|row| {
            Some(RfmPoint {
                customer_id: normalize_customer_id(row.customer_id.as_deref()?),
                recency: row.recency?,
                frequency: row.frequency?,
                monetary: row.monetary?,
                segment: row.customer_segment.clone()?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub revenue: f64,
}

/// Monthly roll-up in file order; incomplete rows are dropped
pub fn monthly_trend(monthly: &[MonthlyRecord]) -> Vec<MonthlyPoint> {
    monthly
        .iter()
        .filter_map(|row| {
            Some(MonthlyPoint {
                month: row.month.clone()?,
                revenue: row.revenue?,
            })
        })
        .collect()
}
