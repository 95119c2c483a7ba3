//! Product family view

use acctlink_common::models::ProductSeries;
use serde::{Deserialize, Serialize};

use crate::metrics::record::MetricsRecord;

/// Issue categories listed per product
const TOP_ISSUES: usize = 5;

/// Sales, deployment and field-support statistics for one product series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub product_series: ProductSeries,
    pub record: MetricsRecord,
    /// Most frequent case reasons, most common first
    pub top_issues: Vec<String>,
}

impl ProductMetrics {
    pub(crate) fn new(product_series: ProductSeries, record: MetricsRecord) -> Self {
        let top_issues = record.top_issues(TOP_ISSUES);
        Self {
            product_series,
            record,
            top_issues,
        }
    }

    /// Table row: series, units sold/deployed, success, support intensity, failures
    pub fn table_row(&self) -> String {
        let r = &self.record;
        format!(
            "{:<10} {:>6} {:>9} {:>8.1}% {:>9.2} {:>9.2} {:>6.1}",
            self.product_series.label(),
            r.units_sold,
            r.units_deployed,
            r.deployment_success_rate * 100.0,
            r.support_intensity,
            r.hardware_failure_rate,
            r.avg_journey_health
        )
    }

    pub fn table_header() -> String {
        format!(
            "{:<10} {:>6} {:>9} {:>9} {:>9} {:>9} {:>6}",
            "Product", "Sold", "Deployed", "Success", "Cases/U", "HW Fail", "Health"
        )
    }
}
