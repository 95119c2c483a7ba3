//! Link summary report
//!
//! Read-only view over a [`LinkedDataset`]. Every number here is recomputed
//! from the orders and orphan buckets when the summary is built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::{LinkedDataset, SourceKind};

/// Coverage and orphan statistics for one linking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkSummary {
    pub total_orders: usize,
    pub orders_with_opportunity: usize,
    pub orders_with_deployment: usize,
    pub orders_with_support: usize,
    pub fully_linked_orders: usize,

    /// Records with no usable order number
    pub orphan_opportunities: usize,
    pub orphan_deployments: usize,
    pub orphan_cases: usize,

    /// Source totals (linked + orphaned)
    pub total_opportunities: usize,
    pub total_deployments: usize,
    pub total_cases: usize,

    /// Opportunities that lost the duplicate-key tie-break
    pub opportunity_conflicts: usize,
}

impl LinkSummary {
    pub fn from_dataset(dataset: &LinkedDataset) -> Self {
        let orders = dataset.orders();
        Self {
            total_orders: orders.len(),
            orders_with_opportunity: orders.iter().filter(|o| o.has_opportunity()).count(),
            orders_with_deployment: orders.iter().filter(|o| o.has_deployments()).count(),
            orders_with_support: orders.iter().filter(|o| o.has_support_cases()).count(),
            fully_linked_orders: orders.iter().filter(|o| o.is_fully_linked()).count(),
            orphan_opportunities: dataset.orphan_count(SourceKind::Opportunity),
            orphan_deployments: dataset.orphan_count(SourceKind::Deployment),
            orphan_cases: dataset.orphan_count(SourceKind::SupportCase),
            total_opportunities: dataset.input_count(SourceKind::Opportunity),
            total_deployments: dataset.input_count(SourceKind::Deployment),
            total_cases: dataset.input_count(SourceKind::SupportCase),
            opportunity_conflicts: dataset.opportunity_conflicts(),
        }
    }

    /// Orders are only created for matched keys
    pub fn matched_orders(&self) -> usize {
        self.total_orders
    }

    pub fn opportunity_pct(&self) -> f64 {
        percent(self.orders_with_opportunity, self.total_orders)
    }

    pub fn deployment_pct(&self) -> f64 {
        percent(self.orders_with_deployment, self.total_orders)
    }

    pub fn support_pct(&self) -> f64 {
        percent(self.orders_with_support, self.total_orders)
    }

    pub fn fully_linked_pct(&self) -> f64 {
        percent(self.fully_linked_orders, self.total_orders)
    }

    /// Multi-section report including source totals and conflicts
    pub fn render_report(&self) -> String {
        let rule = "=".repeat(50);
        let mut lines = vec![
            rule.clone(),
            "DATA LINKING SUMMARY".to_string(),
            rule.clone(),
            String::new(),
            "Orders:".to_string(),
        ];
        lines.extend(self.to_string().lines().map(|l| format!("  {}", l)));
        lines.push(String::new());
        lines.push("Source Records:".to_string());
        lines.push(format!(
            "  Opportunities: {} (orphans: {}, duplicates: {})",
            self.total_opportunities, self.orphan_opportunities, self.opportunity_conflicts
        ));
        lines.push(format!(
            "  Deployments: {} (orphans: {})",
            self.total_deployments, self.orphan_deployments
        ));
        lines.push(format!(
            "  Support Cases: {} (orphans: {})",
            self.total_cases, self.orphan_cases
        ));
        lines.push(rule);
        lines.join("\n")
    }
}

/// Canonical six-line report
impl fmt::Display for LinkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Orders: {}", self.total_orders)?;
        writeln!(
            f,
            "Orders with Opportunity: {} ({:.0}%)",
            self.orders_with_opportunity,
            self.opportunity_pct()
        )?;
        writeln!(
            f,
            "Orders with Deployment: {} ({:.0}%)",
            self.orders_with_deployment,
            self.deployment_pct()
        )?;
        writeln!(
            f,
            "Orders with Support Cases: {} ({:.0}%)",
            self.orders_with_support,
            self.support_pct()
        )?;
        writeln!(
            f,
            "Fully Linked (all 3): {} ({:.0}%)",
            self.fully_linked_orders,
            self.fully_linked_pct()
        )?;
        write!(f, "Orphan Cases (no order): {}", self.orphan_cases)
    }
}

/// Percentage of `num` in `denom`, 0 when `denom` is 0
fn percent(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64 * 100.0
    }
}
