//! Customer account view

use std::collections::BTreeSet;

use acctlink_common::config::MetricsConfig;
use acctlink_common::models::ChurnRisk;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::Order;
use crate::metrics::record::{MetricsRecord, RecordBuilder};
use crate::metrics::scoring;

/// Insights taken from each order assessment
const INSIGHTS_PER_ORDER: usize = 2;
/// Insights kept per account
const MAX_INSIGHTS: usize = 5;

/// Purchase history, health and churn outlook of one customer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMetrics {
    pub account_name: String,
    pub record: MetricsRecord,

    /// Distinct primary products, sorted
    pub products_purchased: Vec<String>,
    pub first_purchase_date: Option<NaiveDate>,
    pub last_purchase_date: Option<NaiveDate>,
    /// Days from first purchase to the reporting date
    pub tenure_days: Option<i64>,

    /// 0-100, higher = healthier
    pub health_score: f64,
    pub churn_risk: ChurnRisk,

    pub critical_findings: Vec<String>,
    pub positive_signals: Vec<String>,
    pub recommended_actions: Vec<String>,
}

impl AccountMetrics {
    pub(crate) fn build(
        account_name: &str,
        orders: &[&Order],
        config: &MetricsConfig,
        as_of: NaiveDate,
    ) -> Self {
        let mut builder = RecordBuilder::new(config);
        let mut products = BTreeSet::new();
        let mut purchase_dates = Vec::new();
        let mut findings = Insights::default();
        let mut signals = Insights::default();
        let mut actions = Insights::default();

        for order in orders {
            builder.add_order(order);

            if let Some(opportunity) = order.opportunity() {
                let product = opportunity.primary_product.trim();
                if !product.is_empty() {
                    products.insert(product.to_string());
                }
                purchase_dates.extend(opportunity.close_date);
            }

            if let Some(assessment) = order.assessment() {
                findings.extend(&assessment.critical_findings);
                signals.extend(&assessment.positive_signals);
                actions.extend(&assessment.immediate_actions);
            }
        }

        let record = builder.finish();
        let first_purchase_date = purchase_dates.iter().min().copied();
        let last_purchase_date = purchase_dates.iter().max().copied();
        let tenure_days = first_purchase_date.map(|first| (as_of - first).num_days().max(0));

        let health_score = scoring::account_health(&record);
        let churn_risk = scoring::account_churn_risk(&record, health_score);

        Self {
            account_name: account_name.to_string(),
            record,
            products_purchased: products.into_iter().collect(),
            first_purchase_date,
            last_purchase_date,
            tenure_days,
            health_score,
            churn_risk,
            critical_findings: findings.0,
            positive_signals: signals.0,
            recommended_actions: actions.0,
        }
    }

    /// Churn risk at or above `min_risk`
    pub fn is_at_risk(&self, min_risk: ChurnRisk) -> bool {
        self.churn_risk >= min_risk
    }

    pub fn table_header() -> String {
        format!(
            "{:<24} {:>6} {:>12} {:>9} {:>6} {:>7} {:<8}",
            "Account", "Orders", "Spend", "Deployed", "Cases", "Health", "Churn"
        )
    }

    pub fn table_row(&self) -> String {
        let r = &self.record;
        format!(
            "{:<24} {:>6} {:>12.0} {:>9} {:>6} {:>7.0} {:<8}",
            self.account_name,
            r.orders,
            r.total_revenue,
            r.units_deployed,
            r.support_cases,
            self.health_score,
            self.churn_risk.label()
        )
    }
}

/// Distinct strings in first-seen order, capped at [`MAX_INSIGHTS`]
#[derive(Default)]
struct Insights(Vec<String>);

impl Insights {
    fn extend(&mut self, items: &[String]) {
        for item in items.iter().take(INSIGHTS_PER_ORDER) {
            if self.0.len() >= MAX_INSIGHTS {
                return;
            }
            if !self.0.contains(item) {
                self.0.push(item.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{annotate, Annotator};
    use crate::linker::link;
    use acctlink_common::models::{Opportunity, OrderAssessment};

    struct Findings;

    impl Annotator for Findings {
        fn evaluate_order(&self, order: &Order) -> Option<OrderAssessment> {
            Some(OrderAssessment {
                critical_findings: vec![
                    "slow install".to_string(),
                    format!("order {}", order.key()),
                    "never shown".to_string(),
                ],
                ..Default::default()
            })
        }
    }

    fn opp(key: &str, product: &str, close: &str) -> Opportunity {
        Opportunity {
            order_number: key.to_string(),
            account_name: "Acme".to_string(),
            primary_product: product.to_string(),
            amount: 100.0,
            close_date: NaiveDate::parse_from_str(close, "%Y-%m-%d").ok(),
            ..Default::default()
        }
    }

    #[test]
    fn test_purchase_history_and_tenure() {
        let dataset = link(
            vec![
                opp("1", "M50", "2024-03-01"),
                opp("2", "F100", "2023-01-01"),
                opp("3", "M50", "2024-06-30"),
            ],
            vec![],
            vec![],
        );
        let orders: Vec<&Order> = dataset.orders().iter().collect();
        let as_of = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let metrics = AccountMetrics::build("Acme", &orders, &MetricsConfig::default(), as_of);

        assert_eq!(metrics.products_purchased, vec!["F100", "M50"]);
        assert_eq!(metrics.first_purchase_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(metrics.last_purchase_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(metrics.tenure_days, Some(30));
        assert_eq!(metrics.record.total_revenue, 300.0);
        assert_eq!(metrics.churn_risk, ChurnRisk::Low);
    }

    #[test]
    fn test_insights_distinct_and_capped() {
        let dataset = annotate(
            link(
                (1..=8).map(|i| opp(&i.to_string(), "M50", "2024-01-01")).collect(),
                vec![],
                vec![],
            ),
            &Findings,
        );
        let orders: Vec<&Order> = dataset.orders().iter().collect();
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let metrics = AccountMetrics::build("Acme", &orders, &MetricsConfig::default(), as_of);

        assert_eq!(
            metrics.critical_findings,
            vec!["slow install", "order 1", "order 2", "order 3", "order 4"]
        );
        assert_eq!(metrics.tenure_days, Some(0));
    }
}
