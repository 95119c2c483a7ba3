//! Use case view
//!
//! Groups orders by the workload category of their opportunity and breaks
//! deployment outcomes down by product so the best fit per workload can be
//! read off directly.

use std::collections::BTreeMap;

use acctlink_common::config::MetricsConfig;
use acctlink_common::models::{ProductSeries, UseCaseCategory};
use serde::{Deserialize, Serialize};

use crate::dataset::Order;
use crate::metrics::record::{ratio, MetricsRecord, RecordBuilder};

const TOP_ISSUES: usize = 5;
const MAX_PAIN_POINTS: usize = 5;
const MAX_RECOMMENDED: usize = 3;
/// Scored deployments a product needs before it can be recommended
const MIN_RECOMMEND_DEPLOYMENTS: usize = 2;

/// Deployment outcome of one product within a use case
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub avg_deployment_score: f64,
    /// Fraction of scored deployments above the success threshold
    pub success_rate: f64,
    /// Scored deployments
    pub deployment_count: usize,
}

/// Statistics for one workload category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseMetrics {
    pub use_case: UseCaseCategory,
    pub record: MetricsRecord,
    /// Service deploys / units deployed
    pub service_deploy_rate: f64,
    pub product_performance: BTreeMap<ProductSeries, ProductPerformance>,
    pub best_performing_product: Option<ProductSeries>,
    /// Only set when more than one product has scored deployments
    pub worst_performing_product: Option<ProductSeries>,
    pub recommended_products: Vec<ProductSeries>,
    pub top_issues: Vec<String>,
    pub common_pain_points: Vec<String>,
}

impl UseCaseMetrics {
    pub(crate) fn build(use_case: UseCaseCategory, orders: &[&Order], config: &MetricsConfig) -> Self {
        let mut builder = RecordBuilder::new(config);
        let mut scores: BTreeMap<ProductSeries, Vec<u8>> = BTreeMap::new();
        let mut pain_points: Vec<String> = Vec::new();

        for order in orders {
            builder.add_order(order);

            if let Some(opportunity) = order.opportunity() {
                let pain = opportunity.pain_points.trim();
                if !pain.is_empty()
                    && pain_points.len() < MAX_PAIN_POINTS
                    && !pain_points.iter().any(|p| p == pain)
                {
                    pain_points.push(pain.to_string());
                }
            }

            for deployment in order.deployments() {
                if !deployment.product_series.is_known() {
                    continue;
                }
                if let Some(score) = deployment.deployment_score() {
                    scores.entry(deployment.product_series).or_default().push(score);
                }
            }
        }

        let record = builder.finish();
        let threshold = config.deployment_success_threshold;
        let product_performance: BTreeMap<ProductSeries, ProductPerformance> = scores
            .into_iter()
            .map(|(series, scores)| {
                let count = scores.len();
                let total: f64 = scores.iter().copied().map(f64::from).sum();
                let successes = scores.iter().filter(|&&s| s > threshold).count();
                (
                    series,
                    ProductPerformance {
                        avg_deployment_score: ratio(total, count as f64),
                        success_rate: ratio(successes as f64, count as f64),
                        deployment_count: count,
                    },
                )
            })
            .collect();

        let mut by_score: Vec<(ProductSeries, ProductPerformance)> =
            product_performance.iter().map(|(s, p)| (*s, *p)).collect();
        by_score.sort_by(|a, b| b.1.avg_deployment_score.total_cmp(&a.1.avg_deployment_score));
        let best_performing_product = by_score.first().map(|(s, _)| *s);
        let worst_performing_product = if by_score.len() > 1 {
            by_score.last().map(|(s, _)| *s)
        } else {
            None
        };

        let mut qualified: Vec<(ProductSeries, ProductPerformance)> = product_performance
            .iter()
            .filter(|(_, p)| p.deployment_count >= MIN_RECOMMEND_DEPLOYMENTS)
            .map(|(s, p)| (*s, *p))
            .collect();
        qualified.sort_by(|a, b| b.1.success_rate.total_cmp(&a.1.success_rate));
        let recommended_products = qualified
            .into_iter()
            .take(MAX_RECOMMENDED)
            .map(|(s, _)| s)
            .collect();

        Self {
            use_case,
            service_deploy_rate: ratio(record.service_deploys as f64, record.units_deployed as f64),
            top_issues: record.top_issues(TOP_ISSUES),
            record,
            product_performance,
            best_performing_product,
            worst_performing_product,
            recommended_products,
            common_pain_points: pain_points,
        }
    }

    pub fn table_header() -> String {
        format!(
            "{:<22} {:>6} {:>9} {:>9} {:>9} {:<10}",
            "Use Case", "Orders", "Deployed", "Success", "Cases/U", "Best"
        )
    }

    pub fn table_row(&self) -> String {
        let r = &self.record;
        format!(
            "{:<22} {:>6} {:>9} {:>8.1}% {:>9.2} {:<10}",
            self.use_case.label(),
            r.orders,
            r.units_deployed,
            r.deployment_success_rate * 100.0,
            r.support_intensity,
            self.best_performing_product.map_or("-", ProductSeries::label)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::link;
    use acctlink_common::models::{Deployment, DeploymentAnalysis, Opportunity};

    fn deployment(key: &str, series: ProductSeries, score: u8, service: bool) -> Deployment {
        Deployment {
            order_number: key.to_string(),
            product_series: series,
            analysis: Some(DeploymentAnalysis {
                deployment_score: score,
                is_service_deploy: service,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_product_breakdown_and_recommendations() {
        let dataset = link(
            vec![
                Opportunity {
                    order_number: "1".to_string(),
                    primary_use_case: "Nightly backup".to_string(),
                    pain_points: "Slow restores".to_string(),
                    ..Default::default()
                },
                Opportunity {
                    order_number: "2".to_string(),
                    primary_use_case: "Archive".to_string(),
                    pain_points: "Slow restores".to_string(),
                    ..Default::default()
                },
            ],
            vec![
                deployment("1", ProductSeries::F, 90, true),
                deployment("1", ProductSeries::F, 60, false),
                deployment("2", ProductSeries::H, 95, true),
                deployment("2", ProductSeries::H, 85, false),
                deployment("2", ProductSeries::R, 40, false),
            ],
            vec![],
        );
        let orders: Vec<&Order> = dataset.orders().iter().collect();
        let metrics = UseCaseMetrics::build(
            UseCaseCategory::BackupArchive,
            &orders,
            &MetricsConfig::default(),
        );

        let f = metrics.product_performance[&ProductSeries::F];
        assert_eq!(f.deployment_count, 2);
        assert_eq!(f.avg_deployment_score, 75.0);
        assert_eq!(f.success_rate, 0.5);

        assert_eq!(metrics.best_performing_product, Some(ProductSeries::H));
        assert_eq!(metrics.worst_performing_product, Some(ProductSeries::R));
        assert_eq!(metrics.recommended_products, vec![ProductSeries::H, ProductSeries::F]);
        assert_eq!(metrics.common_pain_points, vec!["Slow restores"]);
        assert_eq!(metrics.service_deploy_rate, 0.4);
    }

    #[test]
    fn test_single_product_has_no_worst() {
        let dataset = link(vec![], vec![deployment("1", ProductSeries::M, 80, true)], vec![]);
        let orders: Vec<&Order> = dataset.orders().iter().collect();
        let metrics =
            UseCaseMetrics::build(UseCaseCategory::Unknown, &orders, &MetricsConfig::default());
        assert_eq!(metrics.best_performing_product, Some(ProductSeries::M));
        assert_eq!(metrics.worst_performing_product, None);
        assert!(metrics.recommended_products.is_empty());
    }
}
