//! Service-deploy vs self-deploy comparison
//!
//! An order belongs to a deployment mode when at least one of its
//! deployments was annotated with that mode. Only those deployments are
//! counted on the deployment side; the order's opportunity and support cases
//! count in full. An order with both kinds of deployment appears on both
//! sides, so the two records do not partition the dataset.

use std::collections::BTreeMap;
use std::fmt;

use acctlink_common::config::MetricsConfig;
use acctlink_common::models::{Deployment, ProductSeries};
use serde::{Deserialize, Serialize};

use crate::dataset::LinkedDataset;
use crate::metrics::record::{MetricsRecord, RecordBuilder};

/// Outcomes of one deployment mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub is_service_deploy: bool,
    pub record: MetricsRecord,
    /// Matching deployments per product series
    pub products_deployed: BTreeMap<ProductSeries, usize>,
}

impl ServiceMetrics {
    pub(crate) fn build(dataset: &LinkedDataset, is_service_deploy: bool, config: &MetricsConfig) -> Self {
        let matches = |d: &Deployment| {
            d.is_service_deploy() == Some(is_service_deploy)
        };

        let mut builder = RecordBuilder::new(config);
        let mut products_deployed = BTreeMap::new();

        for order in dataset.orders() {
            if !order.deployments().iter().any(|d| matches(d)) {
                continue;
            }
            builder.add_order_with(order, matches);
            for deployment in order.deployments().iter().filter(|&d| matches(d)) {
                *products_deployed.entry(deployment.product_series).or_insert(0) += 1;
            }
        }

        Self {
            is_service_deploy,
            record: builder.finish(),
            products_deployed,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.is_service_deploy {
            "Service Deploy"
        } else {
            "Self Deploy"
        }
    }
}

/// How strongly professional-services deployment is worth recommending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceRecommendation {
    Strong,
    Moderate,
    Mixed,
    SelfComparable,
    SelfOutperforming,
}

impl ServiceRecommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            ServiceRecommendation::Strong
        } else if score >= 55.0 {
            ServiceRecommendation::Moderate
        } else if score >= 45.0 {
            ServiceRecommendation::Mixed
        } else if score >= 30.0 {
            ServiceRecommendation::SelfComparable
        } else {
            ServiceRecommendation::SelfOutperforming
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ServiceRecommendation::Strong => {
                "Strong recommendation for professional services deployment"
            }
            ServiceRecommendation::Moderate => "Moderate preference for professional services",
            ServiceRecommendation::Mixed => {
                "Mixed results; weigh customer technical capability"
            }
            ServiceRecommendation::SelfComparable => {
                "Self-deploy comparable or better; review service delivery"
            }
            ServiceRecommendation::SelfOutperforming => {
                "Self-deploy significantly outperforming service deploys"
            }
        }
    }
}

impl fmt::Display for ServiceRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Side-by-side outcomes; every delta is positive when service is better
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceComparison {
    pub service: ServiceMetrics,
    pub self_deploy: ServiceMetrics,
    pub deployment_score_delta: f64,
    /// Percentage points
    pub success_rate_delta: f64,
    /// Cases per deployed unit, self minus service
    pub support_intensity_delta: f64,
    /// Frustration points, self minus service
    pub frustration_delta: f64,
    pub journey_health_delta: f64,
    /// 0-100, 50 = no difference
    pub value_add_score: f64,
    pub recommendation: ServiceRecommendation,
}

impl ServiceComparison {
    pub(crate) fn build(dataset: &LinkedDataset, config: &MetricsConfig) -> Self {
        let service = ServiceMetrics::build(dataset, true, config);
        let self_deploy = ServiceMetrics::build(dataset, false, config);
        let (s, d) = (&service.record, &self_deploy.record);

        let deployment_score_delta = s.avg_deployment_score - d.avg_deployment_score;
        let success_rate_delta = (s.deployment_success_rate - d.deployment_success_rate) * 100.0;
        let support_intensity_delta = d.support_intensity - s.support_intensity;
        let frustration_delta = d.avg_frustration_score - s.avg_frustration_score;
        let journey_health_delta = s.avg_journey_health - d.avg_journey_health;

        let value_add_score = value_add_score(
            success_rate_delta,
            support_intensity_delta,
            frustration_delta,
            journey_health_delta,
        );

        Self {
            service,
            self_deploy,
            deployment_score_delta,
            success_rate_delta,
            support_intensity_delta,
            frustration_delta,
            journey_health_delta,
            value_add_score,
            recommendation: ServiceRecommendation::from_score(value_add_score),
        }
    }

    /// Metric / service / self / delta rows
    pub fn table(&self) -> Vec<(&'static str, String, String, String)> {
        let (s, d) = (&self.service.record, &self.self_deploy.record);
        vec![
            (
                "Deployments",
                s.units_deployed.to_string(),
                d.units_deployed.to_string(),
                format!("{:+}", s.units_deployed as i64 - d.units_deployed as i64),
            ),
            (
                "Avg Deployment Score",
                format!("{:.1}", s.avg_deployment_score),
                format!("{:.1}", d.avg_deployment_score),
                format!("{:+.1}", self.deployment_score_delta),
            ),
            (
                "Deployment Success Rate",
                format!("{:.1}%", s.deployment_success_rate * 100.0),
                format!("{:.1}%", d.deployment_success_rate * 100.0),
                format!("{:+.1}%", self.success_rate_delta),
            ),
            (
                "Support Cases per Deploy",
                format!("{:.2}", s.support_intensity),
                format!("{:.2}", d.support_intensity),
                format!("{:+.2}", self.support_intensity_delta),
            ),
            (
                "Avg Frustration",
                format!("{:.1}", s.avg_frustration_score),
                format!("{:.1}", d.avg_frustration_score),
                format!("{:+.1}", self.frustration_delta),
            ),
            (
                "Avg Journey Health",
                format!("{:.0}", s.avg_journey_health),
                format!("{:.0}", d.avg_journey_health),
                format!("{:+.1}", self.journey_health_delta),
            ),
        ]
    }
}

/// Banded score starting at 50, each delta moving it up or down
fn value_add_score(success: f64, intensity: f64, frustration: f64, journey: f64) -> f64 {
    let mut score = 50.0;

    score += band(success, [(20.0, 15.0), (10.0, 10.0), (0.0, 5.0)], [(-10.0, -10.0), (0.0, -5.0)]);
    score += band(intensity, [(1.0, 12.0), (0.5, 8.0), (0.0, 4.0)], [(-0.5, -8.0), (0.0, -4.0)]);
    score += band(frustration, [(2.0, 10.0), (1.0, 6.0), (0.0, 3.0)], [(-1.0, -6.0), (0.0, -3.0)]);
    score += band(journey, [(15.0, 12.0), (5.0, 8.0), (0.0, 4.0)], [(-5.0, -8.0), (0.0, -4.0)]);

    score.clamp(0.0, 100.0)
}

/// First `gains` entry whose bound `delta` exceeds, else first `losses`
/// entry whose bound `delta` is below, else 0
fn band(delta: f64, gains: [(f64, f64); 3], losses: [(f64, f64); 2]) -> f64 {
    gains
        .iter()
        .find(|(bound, _)| delta > *bound)
        .or_else(|| losses.iter().find(|(bound, _)| delta < *bound))
        .map_or(0.0, |(_, points)| *points)
}
