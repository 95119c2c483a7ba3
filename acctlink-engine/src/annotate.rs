//! Annotation stage
//!
//! Qualitative scores come from an external text-analysis collaborator. This
//! module defines the seam it plugs into and the pass that writes its output
//! onto the linked records. Context flows as plain read-only references: a
//! deployment sees its order's opportunity, a support case sees its order's
//! deployments, and the order evaluation sees the whole order.
//!
//! The pass never touches linking keys, order membership, or orphan buckets,
//! so the dataset's structure and summary are identical before and after.

use acctlink_common::models::{
    CaseAnalysis, Deployment, DeploymentAnalysis, Opportunity, OpportunityAnalysis,
    OrderAssessment, SupportCase,
};
use tracing::info;

use crate::dataset::{LinkedDataset, Order};

/// External analyzer seam
///
/// Every method defaults to "no opinion". Returning `None` leaves whatever
/// the record already carries in place.
pub trait Annotator {
    fn annotate_opportunity(&self, _opportunity: &Opportunity) -> Option<OpportunityAnalysis> {
        None
    }

    fn annotate_deployment(
        &self,
        _deployment: &Deployment,
        _opportunity: Option<&Opportunity>,
    ) -> Option<DeploymentAnalysis> {
        None
    }

    fn annotate_case(
        &self,
        _case: &SupportCase,
        _deployments: &[Deployment],
    ) -> Option<CaseAnalysis> {
        None
    }

    /// Called after the order's records have been annotated
    fn evaluate_order(&self, _order: &Order) -> Option<OrderAssessment> {
        None
    }
}

/// Annotator that attaches nothing (analysis skipped)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnnotator;

impl Annotator for NoopAnnotator {}

/// Counts of annotations written by one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    pub opportunities: usize,
    pub deployments: usize,
    pub support_cases: usize,
    pub orders: usize,
}

/// Run `annotator` over every record and order, returning the enriched dataset
pub fn annotate<A: Annotator + ?Sized>(dataset: LinkedDataset, annotator: &A) -> LinkedDataset {
    annotate_with_stats(dataset, annotator).0
}

/// Same as [`annotate`], also reporting how many annotations were attached
pub fn annotate_with_stats<A: Annotator + ?Sized>(
    mut dataset: LinkedDataset,
    annotator: &A,
) -> (LinkedDataset, AnnotationStats) {
    let mut stats = AnnotationStats::default();

    for order in &mut dataset.orders {
        annotate_order_records(order, annotator, &mut stats);
        if let Some(assessment) = annotator.evaluate_order(order) {
            order.assessment = Some(assessment);
            stats.orders += 1;
        }
    }

    for opportunity in &mut dataset.orphan_opportunities {
        apply_opportunity(opportunity, annotator, &mut stats);
    }
    for deployment in &mut dataset.orphan_deployments {
        if let Some(analysis) = annotator.annotate_deployment(deployment, None) {
            deployment.analysis = Some(analysis);
            stats.deployments += 1;
        }
    }
    for case in &mut dataset.orphan_cases {
        if let Some(analysis) = annotator.annotate_case(case, &[]) {
            case.analysis = Some(analysis);
            stats.support_cases += 1;
        }
    }

    info!(
        "Annotation pass attached {} opportunity, {} deployment, {} case, {} order results",
        stats.opportunities, stats.deployments, stats.support_cases, stats.orders
    );
    (dataset, stats)
}

fn annotate_order_records<A: Annotator + ?Sized>(
    order: &mut Order,
    annotator: &A,
    stats: &mut AnnotationStats,
) {
    if let Some(opportunity) = order.opportunity.as_mut() {
        apply_opportunity(opportunity, annotator, stats);
    }
    for opportunity in &mut order.conflicting_opportunities {
        apply_opportunity(opportunity, annotator, stats);
    }

    let context = order.opportunity.as_ref();
    for deployment in &mut order.deployments {
        if let Some(analysis) = annotator.annotate_deployment(deployment, context) {
            deployment.analysis = Some(analysis);
            stats.deployments += 1;
        }
    }

    let deployments = &order.deployments;
    for case in &mut order.support_cases {
        if let Some(analysis) = annotator.annotate_case(case, deployments) {
            case.analysis = Some(analysis);
            stats.support_cases += 1;
        }
    }
}

fn apply_opportunity<A: Annotator + ?Sized>(
    opportunity: &mut Opportunity,
    annotator: &A,
    stats: &mut AnnotationStats,
) {
    if let Some(analysis) = annotator.annotate_opportunity(opportunity) {
        opportunity.analysis = Some(analysis);
        stats.opportunities += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::link;
    use acctlink_common::models::{ChurnRisk, ExpectationMatch};

    /// Scores deployments by whether an opportunity was in context and
    /// counts the deployments each case could see.
    struct ContextProbe;

    impl Annotator for ContextProbe {
        fn annotate_deployment(
            &self,
            _deployment: &Deployment,
            opportunity: Option<&Opportunity>,
        ) -> Option<DeploymentAnalysis> {
            Some(DeploymentAnalysis {
                deployment_score: if opportunity.is_some() { 90 } else { 10 },
                is_service_deploy: true,
                expectation_match: ExpectationMatch::Met,
            })
        }

        fn annotate_case(&self, _case: &SupportCase, deployments: &[Deployment]) -> Option<CaseAnalysis> {
            Some(CaseAnalysis {
                frustration_score: deployments.len() as f64,
                ..Default::default()
            })
        }

        fn evaluate_order(&self, order: &Order) -> Option<OrderAssessment> {
            // Record annotations are already in place when orders are evaluated
            let all_scored = order.deployments().iter().all(|d| d.analysis.is_some());
            Some(OrderAssessment {
                churn_risk: Some(if all_scored { ChurnRisk::Low } else { ChurnRisk::Critical }),
                ..Default::default()
            })
        }
    }

    fn fixture() -> LinkedDataset {
        link(
            vec![Opportunity {
                order_number: "A".to_string(),
                ..Default::default()
            }],
            vec![
                Deployment {
                    order_number: "A".to_string(),
                    ..Default::default()
                },
                Deployment {
                    order_number: "A".to_string(),
                    ..Default::default()
                },
                Deployment {
                    order_number: "B".to_string(),
                    ..Default::default()
                },
                Deployment::default(),
            ],
            vec![SupportCase {
                order_number: "A".to_string(),
                ..Default::default()
            }],
        )
    }

    #[test]
    fn test_noop_leaves_dataset_unchanged() {
        let before = fixture();
        let after = annotate(before.clone(), &NoopAnnotator);
        assert_eq!(before, after);
    }

    #[test]
    fn test_context_is_passed_per_order() {
        let (dataset, stats) = annotate_with_stats(fixture(), &ContextProbe);

        let a = dataset.order("A").unwrap();
        assert!(a.deployments().iter().all(|d| d.deployment_score() == Some(90)));
        assert_eq!(a.support_cases()[0].frustration_score(), Some(2.0));
        assert_eq!(a.assessment().unwrap().churn_risk, Some(ChurnRisk::Low));

        let b = dataset.order("B").unwrap();
        assert_eq!(b.deployments()[0].deployment_score(), Some(10));

        assert_eq!(dataset.orphan_deployments()[0].deployment_score(), Some(10));
        assert_eq!(stats.deployments, 4);
        assert_eq!(stats.support_cases, 1);
        assert_eq!(stats.orders, 2);
    }

    #[test]
    fn test_structure_and_summary_unchanged() {
        let before = fixture();
        let summary = before.summary();
        let keys: Vec<String> = before.orders().iter().map(|o| o.key().to_string()).collect();

        let after = annotate(before, &ContextProbe);
        assert_eq!(after.summary(), summary);
        let after_keys: Vec<String> = after.orders().iter().map(|o| o.key().to_string()).collect();
        assert_eq!(after_keys, keys);
    }
}
