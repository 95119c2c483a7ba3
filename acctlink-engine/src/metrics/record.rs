//! Shared metrics record and its accumulator
//!
//! Every derived ratio is computed once in [`RecordBuilder::finish`] from the
//! accumulated counts. Division by zero yields 0.0, never NaN.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Add;

use acctlink_common::config::MetricsConfig;
use acctlink_common::models::{Deployment, Severity};
use serde::{Deserialize, Serialize};

use crate::dataset::Order;
use crate::metrics::scoring;

/// Aggregated statistics for one partition of orders
///
/// Rates are fractions in `0.0..=1.0`; averages are plain means over the
/// records that carried the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsRecord {
    // Volume
    pub orders: usize,
    pub unique_accounts: usize,

    // Sales
    pub units_sold: usize,
    pub total_revenue: f64,
    pub avg_deal_size: f64,

    // Deployment
    pub units_deployed: usize,
    pub scored_deployments: usize,
    pub successful_deployments: usize,
    /// Successful deployments / units deployed
    pub deployment_success_rate: f64,
    pub avg_deployment_score: f64,
    pub avg_deployment_days: f64,
    pub service_deploys: usize,
    pub self_deploys: usize,

    // Support
    pub support_cases: usize,
    /// Support cases / units deployed
    pub support_intensity: f64,
    pub open_cases: usize,
    pub s1_cases: usize,
    pub s2_cases: usize,
    pub repeat_issues: usize,
    pub repeat_issue_rate: f64,
    pub escalations: usize,
    pub escalation_rate: f64,
    /// Mean case age, the time-to-resolution proxy
    pub avg_case_age_days: f64,
    pub avg_frustration_score: f64,
    pub max_frustration_score: f64,
    pub hardware_failures: usize,
    /// Hardware failures / units deployed
    pub hardware_failure_rate: f64,
    pub performance_issues: usize,
    pub configuration_issues: usize,
    pub deployment_related_issues: usize,
    /// Case reason -> count ("Unknown" for blank reasons)
    pub issue_categories: BTreeMap<String, usize>,

    // Journey
    pub fully_linked_orders: usize,
    pub journey_scored_orders: usize,
    pub avg_journey_health: f64,
    pub high_churn_risk_orders: usize,
}

impl MetricsRecord {
    /// No order matched the partition
    pub fn is_empty(&self) -> bool {
        self.orders == 0
    }

    /// Count-type fields, the ones that must add up across partitionings
    pub fn counts(&self) -> CountTotals {
        CountTotals {
            orders: self.orders,
            units_sold: self.units_sold,
            units_deployed: self.units_deployed,
            support_cases: self.support_cases,
            repeat_issues: self.repeat_issues,
            escalations: self.escalations,
        }
    }

    /// Issue categories by descending count, ties by name, at most `limit`
    pub fn top_issues(&self, limit: usize) -> Vec<String> {
        let mut issues: Vec<(&String, &usize)> = self.issue_categories.iter().collect();
        issues.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        issues
            .into_iter()
            .take(limit)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Additive count fields of a [`MetricsRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountTotals {
    pub orders: usize,
    pub units_sold: usize,
    pub units_deployed: usize,
    pub support_cases: usize,
    pub repeat_issues: usize,
    pub escalations: usize,
}

impl Add for CountTotals {
    type Output = CountTotals;

    fn add(self, rhs: CountTotals) -> CountTotals {
        CountTotals {
            orders: self.orders + rhs.orders,
            units_sold: self.units_sold + rhs.units_sold,
            units_deployed: self.units_deployed + rhs.units_deployed,
            support_cases: self.support_cases + rhs.support_cases,
            repeat_issues: self.repeat_issues + rhs.repeat_issues,
            escalations: self.escalations + rhs.escalations,
        }
    }
}

impl std::iter::Sum for CountTotals {
    fn sum<I: Iterator<Item = CountTotals>>(iter: I) -> Self {
        iter.fold(CountTotals::default(), Add::add)
    }
}

/// Accumulates orders into a [`MetricsRecord`]
pub(crate) struct RecordBuilder<'a> {
    config: &'a MetricsConfig,
    record: MetricsRecord,
    accounts: BTreeSet<String>,
    deployment_score_sum: f64,
    deployment_days_sum: f64,
    case_age_sum: f64,
    frustration_sum: f64,
    frustration_count: usize,
    journey_sum: f64,
}

impl<'a> RecordBuilder<'a> {
    pub(crate) fn new(config: &'a MetricsConfig) -> Self {
        Self {
            config,
            record: MetricsRecord::default(),
            accounts: BTreeSet::new(),
            deployment_score_sum: 0.0,
            deployment_days_sum: 0.0,
            case_age_sum: 0.0,
            frustration_sum: 0.0,
            frustration_count: 0,
            journey_sum: 0.0,
        }
    }

    /// Add an order with all of its deployments
    pub(crate) fn add_order(&mut self, order: &Order) {
        self.add_order_with(order, |_| true);
    }

    /// Add an order, counting only the deployments accepted by `include`
    pub(crate) fn add_order_with<F>(&mut self, order: &Order, include: F)
    where
        F: Fn(&Deployment) -> bool,
    {
        let r = &mut self.record;
        r.orders += 1;

        if let Some(account) = order.account_name() {
            self.accounts.insert(account.to_string());
        }

        if let Some(opportunity) = order.opportunity() {
            r.units_sold += 1;
            r.total_revenue += opportunity.amount;
        }

        for deployment in order.deployments().iter().filter(|&d| include(d)) {
            r.units_deployed += 1;
            self.deployment_days_sum += f64::from(deployment.age_days);

            match deployment.is_service_deploy() {
                Some(true) => r.service_deploys += 1,
                Some(false) => r.self_deploys += 1,
                None => {}
            }

            if let Some(score) = deployment.deployment_score() {
                r.scored_deployments += 1;
                self.deployment_score_sum += f64::from(score);
                if score > self.config.deployment_success_threshold {
                    r.successful_deployments += 1;
                }
            }
        }

        for case in order.support_cases() {
            r.support_cases += 1;
            self.case_age_sum += f64::from(case.age_days);

            if case.is_open() {
                r.open_cases += 1;
            }
            match case.severity {
                Severity::S1 => r.s1_cases += 1,
                Severity::S2 => r.s2_cases += 1,
                _ => {}
            }
            if case.is_repeat {
                r.repeat_issues += 1;
            }

            let reason = case.case_reason.trim();
            let reason = if reason.is_empty() { "Unknown" } else { reason };
            *r.issue_categories.entry(reason.to_string()).or_insert(0) += 1;

            if case.escalation_detected() {
                r.escalations += 1;
            }

            if let Some(analysis) = &case.analysis {
                self.frustration_sum += analysis.frustration_score;
                self.frustration_count += 1;
                r.max_frustration_score = r.max_frustration_score.max(analysis.frustration_score);

                if analysis.is_hardware_failure {
                    r.hardware_failures += 1;
                }
                if analysis.is_performance_issue {
                    r.performance_issues += 1;
                }
                if analysis.is_configuration_issue {
                    r.configuration_issues += 1;
                }
                if analysis.deployment_related == Some(true) {
                    r.deployment_related_issues += 1;
                }
            }
        }

        if order.is_fully_linked() {
            r.fully_linked_orders += 1;
        }

        let weights = &self.config.journey_weights;
        if let Some(health) = scoring::journey_health(order, weights) {
            r.journey_scored_orders += 1;
            self.journey_sum += health;
        }
        if scoring::order_churn_risk(order, weights).is_some_and(|risk| risk.is_high()) {
            r.high_churn_risk_orders += 1;
        }
    }

    pub(crate) fn finish(self) -> MetricsRecord {
        let mut r = self.record;

        r.unique_accounts = self.accounts.len();
        r.avg_deal_size = ratio(r.total_revenue, r.units_sold as f64);

        let deployed = r.units_deployed as f64;
        r.deployment_success_rate = ratio(r.successful_deployments as f64, deployed);
        r.avg_deployment_score = ratio(self.deployment_score_sum, r.scored_deployments as f64);
        r.avg_deployment_days = ratio(self.deployment_days_sum, deployed);
        r.support_intensity = ratio(r.support_cases as f64, deployed);
        r.hardware_failure_rate = ratio(r.hardware_failures as f64, deployed);

        let cases = r.support_cases as f64;
        r.repeat_issue_rate = ratio(r.repeat_issues as f64, cases);
        r.escalation_rate = ratio(r.escalations as f64, cases);
        r.avg_case_age_days = ratio(self.case_age_sum, cases);
        r.avg_frustration_score = ratio(self.frustration_sum, self.frustration_count as f64);

        r.avg_journey_health = ratio(self.journey_sum, r.journey_scored_orders as f64);
        r
    }
}

/// `num / denom`, or 0.0 when `denom` is 0
pub fn ratio(num: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}
