//! Cross-layer composite scores
//!
//! These combine annotation-layer values already attached to the records.
//! Nothing here produces a qualitative score of its own: when the inputs are
//! missing the result is `None` (per order) or a neutral component (per
//! account).

use acctlink_common::config::JourneyWeights;
use acctlink_common::models::{ChurnRisk, ExpectationMatch, Severity};

use crate::dataset::Order;
use crate::metrics::record::{ratio, MetricsRecord};

/// Points deducted from the support signal per S1 case
const S1_PENALTY: f64 = 15.0;

/// Points for an expectation-match verdict, `None` when no verdict was given
pub fn expectation_points(verdict: ExpectationMatch) -> Option<f64> {
    match verdict {
        ExpectationMatch::Met => Some(100.0),
        ExpectationMatch::PartiallyMet => Some(60.0),
        ExpectationMatch::NotMet => Some(20.0),
        ExpectationMatch::Unknown => None,
    }
}

/// Journey health (0-100) of one order
///
/// An assessment value attached by the annotation pass wins. Otherwise the
/// weighted mean of whichever components have data:
/// - expectation: mean verdict points over annotated deployments
/// - deployment: mean deployment score
/// - support: 100 - 10 x mean frustration - 15 per S1 case, floored at 0
///
/// Weights of absent components are dropped and the rest renormalized.
pub fn journey_health(order: &Order, weights: &JourneyWeights) -> Option<f64> {
    if let Some(score) = order.assessment().and_then(|a| a.journey_health_score) {
        return Some(f64::from(score.min(100)));
    }

    let expectation = mean(
        order
            .deployments()
            .iter()
            .filter_map(|d| d.analysis.as_ref())
            .filter_map(|a| expectation_points(a.expectation_match)),
    );
    let deployment = mean(
        order
            .deployments()
            .iter()
            .filter_map(|d| d.deployment_score())
            .map(f64::from),
    );
    let support = support_signal(order);

    let components = [
        (expectation, weights.expectation),
        (deployment, weights.deployment),
        (support, weights.support),
    ];

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (value, weight) in components {
        if let Some(value) = value {
            weighted += value * weight;
            total_weight += weight;
        }
    }

    if total_weight > 0.0 {
        Some((weighted / total_weight).clamp(0.0, 100.0))
    } else {
        None
    }
}

/// Support component of journey health; `None` until a case is analyzed
fn support_signal(order: &Order) -> Option<f64> {
    let frustration = mean(order.support_cases().iter().filter_map(|c| c.frustration_score()))?;
    let s1_cases = order
        .support_cases()
        .iter()
        .filter(|c| c.severity == Severity::S1)
        .count();
    Some((100.0 - 10.0 * frustration - S1_PENALTY * s1_cases as f64).max(0.0))
}

/// Churn band for a journey health score
pub fn churn_from_health(health: f64) -> ChurnRisk {
    if health < 30.0 {
        ChurnRisk::Critical
    } else if health < 50.0 {
        ChurnRisk::High
    } else if health < 70.0 {
        ChurnRisk::Medium
    } else {
        ChurnRisk::Low
    }
}

/// Churn risk of one order: attached assessment, else derived from health
pub fn order_churn_risk(order: &Order, weights: &JourneyWeights) -> Option<ChurnRisk> {
    order
        .assessment()
        .and_then(|a| a.churn_risk)
        .or_else(|| journey_health(order, weights).map(churn_from_health))
}

/// Share of scored deployments that succeeded
fn scored_success_rate(record: &MetricsRecord) -> f64 {
    ratio(
        record.successful_deployments as f64,
        record.scored_deployments as f64,
    )
}

/// Account health score (0-100, higher = healthier)
///
/// Four 25-point components (deployment success, support intensity,
/// frustration, severe-case share) with escalation and journey adjustments.
pub fn account_health(record: &MetricsRecord) -> f64 {
    let mut score = 0.0;

    // Deployment success
    score += if record.scored_deployments > 0 {
        scored_success_rate(record) * 25.0
    } else {
        15.0
    };

    // Support intensity
    score += if record.units_deployed > 0 {
        match record.support_intensity {
            i if i <= 0.5 => 25.0,
            i if i <= 1.0 => 20.0,
            i if i <= 2.0 => 15.0,
            i if i <= 3.0 => 10.0,
            _ => 5.0,
        }
    } else {
        15.0
    };

    // Frustration
    score += match record.avg_frustration_score {
        f if f <= 3.0 => 25.0,
        f if f <= 5.0 => 20.0,
        f if f <= 6.0 => 15.0,
        f if f <= 7.0 => 10.0,
        f if f <= 8.0 => 5.0,
        _ => 0.0,
    };

    // Severe-case share
    let severe = ratio(
        (record.s1_cases + record.s2_cases) as f64,
        record.support_cases.max(1) as f64,
    );
    score += match severe {
        s if s <= 0.1 => 25.0,
        s if s <= 0.2 => 20.0,
        s if s <= 0.3 => 15.0,
        s if s <= 0.5 => 10.0,
        _ => 5.0,
    };

    if record.escalations > 3 {
        score -= 10.0;
    } else if record.escalations > 1 {
        score -= 5.0;
    }

    if record.journey_scored_orders > 0 {
        if record.avg_journey_health > 70.0 {
            score += 5.0;
        } else if record.avg_journey_health < 40.0 {
            score -= 5.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Point-based account churn classification
pub fn account_churn_risk(record: &MetricsRecord, health: f64) -> ChurnRisk {
    let mut points = 0u32;

    points += match record.avg_frustration_score {
        f if f >= 8.0 => 3,
        f if f >= 6.0 => 2,
        f if f >= 5.0 => 1,
        _ => 0,
    };

    points += match record.s1_cases {
        n if n >= 3 => 3,
        n if n >= 1 => 1,
        _ => 0,
    };

    points += match record.escalations {
        n if n >= 3 => 2,
        n if n >= 1 => 1,
        _ => 0,
    };

    if record.scored_deployments > 0 && scored_success_rate(record) < 0.5 {
        points += 2;
    }

    if record.units_deployed > 0 {
        if record.support_intensity > 3.0 {
            points += 2;
        } else if record.support_intensity > 2.0 {
            points += 1;
        }
    }

    if health < 30.0 {
        points += 2;
    } else if health < 50.0 {
        points += 1;
    }

    points += match record.high_churn_risk_orders {
        n if n >= 2 => 2,
        1 => 1,
        _ => 0,
    };

    match points {
        p if p >= 8 => ChurnRisk::Critical,
        p if p >= 5 => ChurnRisk::High,
        p if p >= 2 => ChurnRisk::Medium,
        _ => ChurnRisk::Low,
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
