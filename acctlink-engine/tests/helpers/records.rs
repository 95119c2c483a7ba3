//! Minimal record builders

use acctlink_common::models::{
    CaseAnalysis, Deployment, DeploymentAnalysis, ExpectationMatch, Opportunity, ProductSeries,
    Severity, SupportCase,
};

pub fn opportunity(order: &str, account: &str, product: &str, use_case: &str) -> Opportunity {
    Opportunity {
        order_number: order.to_string(),
        opportunity_name: format!("Deal {}", order),
        account_name: account.to_string(),
        primary_product: product.to_string(),
        primary_use_case: use_case.to_string(),
        amount: 10_000.0,
        ..Default::default()
    }
}

pub fn deployment(order: &str, case_number: &str) -> Deployment {
    Deployment {
        order_number: order.to_string(),
        case_number: case_number.to_string(),
        ..Default::default()
    }
}

pub fn scored_deployment(order: &str, series: ProductSeries, score: u8, service: bool) -> Deployment {
    Deployment {
        order_number: order.to_string(),
        case_number: format!("D-{}-{}", order, score),
        product_series: series,
        analysis: Some(DeploymentAnalysis {
            deployment_score: score,
            is_service_deploy: service,
            expectation_match: ExpectationMatch::Met,
        }),
        ..Default::default()
    }
}

pub fn case(order: &str, case_number: &str) -> SupportCase {
    SupportCase {
        order_number: order.to_string(),
        case_number: case_number.to_string(),
        ..Default::default()
    }
}

pub fn analyzed_case(order: &str, severity: Severity, frustration: f64, escalated: bool) -> SupportCase {
    SupportCase {
        order_number: order.to_string(),
        case_number: format!("C-{}", order),
        severity,
        analysis: Some(CaseAnalysis {
            frustration_score: frustration,
            escalation_detected: escalated,
            ..Default::default()
        }),
        ..Default::default()
    }
}
