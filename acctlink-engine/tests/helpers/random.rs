//! Seeded random source collections
//!
//! Keys are drawn from a small pool (with prefix, zero-padding and case
//! variants of the same number) so that collisions, duplicates and orphans
//! all occur.

use acctlink_common::models::{
    CaseAnalysis, Deployment, DeploymentAnalysis, Opportunity, ProductSeries, Severity, SupportCase,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ACCOUNTS: [&str; 5] = ["Acme", "Globex", "Initech", "Umbrella", ""];
const PRODUCTS: [&str; 6] = ["F100", "M50", "H400", "R10", "Widget", ""];
const USE_CASES: [&str; 6] = ["backup", "VMware farm", "SQL analytics", "media edit", "misc", ""];
const SERIES: [ProductSeries; 5] = [
    ProductSeries::F,
    ProductSeries::M,
    ProductSeries::H,
    ProductSeries::R,
    ProductSeries::Unknown,
];

pub struct RandomSources {
    pub opportunities: Vec<Opportunity>,
    pub deployments: Vec<Deployment>,
    pub support_cases: Vec<SupportCase>,
}

fn random_key(rng: &mut StdRng) -> String {
    if rng.gen_bool(0.1) {
        return ["", "   ", "#", "ORD-"][rng.gen_range(0..4)].to_string();
    }
    let n: u32 = rng.gen_range(1..=25);
    match rng.gen_range(0..4) {
        0 => n.to_string(),
        1 => format!("ORD-{:05}", n),
        2 => format!(" #{} ", n),
        _ => format!("order{}", n),
    }
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

pub fn random_sources(seed: u64) -> RandomSources {
    let mut rng = StdRng::seed_from_u64(seed);

    let opportunities = (0..rng.gen_range(0..30))
        .map(|i| Opportunity {
            order_number: random_key(&mut rng),
            opportunity_name: format!("opp-{}", i),
            account_name: pick(&mut rng, &ACCOUNTS).to_string(),
            primary_product: pick(&mut rng, &PRODUCTS).to_string(),
            primary_use_case: pick(&mut rng, &USE_CASES).to_string(),
            amount: f64::from(rng.gen_range(1..100u32)) * 1000.0,
            ..Default::default()
        })
        .collect();

    let deployments = (0..rng.gen_range(0..40))
        .map(|i| Deployment {
            order_number: random_key(&mut rng),
            case_number: format!("dep-{}", i),
            account_name: pick(&mut rng, &ACCOUNTS).to_string(),
            product_series: SERIES[rng.gen_range(0..SERIES.len())],
            age_days: rng.gen_range(0..90),
            analysis: rng.gen_bool(0.7).then(|| DeploymentAnalysis {
                deployment_score: rng.gen_range(0..=100),
                is_service_deploy: rng.gen_bool(0.5),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    let support_cases = (0..rng.gen_range(0..40))
        .map(|i| SupportCase {
            order_number: random_key(&mut rng),
            case_number: format!("case-{}", i),
            account_name: pick(&mut rng, &ACCOUNTS).to_string(),
            product_series: SERIES[rng.gen_range(0..SERIES.len())],
            severity: [Severity::S1, Severity::S2, Severity::S3, Severity::S4][rng.gen_range(0..4)],
            is_repeat: rng.gen_bool(0.2),
            age_days: rng.gen_range(0..60),
            analysis: rng.gen_bool(0.6).then(|| CaseAnalysis {
                frustration_score: f64::from(rng.gen_range(0..=10u8)),
                escalation_detected: rng.gen_bool(0.3),
                is_hardware_failure: rng.gen_bool(0.2),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    RandomSources {
        opportunities,
        deployments,
        support_cases,
    }
}
