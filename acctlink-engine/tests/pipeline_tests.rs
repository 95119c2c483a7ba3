//! End-to-end pipeline tests over the JSON fixtures

use std::path::PathBuf;

use acctlink_common::config::AcctlinkConfig;
use acctlink_common::models::{ProductSeries, UseCaseCategory};
use acctlink_engine::{annotate, load_sources, Linker, MetricsEngine, NoopAnnotator, SourceFiles};
use chrono::NaiveDate;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_files() -> SourceFiles {
    SourceFiles {
        opportunities: Some(fixture("opportunities.json")),
        deployments: None,
        cases: Some(fixture("cases.json")),
    }
}

#[tokio::test]
async fn test_fixture_pipeline() {
    let config = AcctlinkConfig::default();
    let sources = load_sources(&fixture_files()).await.unwrap();
    assert_eq!(sources.opportunities.len(), 4);
    assert_eq!(sources.deployments.len(), 2);
    assert_eq!(sources.support_cases.len(), 3);

    let dataset = Linker::new(&config.linking).link(
        sources.opportunities,
        sources.deployments,
        sources.support_cases,
    );
    let dataset = annotate(dataset, &NoopAnnotator);

    let summary = dataset.summary();
    assert_eq!(summary.total_orders, 4);
    assert_eq!(summary.orders_with_opportunity, 3);
    assert_eq!(summary.orders_with_deployment, 2);
    assert_eq!(summary.orders_with_support, 2);
    assert_eq!(summary.fully_linked_orders, 1);
    assert_eq!(summary.orphan_opportunities, 1);
    assert_eq!(summary.orphan_cases, 1);

    let order = dataset.order("ORD-00101").unwrap();
    assert_eq!(order.key(), "101");
    assert_eq!(order.account_name(), Some("Acme Studios"));
    assert_eq!(order.product_series(), ProductSeries::H);
    assert_eq!(order.use_case(), UseCaseCategory::MediaEntertainment);
    assert_eq!(
        dataset.order("103").unwrap().use_case(),
        UseCaseCategory::Virtualization
    );

    let engine = MetricsEngine::new(config.metrics.clone());
    let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let acme = engine.account_metrics(&dataset, "Acme Studios", as_of);
    assert_eq!(acme.record.units_deployed, 1);
    assert_eq!(acme.record.successful_deployments, 1);
    assert_eq!(acme.record.escalations, 1);
    assert_eq!(acme.record.open_cases, 1);
    assert_eq!(acme.tenure_days, Some(320));

    let comparison = engine.service_comparison(&dataset);
    assert_eq!(comparison.service.record.units_deployed, 1);
    assert_eq!(comparison.self_deploy.record.units_deployed, 0);
}

#[tokio::test]
async fn test_trim_only_keys_split_orders() {
    let mut config = AcctlinkConfig::default();
    config.linking.strip_prefixes.clear();
    config.linking.strip_leading_zeros = false;

    let sources = load_sources(&fixture_files()).await.unwrap();
    let dataset = Linker::new(&config.linking).link(
        sources.opportunities,
        sources.deployments,
        sources.support_cases,
    );

    // "ORD-00101", "101" and "ORD-101" no longer meet
    assert!(dataset.order("ORD-00101").is_some());
    assert!(!dataset.order("101").unwrap().has_opportunity());
    assert!(dataset.summary().total_orders > 4);
}
