//! acctlink - batch runner
//!
//! Loads the three exports, links them by order number and prints the link
//! summary followed by the product, account, use case and service views.

use std::path::PathBuf;
use std::sync::Arc;

use acctlink_common::config::AcctlinkConfig;
use acctlink_common::models::ChurnRisk;
use acctlink_engine::metrics::{AccountMetrics, ProductMetrics, ServiceComparison, UseCaseMetrics};
use acctlink_engine::{annotate, load_sources, LinkSummary, Linker, MetricsEngine, NoopAnnotator, SourceFiles};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for acctlink
#[derive(Parser, Debug)]
#[command(name = "acctlink")]
#[command(about = "Link opportunities, deployments and support cases by order number")]
#[command(version)]
struct Args {
    /// Opportunity export (JSON array)
    #[arg(long, env = "ACCTLINK_OPPORTUNITIES")]
    opportunities: Option<PathBuf>,

    /// Deployment export (JSON array)
    #[arg(long, env = "ACCTLINK_DEPLOYMENTS")]
    deployments: Option<PathBuf>,

    /// Case export (JSON array of rows tagged by record_type)
    #[arg(long, env = "ACCTLINK_CASES")]
    cases: Option<PathBuf>,

    /// Config file (overrides ACCTLINK_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reporting date for account tenure (YYYY-MM-DD, default today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the full report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

/// Everything one run produces
#[derive(Serialize)]
struct Report {
    summary: LinkSummary,
    products: Vec<ProductMetrics>,
    accounts: Vec<AccountMetrics>,
    use_cases: Vec<UseCaseMetrics>,
    service: ServiceComparison,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AcctlinkConfig::resolve(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting acctlink v{}", env!("CARGO_PKG_VERSION"));

    let files = SourceFiles {
        opportunities: args.opportunities,
        deployments: args.deployments,
        cases: args.cases,
    };
    let sources = load_sources(&files)
        .await
        .context("Failed to load source files")?;

    let dataset = Linker::new(&config.linking).link(
        sources.opportunities,
        sources.deployments,
        sources.support_cases,
    );
    let dataset = Arc::new(annotate(dataset, &NoopAnnotator));
    let summary = dataset.summary();

    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let engine = Arc::new(MetricsEngine::new(config.metrics.clone()));

    // Metric families only read the dataset; run them side by side
    let products = {
        let (engine, dataset) = (Arc::clone(&engine), Arc::clone(&dataset));
        tokio::task::spawn_blocking(move || engine.all_product_metrics(&dataset))
    };
    let accounts = {
        let (engine, dataset) = (Arc::clone(&engine), Arc::clone(&dataset));
        tokio::task::spawn_blocking(move || engine.all_account_metrics(&dataset, as_of))
    };
    let use_cases = {
        let (engine, dataset) = (Arc::clone(&engine), Arc::clone(&dataset));
        tokio::task::spawn_blocking(move || engine.all_usecase_metrics(&dataset))
    };
    let service = {
        let (engine, dataset) = (Arc::clone(&engine), Arc::clone(&dataset));
        tokio::task::spawn_blocking(move || engine.service_comparison(&dataset))
    };

    let (products, accounts, use_cases, service) =
        tokio::try_join!(products, accounts, use_cases, service)
            .context("Metrics computation failed")?;

    info!(
        "Computed metrics for {} products, {} accounts, {} use cases",
        products.len(),
        accounts.len(),
        use_cases.len()
    );

    let report = Report {
        summary,
        products,
        accounts,
        use_cases,
        service,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("{}", report.summary.render_report());

    println!("\nPRODUCTS");
    println!("{}", ProductMetrics::table_header());
    for product in &report.products {
        println!("{}", product.table_row());
    }

    println!("\nACCOUNTS");
    println!("{}", AccountMetrics::table_header());
    for account in &report.accounts {
        println!("{}", account.table_row());
    }

    let at_risk: Vec<&AccountMetrics> = report
        .accounts
        .iter()
        .filter(|a| a.is_at_risk(ChurnRisk::High))
        .collect();
    if !at_risk.is_empty() {
        println!("\nAT-RISK ACCOUNTS ({})", at_risk.len());
        for account in at_risk {
            println!(
                "  {:<24} {:<8} health {:.0}",
                account.account_name,
                account.churn_risk.label(),
                account.health_score
            );
        }
    }

    println!("\nUSE CASES");
    println!("{}", UseCaseMetrics::table_header());
    for use_case in &report.use_cases {
        println!("{}", use_case.table_row());
    }

    println!("\nSERVICE VS SELF DEPLOY");
    println!("{:<26} {:>10} {:>10} {:>10}", "Metric", "Service", "Self", "Delta");
    for (metric, service, self_deploy, delta) in report.service.table() {
        println!("{:<26} {:>10} {:>10} {:>10}", metric, service, self_deploy, delta);
    }
    println!(
        "Value-add score: {:.0} ({})",
        report.service.value_add_score, report.service.recommendation
    );
}
