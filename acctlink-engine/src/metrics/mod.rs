//! Metrics aggregation engine
//!
//! Every view filters the orders of one [`LinkedDataset`] down to a
//! partition and folds them into a [`MetricsRecord`]. The dataset is only
//! read, so any number of computations can run over a shared reference.
//!
//! # Attribution
//!
//! Each order has at most one partition value per [`Dimension`]:
//! - Product: [`Order::product_series`]; `Unknown` orders are in no product
//!   partition
//! - Account: [`Order::account_name`]; orders without one are in no account
//!   partition
//! - Use case: [`Order::use_case`]; always present (`Unknown` is a partition)
//!
//! Summing a count field over [`MetricsEngine::compute_all`] for a dimension
//! equals the same field of [`MetricsEngine::attributed_total`], and when
//! attribution is total on two dimensions their sums agree.

pub mod account;
pub mod product;
pub mod record;
pub mod scoring;
pub mod service;
pub mod usecase;

use std::collections::HashMap;
use std::fmt;

use acctlink_common::config::MetricsConfig;
use acctlink_common::models::{ChurnRisk, ProductSeries, UseCaseCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{LinkedDataset, Order};

pub use account::AccountMetrics;
pub use product::ProductMetrics;
pub use record::{ratio, CountTotals, MetricsRecord};
pub use service::{ServiceComparison, ServiceMetrics, ServiceRecommendation};
pub use usecase::{ProductPerformance, UseCaseMetrics};

use record::RecordBuilder;

/// Partitioning axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Product,
    Account,
    UseCase,
}

/// One value of a [`Dimension`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    Product(ProductSeries),
    Account(String),
    UseCase(UseCaseCategory),
}

impl Partition {
    /// Partition value `order` is attributed to along `dimension`
    pub fn of(order: &Order, dimension: Dimension) -> Option<Partition> {
        match dimension {
            Dimension::Product => {
                let series = order.product_series();
                series.is_known().then_some(Partition::Product(series))
            }
            Dimension::Account => order
                .account_name()
                .map(|name| Partition::Account(name.to_string())),
            Dimension::UseCase => Some(Partition::UseCase(order.use_case())),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Partition::Product(_) => Dimension::Product,
            Partition::Account(_) => Dimension::Account,
            Partition::UseCase(_) => Dimension::UseCase,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Partition::Product(series) => {
                series.is_known() && order.product_series() == *series
            }
            Partition::Account(name) => order.account_name() == Some(name.trim()),
            Partition::UseCase(category) => order.use_case() == *category,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Product(series) => write!(f, "{}", series.label()),
            Partition::Account(name) => write!(f, "{}", name),
            Partition::UseCase(category) => write!(f, "{}", category.label()),
        }
    }
}

/// Metrics views over a linked dataset
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Metrics for one partition; a partition with no orders is all zeros
    pub fn compute(&self, dataset: &LinkedDataset, partition: &Partition) -> MetricsRecord {
        let mut builder = RecordBuilder::new(&self.config);
        for order in dataset.orders().iter().filter(|o| partition.matches(o)) {
            builder.add_order(order);
        }
        builder.finish()
    }

    /// Every non-empty partition of `dimension`
    ///
    /// Products and use cases come in their declaration order, accounts in
    /// first-appearance order.
    pub fn compute_all(
        &self,
        dataset: &LinkedDataset,
        dimension: Dimension,
    ) -> Vec<(Partition, MetricsRecord)> {
        let mut partitions: Vec<(Partition, RecordBuilder<'_>)> = Vec::new();
        let mut index: HashMap<Partition, usize> = HashMap::new();

        for order in dataset.orders() {
            let Some(partition) = Partition::of(order, dimension) else {
                continue;
            };
            let i = match index.get(&partition) {
                Some(&i) => i,
                None => {
                    index.insert(partition.clone(), partitions.len());
                    partitions.push((partition, RecordBuilder::new(&self.config)));
                    partitions.len() - 1
                }
            };
            partitions[i].1.add_order(order);
        }

        let mut results: Vec<(Partition, MetricsRecord)> = partitions
            .into_iter()
            .map(|(partition, builder)| (partition, builder.finish()))
            .collect();

        match dimension {
            Dimension::Product => results.sort_by_key(|(p, _)| match p {
                Partition::Product(series) => ProductSeries::ALL.iter().position(|s| s == series),
                _ => None,
            }),
            Dimension::UseCase => results.sort_by_key(|(p, _)| match p {
                Partition::UseCase(category) => {
                    UseCaseCategory::ALL.iter().position(|c| c == category)
                }
                _ => None,
            }),
            Dimension::Account => {}
        }

        debug!("Computed {} {:?} partitions", results.len(), dimension);
        results
    }

    /// Record over every order attributed along `dimension`
    pub fn attributed_total(&self, dataset: &LinkedDataset, dimension: Dimension) -> MetricsRecord {
        let mut builder = RecordBuilder::new(&self.config);
        for order in dataset
            .orders()
            .iter()
            .filter(|o| Partition::of(o, dimension).is_some())
        {
            builder.add_order(order);
        }
        builder.finish()
    }

    /// Record over every order in the dataset
    pub fn overall(&self, dataset: &LinkedDataset) -> MetricsRecord {
        let mut builder = RecordBuilder::new(&self.config);
        for order in dataset.orders() {
            builder.add_order(order);
        }
        builder.finish()
    }

    pub fn product_metrics(&self, dataset: &LinkedDataset, series: ProductSeries) -> ProductMetrics {
        let record = self.compute(dataset, &Partition::Product(series));
        ProductMetrics::new(series, record)
    }

    pub fn all_product_metrics(&self, dataset: &LinkedDataset) -> Vec<ProductMetrics> {
        self.compute_all(dataset, Dimension::Product)
            .into_iter()
            .filter_map(|(partition, record)| match partition {
                Partition::Product(series) => Some(ProductMetrics::new(series, record)),
                _ => None,
            })
            .collect()
    }

    /// Account view; tenure is measured up to `as_of`
    pub fn account_metrics(
        &self,
        dataset: &LinkedDataset,
        account: &str,
        as_of: NaiveDate,
    ) -> AccountMetrics {
        let account = account.trim();
        let orders: Vec<&Order> = dataset.orders_by_account(account).collect();
        AccountMetrics::build(account, &orders, &self.config, as_of)
    }

    pub fn all_account_metrics(&self, dataset: &LinkedDataset, as_of: NaiveDate) -> Vec<AccountMetrics> {
        dataset
            .accounts()
            .into_iter()
            .map(|account| self.account_metrics(dataset, account, as_of))
            .collect()
    }

    /// Accounts whose churn risk is at least `min_risk`, in account order
    pub fn at_risk_accounts(
        &self,
        dataset: &LinkedDataset,
        as_of: NaiveDate,
        min_risk: ChurnRisk,
    ) -> Vec<AccountMetrics> {
        self.all_account_metrics(dataset, as_of)
            .into_iter()
            .filter(|account| account.is_at_risk(min_risk))
            .collect()
    }

    pub fn usecase_metrics(&self, dataset: &LinkedDataset, category: UseCaseCategory) -> UseCaseMetrics {
        let orders: Vec<&Order> = dataset
            .orders()
            .iter()
            .filter(|o| o.use_case() == category)
            .collect();
        UseCaseMetrics::build(category, &orders, &self.config)
    }

    pub fn all_usecase_metrics(&self, dataset: &LinkedDataset) -> Vec<UseCaseMetrics> {
        UseCaseCategory::ALL
            .iter()
            .map(|&category| self.usecase_metrics(dataset, category))
            .filter(|m| !m.record.is_empty())
            .collect()
    }

    /// Service-deploy vs self-deploy outcomes
    pub fn service_comparison(&self, dataset: &LinkedDataset) -> ServiceComparison {
        ServiceComparison::build(dataset, &self.config)
    }

    /// Journey health of one order (see [`scoring::journey_health`])
    pub fn journey_health(&self, order: &Order) -> Option<f64> {
        scoring::journey_health(order, &self.config.journey_weights)
    }

    pub fn churn_risk(&self, order: &Order) -> Option<ChurnRisk> {
        scoring::order_churn_risk(order, &self.config.journey_weights)
    }
}

/// Metrics for one partition with the default configuration
pub fn compute_metrics(dataset: &LinkedDataset, partition: &Partition) -> MetricsRecord {
    MetricsEngine::default().compute(dataset, partition)
}
