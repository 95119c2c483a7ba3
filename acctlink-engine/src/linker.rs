//! Linking engine
//!
//! Joins the three exports on their normalized order number. The run is a
//! single synchronous pass over in-memory collections:
//!
//! 1. Normalize each record's key; unusable keys go to the orphan bucket of
//!    that source, in input order.
//! 2. Create an order the first time a key is seen. Opportunities are scanned
//!    first, then deployments, then support cases, which fixes the order
//!    sequence.
//! 3. Attach records to their order in input order. A second opportunity for
//!    the same key is kept as a conflict instead of being dropped.
//!
//! Linking never fails. Malformed records become orphans and duplicate
//! opportunities become conflict counts; both are reported, not raised.

use std::collections::HashMap;

use acctlink_common::config::{DuplicatePolicy, LinkingConfig};
use acctlink_common::models::{Deployment, Opportunity, SupportCase};
use acctlink_common::KeyNormalizer;
use tracing::{debug, info, warn};

use crate::dataset::{LinkedDataset, Order, SourceKind};

/// Linking engine configured with a key normalizer and duplicate policy
#[derive(Debug, Clone)]
pub struct Linker {
    normalizer: KeyNormalizer,
    duplicate_policy: DuplicatePolicy,
    orphan_warning_ratio: f64,
}

impl Default for Linker {
    fn default() -> Self {
        Self::new(&LinkingConfig::default())
    }
}

impl Linker {
    pub fn new(config: &LinkingConfig) -> Self {
        Self {
            normalizer: config.key_normalizer(),
            duplicate_policy: config.duplicate_opportunity_policy,
            orphan_warning_ratio: config.orphan_warning_ratio,
        }
    }

    pub fn with_normalizer(mut self, normalizer: KeyNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Build the joined dataset from the three record collections
    pub fn link(
        &self,
        opportunities: Vec<Opportunity>,
        deployments: Vec<Deployment>,
        support_cases: Vec<SupportCase>,
    ) -> LinkedDataset {
        info!(
            "Linking {} opportunities, {} deployments, {} support cases",
            opportunities.len(),
            deployments.len(),
            support_cases.len()
        );

        let mut table = OrderTable::default();
        let mut orphan_opportunities = Vec::new();
        let mut orphan_deployments = Vec::new();
        let mut orphan_cases = Vec::new();

        for opportunity in opportunities {
            match self.normalizer.normalize(&opportunity.order_number) {
                Some(key) => {
                    let order = table.entry(key);
                    attach_opportunity(order, opportunity, self.duplicate_policy);
                }
                None => orphan_opportunities.push(opportunity),
            }
        }

        for deployment in deployments {
            match self.normalizer.normalize(&deployment.order_number) {
                Some(key) => table.entry(key).deployments.push(deployment),
                None => orphan_deployments.push(deployment),
            }
        }

        for case in support_cases {
            match self.normalizer.normalize(&case.order_number) {
                Some(key) => table.entry(key).support_cases.push(case),
                None => orphan_cases.push(case),
            }
        }

        let OrderTable { mut orders, index } = table;
        for order in &mut orders {
            order.resolve_account_name();
            if order.opportunity_conflicts() > 0 {
                debug!(
                    "Order {} has {} duplicate opportunities",
                    order.key,
                    order.opportunity_conflicts()
                );
            }
        }

        let dataset = LinkedDataset {
            orders,
            index,
            orphan_opportunities,
            orphan_deployments,
            orphan_cases,
            normalizer: self.normalizer.clone(),
        };

        self.report(&dataset);
        dataset
    }

    fn report(&self, dataset: &LinkedDataset) {
        info!("Linked {} unique order numbers", dataset.len());

        let conflicts = dataset.opportunity_conflicts();
        if conflicts > 0 {
            warn!(
                "{} duplicate opportunities share an order number with another opportunity ({:?} applied)",
                conflicts, self.duplicate_policy
            );
        }

        for source in [
            SourceKind::Opportunity,
            SourceKind::Deployment,
            SourceKind::SupportCase,
        ] {
            let rate = dataset.orphan_rate(source);
            if rate > self.orphan_warning_ratio {
                warn!(
                    "{:?} orphan rate {:.1}% exceeds {:.1}% ({} of {} records unlinkable)",
                    source,
                    rate * 100.0,
                    self.orphan_warning_ratio * 100.0,
                    dataset.orphan_count(source),
                    dataset.input_count(source)
                );
            }
        }
    }
}

/// Link with default settings
pub fn link(
    opportunities: Vec<Opportunity>,
    deployments: Vec<Deployment>,
    support_cases: Vec<SupportCase>,
) -> LinkedDataset {
    Linker::default().link(opportunities, deployments, support_cases)
}

/// Orders in first-appearance order plus a key index into them
#[derive(Default)]
struct OrderTable {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
}

impl OrderTable {
    fn entry(&mut self, key: String) -> &mut Order {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.orders.len();
                self.index.insert(key.clone(), i);
                self.orders.push(Order::new(key));
                i
            }
        };
        &mut self.orders[i]
    }
}

fn attach_opportunity(order: &mut Order, opportunity: Opportunity, policy: DuplicatePolicy) {
    match (order.opportunity.take(), policy) {
        (None, _) => order.opportunity = Some(opportunity),
        (Some(primary), DuplicatePolicy::KeepFirst) => {
            order.opportunity = Some(primary);
            order.conflicting_opportunities.push(opportunity);
        }
        (Some(previous), DuplicatePolicy::KeepLast) => {
            order.conflicting_opportunities.push(previous);
            order.opportunity = Some(opportunity);
        }
    }
}
