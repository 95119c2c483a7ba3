//! Joined structure produced by the linker
//!
//! A [`LinkedDataset`] owns every input record: each one sits either inside
//! exactly one [`Order`] or in exactly one orphan bucket. Nothing outside this
//! crate can mutate it, and every count it reports is derived from what it
//! holds rather than stored alongside.

use std::collections::HashMap;

use acctlink_common::models::{
    Deployment, Opportunity, OrderAssessment, ProductSeries, SupportCase, UseCaseCategory,
};
use acctlink_common::KeyNormalizer;
use serde::{Deserialize, Serialize};

use crate::summary::LinkSummary;

/// Which export a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Opportunity,
    Deployment,
    SupportCase,
}

/// Join unit: everything known about one order number
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub(crate) key: String,
    pub(crate) account_name: Option<String>,
    pub(crate) opportunity: Option<Opportunity>,
    pub(crate) conflicting_opportunities: Vec<Opportunity>,
    pub(crate) deployments: Vec<Deployment>,
    pub(crate) support_cases: Vec<SupportCase>,
    pub(crate) assessment: Option<OrderAssessment>,
}

impl Order {
    pub(crate) fn new(key: String) -> Self {
        Self {
            key,
            account_name: None,
            opportunity: None,
            conflicting_opportunities: Vec::new(),
            deployments: Vec::new(),
            support_cases: Vec::new(),
            assessment: None,
        }
    }

    /// Normalized linking key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Account owning this order
    ///
    /// Taken from the opportunity, else the first deployment, else the first
    /// support case that names one. `None` when no record names an account.
    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn opportunity(&self) -> Option<&Opportunity> {
        self.opportunity.as_ref()
    }

    /// Opportunities that shared this key but lost the duplicate tie-break
    pub fn conflicting_opportunities(&self) -> &[Opportunity] {
        &self.conflicting_opportunities
    }

    pub fn opportunity_conflicts(&self) -> usize {
        self.conflicting_opportunities.len()
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn support_cases(&self) -> &[SupportCase] {
        &self.support_cases
    }

    /// Cross-layer evaluation attached by the annotation pass
    pub fn assessment(&self) -> Option<&OrderAssessment> {
        self.assessment.as_ref()
    }

    pub fn has_opportunity(&self) -> bool {
        self.opportunity.is_some()
    }

    pub fn has_deployments(&self) -> bool {
        !self.deployments.is_empty()
    }

    pub fn has_support_cases(&self) -> bool {
        !self.support_cases.is_empty()
    }

    /// Records from all three sources are present
    pub fn is_fully_linked(&self) -> bool {
        self.has_opportunity() && self.has_deployments() && self.has_support_cases()
    }

    /// Product family this order is attributed to
    ///
    /// Opportunity product first, then the first deployment with a known
    /// series, then the first support case with one. An order attributed to
    /// `Unknown` belongs to no product partition.
    pub fn product_series(&self) -> ProductSeries {
        self.opportunity
            .as_ref()
            .map(|o| o.product_series())
            .filter(|s| s.is_known())
            .or_else(|| {
                self.deployments
                    .iter()
                    .map(|d| d.product_series)
                    .find(|s| s.is_known())
            })
            .or_else(|| {
                self.support_cases
                    .iter()
                    .map(|c| c.product_series)
                    .find(|s| s.is_known())
            })
            .unwrap_or(ProductSeries::Unknown)
    }

    /// Use case category; orders without an opportunity are `Unknown`
    pub fn use_case(&self) -> UseCaseCategory {
        self.opportunity
            .as_ref()
            .map(|o| o.use_case_category())
            .unwrap_or(UseCaseCategory::Unknown)
    }

    /// Number of input records held by this order
    pub fn record_count(&self) -> usize {
        usize::from(self.opportunity.is_some())
            + self.conflicting_opportunities.len()
            + self.deployments.len()
            + self.support_cases.len()
    }

    pub(crate) fn resolve_account_name(&mut self) {
        let opportunity = self.opportunity.iter().map(|o| o.account_name.as_str());
        let deployments = self.deployments.iter().map(|d| d.account_name.as_str());
        let cases = self.support_cases.iter().map(|c| c.account_name.as_str());

        self.account_name = opportunity
            .chain(deployments)
            .chain(cases)
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string);
    }
}

/// Output of one linking run
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedDataset {
    pub(crate) orders: Vec<Order>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) orphan_opportunities: Vec<Opportunity>,
    pub(crate) orphan_deployments: Vec<Deployment>,
    pub(crate) orphan_cases: Vec<SupportCase>,
    pub(crate) normalizer: KeyNormalizer,
}

impl LinkedDataset {
    /// Orders in first-appearance order of their key
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders exist only for matched keys, so this is the order count
    pub fn matched_orders(&self) -> usize {
        self.orders.len()
    }

    /// Look up an order by raw order number (normalized the same way as input)
    pub fn order(&self, order_number: &str) -> Option<&Order> {
        let key = self.normalizer.normalize(order_number)?;
        self.index.get(&key).map(|&i| &self.orders[i])
    }

    /// Key normalizer used for this run
    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.normalizer
    }

    pub fn orders_by_account<'a>(&'a self, account: &'a str) -> impl Iterator<Item = &'a Order> + 'a {
        let account = account.trim();
        self.orders
            .iter()
            .filter(move |o| o.account_name() == Some(account))
    }

    /// Distinct account names in first-appearance order
    pub fn accounts(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.orders
            .iter()
            .filter_map(Order::account_name)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn fully_linked_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_fully_linked())
    }

    pub fn orders_with_support(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.has_support_cases())
    }

    pub fn orphan_opportunities(&self) -> &[Opportunity] {
        &self.orphan_opportunities
    }

    pub fn orphan_deployments(&self) -> &[Deployment] {
        &self.orphan_deployments
    }

    pub fn orphan_cases(&self) -> &[SupportCase] {
        &self.orphan_cases
    }

    pub fn orphan_count(&self, source: SourceKind) -> usize {
        match source {
            SourceKind::Opportunity => self.orphan_opportunities.len(),
            SourceKind::Deployment => self.orphan_deployments.len(),
            SourceKind::SupportCase => self.orphan_cases.len(),
        }
    }

    /// Records of `source` placed into orders
    pub fn keyed_count(&self, source: SourceKind) -> usize {
        self.orders
            .iter()
            .map(|o| match source {
                SourceKind::Opportunity => {
                    usize::from(o.opportunity.is_some()) + o.conflicting_opportunities.len()
                }
                SourceKind::Deployment => o.deployments.len(),
                SourceKind::SupportCase => o.support_cases.len(),
            })
            .sum()
    }

    /// Records of `source` that were fed to the linker
    pub fn input_count(&self, source: SourceKind) -> usize {
        self.keyed_count(source) + self.orphan_count(source)
    }

    /// Share of `source` records that could not be linked (0.0 for no input)
    ///
    /// The linker never rejects a run on this; callers compare it against
    /// their own acceptance threshold.
    pub fn orphan_rate(&self, source: SourceKind) -> f64 {
        let input = self.input_count(source);
        if input == 0 {
            0.0
        } else {
            self.orphan_count(source) as f64 / input as f64
        }
    }

    /// Duplicate opportunities across all orders
    pub fn opportunity_conflicts(&self) -> usize {
        self.orders.iter().map(Order::opportunity_conflicts).sum()
    }

    pub fn summary(&self) -> LinkSummary {
        LinkSummary::from_dataset(self)
    }
}
