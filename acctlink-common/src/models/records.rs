//! Source record types
//!
//! One struct per export. Every record carries the raw order number exactly
//! as the export spelled it; normalization happens in the linker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::annotations::{CaseAnalysis, DeploymentAnalysis, OpportunityAnalysis};
use super::classify::{CaseCategory, ProductSeries, Severity, SupportLevel, UseCaseCategory};

/// Sales opportunity (one per deal)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Opportunity {
    /// Raw linking key; blank means unlinkable
    pub order_number: String,
    pub opportunity_name: String,
    pub account_name: String,
    pub owner: String,
    pub amount: f64,
    pub close_date: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
    pub primary_product: String,
    pub business_need: String,
    pub primary_use_case: String,
    pub pain_points: String,
    pub analysis: Option<OpportunityAnalysis>,
}

impl Opportunity {
    /// Series derived from the primary product name
    pub fn product_series(&self) -> ProductSeries {
        ProductSeries::from_product(&self.primary_product)
    }

    /// Use case category of this deal
    ///
    /// An analyzer-supplied category wins. Otherwise the stated use case is
    /// categorized, falling back to the business need when the use case text
    /// yields `Unknown`.
    pub fn use_case_category(&self) -> UseCaseCategory {
        if let Some(category) = self.analysis.as_ref().and_then(|a| a.use_case_category) {
            return category;
        }

        match UseCaseCategory::categorize(&self.primary_use_case) {
            UseCaseCategory::Unknown => UseCaseCategory::categorize(&self.business_need),
            category => category,
        }
    }
}

/// Field deployment event (0..N per order)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub case_number: String,
    /// Raw linking key; blank means unlinkable
    pub order_number: String,
    pub account_name: String,
    pub owner: String,
    pub age_days: u32,
    pub product_series: ProductSeries,
    pub product_model: String,
    pub support_level: SupportLevel,
    pub severity: Severity,
    pub case_reason: String,
    pub status: String,
    pub message_date: Option<NaiveDate>,
    pub serial_number: String,
    pub analysis: Option<DeploymentAnalysis>,
}

impl Deployment {
    /// Annotated deployment score, if the analysis pass ran
    pub fn deployment_score(&self) -> Option<u8> {
        self.analysis.as_ref().map(|a| a.deployment_score)
    }

    /// Service vs self deploy; unknown until annotated
    pub fn is_service_deploy(&self) -> Option<bool> {
        self.analysis.as_ref().map(|a| a.is_service_deploy)
    }
}

/// Support interaction (0..N per order)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportCase {
    pub case_number: String,
    /// Raw linking key; blank means unlinkable
    pub order_number: String,
    pub account_name: String,
    pub owner: String,
    pub age_days: u32,
    pub severity: Severity,
    pub case_reason: String,
    pub product_series: ProductSeries,
    pub product_model: String,
    pub support_level: SupportLevel,
    pub status: String,
    pub message_date: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
    pub serial_number: String,
    /// Repeat of an earlier case, flagged by the loader
    pub is_repeat: bool,
    pub repeat_of_case: Option<String>,
    pub analysis: Option<CaseAnalysis>,
}

impl SupportCase {
    pub fn is_open(&self) -> bool {
        self.status.to_lowercase().contains("open")
    }

    pub fn frustration_score(&self) -> Option<f64> {
        self.analysis.as_ref().map(|a| a.frustration_score)
    }

    pub fn escalation_detected(&self) -> bool {
        self.analysis.as_ref().is_some_and(|a| a.escalation_detected)
    }
}

/// Row of the shared case export layout, tagged by record type
///
/// Deployments and support cases come out of the same export shape. The
/// loader decides the variant once; nothing downstream inspects rows again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type")]
pub enum CaseRecord {
    Deployment(Deployment),
    Support(SupportCase),
}

impl CaseRecord {
    pub fn category(&self) -> CaseCategory {
        match self {
            CaseRecord::Deployment(_) => CaseCategory::Deployment,
            CaseRecord::Support(_) => CaseCategory::Support,
        }
    }
}

/// Split tagged case rows into deployments and support cases, keeping order
pub fn split_case_records<I>(records: I) -> (Vec<Deployment>, Vec<SupportCase>)
where
    I: IntoIterator<Item = CaseRecord>,
{
    let mut deployments = Vec::new();
    let mut cases = Vec::new();
    for record in records {
        match record {
            CaseRecord::Deployment(d) => deployments.push(d),
            CaseRecord::Support(c) => cases.push(c),
        }
    }
    (deployments, cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opportunity_use_case_falls_back_to_business_need() {
        let opp = Opportunity {
            primary_use_case: String::new(),
            business_need: "Replace aging backup appliance".to_string(),
            ..Default::default()
        };
        assert_eq!(opp.use_case_category(), UseCaseCategory::BackupArchive);
    }

    #[test]
    fn test_opportunity_use_case_prefers_analysis() {
        let opp = Opportunity {
            primary_use_case: "backup".to_string(),
            analysis: Some(OpportunityAnalysis {
                opportunity_score: 80,
                use_case_category: Some(UseCaseCategory::Database),
                customer_expectations: vec![],
            }),
            ..Default::default()
        };
        assert_eq!(opp.use_case_category(), UseCaseCategory::Database);
    }

    #[test]
    fn test_case_open_status() {
        let mut case = SupportCase {
            status: "Open - Pending Customer".to_string(),
            ..Default::default()
        };
        assert!(case.is_open());
        case.status = "Closed".to_string();
        assert!(!case.is_open());
    }

    #[test]
    fn test_case_escalation_needs_analysis() {
        let mut case = SupportCase::default();
        assert!(!case.escalation_detected());
        case.analysis = Some(CaseAnalysis {
            escalation_detected: true,
            ..Default::default()
        });
        assert!(case.escalation_detected());
    }

    #[test]
    fn test_case_records_deserialize_by_tag() {
        let json = r#"[
            {"record_type": "Deployment", "case_number": "D1", "order_number": "A1", "product_series": "M"},
            {"record_type": "Support", "case_number": "C1", "order_number": "A1", "is_repeat": true},
            {"record_type": "Deployment", "case_number": "D2", "order_number": ""}
        ]"#;
        let rows: Vec<CaseRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[1].category(), CaseCategory::Support);

        let (deployments, cases) = split_case_records(rows);
        assert_eq!(deployments.len(), 2);
        assert_eq!(deployments[0].case_number, "D1");
        assert_eq!(deployments[0].product_series, ProductSeries::M);
        assert_eq!(deployments[1].case_number, "D2");
        assert_eq!(cases.len(), 1);
        assert!(cases[0].is_repeat);
    }
}
