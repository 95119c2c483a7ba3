//! Annotation payloads produced by the external text-analysis pass
//!
//! The engine never computes these. They are attached to records after
//! linking and read back during aggregation; every field is opaque input.

use serde::{Deserialize, Serialize};

use super::classify::{ChurnRisk, ExpectationMatch, UseCaseCategory};

/// Opportunity analysis result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpportunityAnalysis {
    /// 0-100, higher = clearer requirements
    pub opportunity_score: u8,
    /// Category extracted from the free-text fields, if the analyzer found one
    #[serde(default)]
    pub use_case_category: Option<UseCaseCategory>,
    #[serde(default)]
    pub customer_expectations: Vec<String>,
}

/// Deployment analysis result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentAnalysis {
    /// 0-100, higher = smoother deployment
    pub deployment_score: u8,
    /// Professional services install (vs customer self-deploy)
    pub is_service_deploy: bool,
    #[serde(default)]
    pub expectation_match: ExpectationMatch,
}

/// Support case analysis result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseAnalysis {
    /// 0-10
    pub frustration_score: f64,
    #[serde(default)]
    pub escalation_detected: bool,
    #[serde(default)]
    pub is_hardware_failure: bool,
    #[serde(default)]
    pub is_performance_issue: bool,
    #[serde(default)]
    pub is_configuration_issue: bool,
    /// Some(true) when the issue traces back to how the system was deployed
    #[serde(default)]
    pub deployment_related: Option<bool>,
}

/// Cross-layer evaluation of a whole order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderAssessment {
    /// 0-100; when absent the engine derives one from the record annotations
    #[serde(default)]
    pub journey_health_score: Option<u8>,
    #[serde(default)]
    pub churn_risk: Option<ChurnRisk>,
    #[serde(default)]
    pub critical_findings: Vec<String>,
    #[serde(default)]
    pub positive_signals: Vec<String>,
    #[serde(default)]
    pub immediate_actions: Vec<String>,
}
