//! Data model for the three source exports and their annotations

pub mod annotations;
pub mod classify;
pub mod records;

pub use annotations::{CaseAnalysis, DeploymentAnalysis, OpportunityAnalysis, OrderAssessment};
pub use classify::{
    CaseCategory, ChurnRisk, ExpectationMatch, ProductSeries, Severity, SupportLevel,
    UseCaseCategory,
};
pub use records::{split_case_records, CaseRecord, Deployment, Opportunity, SupportCase};
