//! Source file loading
//!
//! The three exports are independent reads, so they are loaded concurrently.
//! [`load_sources`] returns only once all of them have finished, which is the
//! barrier the linker waits on.
//!
//! Files are JSON arrays. Opportunity files hold [`Opportunity`] objects,
//! deployment files hold [`Deployment`] objects, and case files hold
//! [`CaseRecord`] rows tagged with `record_type` (`"Deployment"` or
//! `"Support"`), which are split once here.

use std::path::{Path, PathBuf};

use acctlink_common::models::{split_case_records, CaseRecord, Deployment, Opportunity, SupportCase};
use acctlink_common::{Error, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Input file locations; an absent file contributes no records
#[derive(Debug, Clone, Default)]
pub struct SourceFiles {
    pub opportunities: Option<PathBuf>,
    pub deployments: Option<PathBuf>,
    pub cases: Option<PathBuf>,
}

/// Loaded records, ready for linking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sources {
    pub opportunities: Vec<Opportunity>,
    pub deployments: Vec<Deployment>,
    pub support_cases: Vec<SupportCase>,
}

/// Load every configured source concurrently
pub async fn load_sources(files: &SourceFiles) -> Result<Sources> {
    let (opportunities, deployments, case_records) = tokio::try_join!(
        load_optional::<Opportunity>(files.opportunities.as_deref()),
        load_optional::<Deployment>(files.deployments.as_deref()),
        load_optional::<CaseRecord>(files.cases.as_deref()),
    )?;

    let (tagged_deployments, support_cases) = split_case_records(case_records);
    let mut deployments = deployments;
    deployments.extend(tagged_deployments);

    info!(
        "Loaded {} opportunities, {} deployments, {} support cases",
        opportunities.len(),
        deployments.len(),
        support_cases.len()
    );

    Ok(Sources {
        opportunities,
        deployments,
        support_cases,
    })
}

async fn load_optional<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    match path {
        Some(path) => load_json_array(path).await,
        None => Ok(Vec::new()),
    }
}

/// Read one JSON array file
pub async fn load_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::at_path(path, e))?;

    let records: Vec<T> =
        serde_json::from_str(&content).map_err(|e| Error::at_path(path, e))?;

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
