//! Closed classifications shared by the three sources
//!
//! Loaders resolve free-form column text into these enums once. The linking
//! and metrics code only ever matches on variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Case severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Severity {
    /// Critical - system down
    S1,
    /// High - major impact
    S2,
    /// Medium - moderate impact
    S3,
    /// Low - minor impact
    #[default]
    S4,
}

impl Severity {
    /// Lenient parse of a severity column ("S1", "Sev2", "Critical", ...)
    ///
    /// Anything unrecognized is treated as S4.
    pub fn parse(value: &str) -> Self {
        let v = value.trim().to_uppercase();
        if v.contains("S1") || v.contains("SEV1") || v.contains("CRITICAL") {
            Severity::S1
        } else if v.contains("S2") || v.contains("SEV2") || v.contains("HIGH") {
            Severity::S2
        } else if v.contains("S3") || v.contains("SEV3") || v.contains("MEDIUM") {
            Severity::S3
        } else {
            Severity::S4
        }
    }
}

/// Customer support tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SupportLevel {
    Gold,
    Silver,
    Bronze,
    #[default]
    Unknown,
}

impl SupportLevel {
    pub fn parse(value: &str) -> Self {
        let v = value.trim().to_uppercase();
        if v.contains("GOLD") {
            SupportLevel::Gold
        } else if v.contains("SILVER") {
            SupportLevel::Silver
        } else if v.contains("BRONZE") {
            SupportLevel::Bronze
        } else {
            SupportLevel::Unknown
        }
    }
}

/// Product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ProductSeries {
    F,
    M,
    H,
    R,
    #[default]
    Unknown,
}

impl ProductSeries {
    /// Every concrete series, in reporting order
    pub const ALL: [ProductSeries; 4] = [
        ProductSeries::F,
        ProductSeries::M,
        ProductSeries::H,
        ProductSeries::R,
    ];

    /// Parse a series column value ("F", "F-Series", "fseries")
    pub fn parse(value: &str) -> Self {
        let v = value.trim().to_uppercase();
        let v = v.trim_end_matches("SERIES").trim_end_matches('-').trim();
        match v {
            "F" => ProductSeries::F,
            "M" => ProductSeries::M,
            "H" => ProductSeries::H,
            "R" => ProductSeries::R,
            _ => ProductSeries::Unknown,
        }
    }

    /// Derive the series from a product or model name ("F100", "m40-hA")
    pub fn from_product(product: &str) -> Self {
        match product.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('F') => ProductSeries::F,
            Some('M') => ProductSeries::M,
            Some('H') => ProductSeries::H,
            Some('R') => ProductSeries::R,
            _ => ProductSeries::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != ProductSeries::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductSeries::F => "F-Series",
            ProductSeries::M => "M-Series",
            ProductSeries::H => "H-Series",
            ProductSeries::R => "R-Series",
            ProductSeries::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProductSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Workload category derived from an opportunity's stated use case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UseCaseCategory {
    MediaEntertainment,
    BackupArchive,
    Virtualization,
    Database,
    FileSharing,
    VideoSurveillance,
    ScientificHpc,
    GeneralPurpose,
    Unknown,
}

/// Keyword table checked in order; first category with a hit wins
const USE_CASE_KEYWORDS: [(UseCaseCategory, &[&str]); 7] = [
    (
        UseCaseCategory::MediaEntertainment,
        &["media", "video edit", "broadcast", "post-production", "4k", "8k"],
    ),
    (
        UseCaseCategory::BackupArchive,
        &["backup", "archive", "dr", "disaster", "retention", "cold storage"],
    ),
    (
        UseCaseCategory::Virtualization,
        &["vm", "virtual", "vdi", "esxi", "hyper-v", "container", "docker", "kubernetes"],
    ),
    (
        UseCaseCategory::Database,
        &["database", "sql", "oracle", "mysql", "postgres", "analytics", "olap", "oltp"],
    ),
    (
        UseCaseCategory::FileSharing,
        &["file", "share", "nas", "smb", "nfs", "cifs", "collab", "home director"],
    ),
    (
        UseCaseCategory::VideoSurveillance,
        &["surveil", "camera", "nvr", "security", "cctv"],
    ),
    (
        UseCaseCategory::ScientificHpc,
        &["hpc", "research", "scientific", "render", "simulation", "compute"],
    ),
];

impl UseCaseCategory {
    pub const ALL: [UseCaseCategory; 9] = [
        UseCaseCategory::MediaEntertainment,
        UseCaseCategory::BackupArchive,
        UseCaseCategory::Virtualization,
        UseCaseCategory::Database,
        UseCaseCategory::FileSharing,
        UseCaseCategory::VideoSurveillance,
        UseCaseCategory::ScientificHpc,
        UseCaseCategory::GeneralPurpose,
        UseCaseCategory::Unknown,
    ];

    /// Map free-form use case text to a category
    ///
    /// Blank text is `Unknown`; text with no keyword hit is `GeneralPurpose`.
    pub fn categorize(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return UseCaseCategory::Unknown;
        }

        USE_CASE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
            .map(|(category, _)| *category)
            .unwrap_or(UseCaseCategory::GeneralPurpose)
    }

    pub fn label(self) -> &'static str {
        match self {
            UseCaseCategory::MediaEntertainment => "Media & Entertainment",
            UseCaseCategory::BackupArchive => "Backup & Archive",
            UseCaseCategory::Virtualization => "Virtualization",
            UseCaseCategory::Database => "Database",
            UseCaseCategory::FileSharing => "File Sharing",
            UseCaseCategory::VideoSurveillance => "Video Surveillance",
            UseCaseCategory::ScientificHpc => "Scientific/HPC",
            UseCaseCategory::GeneralPurpose => "General Purpose",
            UseCaseCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for UseCaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Churn risk classification, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl ChurnRisk {
    /// High and Critical count as high risk in every aggregate
    pub fn is_high(self) -> bool {
        self >= ChurnRisk::High
    }

    pub fn label(self) -> &'static str {
        match self {
            ChurnRisk::Low => "Low",
            ChurnRisk::Medium => "Medium",
            ChurnRisk::High => "High",
            ChurnRisk::Critical => "Critical",
        }
    }
}

impl fmt::Display for ChurnRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How well a deployment matched what was sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpectationMatch {
    Met,
    PartiallyMet,
    NotMet,
    #[default]
    Unknown,
}

/// Record type of a row in the shared case export layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseCategory {
    Deployment,
    Support,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("S1"), Severity::S1);
        assert_eq!(Severity::parse("sev2 - high"), Severity::S2);
        assert_eq!(Severity::parse("Medium"), Severity::S3);
        assert_eq!(Severity::parse(""), Severity::S4);
        assert_eq!(Severity::parse("whatever"), Severity::S4);
    }

    #[test]
    fn test_support_level_parse() {
        assert_eq!(SupportLevel::parse("Gold"), SupportLevel::Gold);
        assert_eq!(SupportLevel::parse(" silver plus "), SupportLevel::Silver);
        assert_eq!(SupportLevel::parse("BRONZE"), SupportLevel::Bronze);
        assert_eq!(SupportLevel::parse(""), SupportLevel::Unknown);
        assert_eq!(SupportLevel::parse("Platinum"), SupportLevel::Unknown);
    }

    #[test]
    fn test_product_series_parse() {
        assert_eq!(ProductSeries::parse("F"), ProductSeries::F);
        assert_eq!(ProductSeries::parse("m-series"), ProductSeries::M);
        assert_eq!(ProductSeries::parse("HSERIES"), ProductSeries::H);
        assert_eq!(ProductSeries::parse(" R "), ProductSeries::R);
        assert_eq!(ProductSeries::parse("X-Series"), ProductSeries::Unknown);
        assert_eq!(ProductSeries::parse(""), ProductSeries::Unknown);
    }

    #[test]
    fn test_product_series_from_product_name() {
        assert_eq!(ProductSeries::from_product("F100"), ProductSeries::F);
        assert_eq!(ProductSeries::from_product(" m40-HA"), ProductSeries::M);
        assert_eq!(ProductSeries::from_product("Z9"), ProductSeries::Unknown);
        assert_eq!(ProductSeries::from_product(""), ProductSeries::Unknown);
    }

    #[test]
    fn test_use_case_categorize() {
        assert_eq!(UseCaseCategory::categorize(""), UseCaseCategory::Unknown);
        assert_eq!(
            UseCaseCategory::categorize("4K post-production editing"),
            UseCaseCategory::MediaEntertainment
        );
        assert_eq!(
            UseCaseCategory::categorize("Nightly Backup target"),
            UseCaseCategory::BackupArchive
        );
        assert_eq!(
            UseCaseCategory::categorize("VMware ESXi datastore"),
            UseCaseCategory::Virtualization
        );
        assert_eq!(
            UseCaseCategory::categorize("Postgres cluster"),
            UseCaseCategory::Database
        );
        assert_eq!(
            UseCaseCategory::categorize("something unusual"),
            UseCaseCategory::GeneralPurpose
        );
    }

    #[test]
    fn test_churn_risk_ordering() {
        assert!(ChurnRisk::Critical > ChurnRisk::High);
        assert!(ChurnRisk::High.is_high());
        assert!(ChurnRisk::Critical.is_high());
        assert!(!ChurnRisk::Medium.is_high());
    }
}
