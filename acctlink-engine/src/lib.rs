//! # acctlink engine
//!
//! Joins opportunity, deployment and support case exports on their order
//! number and computes metrics over the joined orders.
//!
//! Pipeline: [`loader`] (concurrent, async) → [`linker`] (synchronous, single
//! pass) → [`annotate`] (optional external scores) → [`metrics`] (read-only,
//! parallelizable over a shared dataset).

pub mod annotate;
pub mod dataset;
pub mod linker;
pub mod loader;
pub mod metrics;
pub mod summary;

pub use annotate::{annotate, annotate_with_stats, AnnotationStats, Annotator, NoopAnnotator};
pub use dataset::{LinkedDataset, Order, SourceKind};
pub use linker::{link, Linker};
pub use loader::{load_sources, SourceFiles, Sources};
pub use metrics::{
    compute_metrics, AccountMetrics, CountTotals, Dimension, MetricsEngine, MetricsRecord,
    Partition, ProductMetrics, ServiceComparison, UseCaseMetrics,
};
pub use summary::LinkSummary;
