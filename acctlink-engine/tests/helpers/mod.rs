//! Test Helper Utilities
//!
//! Shared record builders and random dataset generation for acctlink-engine

#![allow(dead_code)]

pub mod records;
pub mod random;

pub use random::{random_sources, RandomSources};
pub use records::{case, deployment, opportunity, scored_deployment, analyzed_case};
