//! # acctlink common library
//!
//! Shared code for the account-journey linking workspace:
//! - Source record types (opportunities, deployments, support cases)
//! - Annotation payloads attached by the external text-analysis pass
//! - Linking key normalization
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod key;
pub mod models;

pub use error::{Error, Result};
pub use key::KeyNormalizer;
