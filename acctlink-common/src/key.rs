//! Linking key (order number) normalization
//!
//! The three exports spell the same order number differently: surrounding
//! whitespace, an `ORD-` or `#` prefix, zero padding, mixed case. Matching is
//! done on the normalized form only. A key that normalizes to nothing is
//! unusable and the record carrying it becomes an orphan.

use serde::{Deserialize, Serialize};

/// Prefixes stripped by default, matched case-insensitively
pub const DEFAULT_KEY_PREFIXES: [&str; 5] = ["ORDER-", "ORDER", "ORD-", "ORD", "#"];

/// Order number normalizer
///
/// Built once per linking run from [`crate::config::LinkingConfig`] and applied
/// to every record key, so two runs with the same settings agree on every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNormalizer {
    /// Uppercased prefixes, longest first
    prefixes: Vec<String>,
    strip_leading_zeros: bool,
    uppercase: bool,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIXES.iter().copied(), true, true)
    }
}

impl KeyNormalizer {
    pub fn new<I, S>(prefixes: I, strip_leading_zeros: bool, uppercase: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect();
        // Longest first so "ORDER-" wins over "ORD"
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        prefixes.dedup();

        Self {
            prefixes,
            strip_leading_zeros,
            uppercase,
        }
    }

    /// Normalizer that only trims whitespace
    pub fn trim_only() -> Self {
        Self::new(std::iter::empty::<&str>(), false, false)
    }

    /// Normalize a raw order number
    ///
    /// Returns `None` when nothing usable remains (empty, whitespace, or a
    /// bare prefix such as `"#"`).
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut key: &str = trimmed;
        for prefix in &self.prefixes {
            if starts_with_ignore_case(key, prefix) {
                key = key[prefix.len()..].trim_start();
                break;
            }
        }

        if self.strip_leading_zeros && !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            let stripped = key.trim_start_matches('0');
            key = if stripped.is_empty() { "0" } else { stripped };
        }

        if key.is_empty() {
            return None;
        }

        Some(if self.uppercase {
            key.to_uppercase()
        } else {
            key.to_string()
        })
    }

    /// True when `raw` normalizes to a usable key
    pub fn is_linkable(&self, raw: &str) -> bool {
        self.normalize(raw).is_some()
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}
