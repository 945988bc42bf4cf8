use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::patterns;

/// Decides whether a screen name looks machine-generated.
#[derive(Debug, Clone)]
pub struct HandleClassifier {
    patterns: Vec<Regex>,
}

impl HandleClassifier {
    /// `patterns` must already be anchored; see [`patterns::load_handle_patterns`],
    /// which always puts the built-in rule first.
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Classifier for the built-in `letters+digits+` rule.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(patterns::default_patterns()?))
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_suspicious(&self, handle: &str) -> bool {
        !handle.is_empty() && self.patterns.iter().any(|p| p.is_match(handle))
    }

    /// Non-string handles never match.
    pub fn is_suspicious_value(&self, handle: &Value) -> bool {
        handle.as_str().is_some_and(|h| self.is_suspicious(h))
    }
}
