//! Parser configuration.
//!
//! A [`ParserConfig`] belongs to one parser instance; setters apply to all
//! subsequent parses on that instance, and each parse captures an immutable
//! snapshot up front. The clause ceiling is process-wide, shared by every
//! parser in the process.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::datetools::Resolution;

/// How adjacent clauses with no written operator combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Unmarked adjacent clauses are required.
    And,
    /// Unmarked adjacent clauses are optional.
    Or,
}

/// The clause ceiling in effect when no one has changed it.
pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 1024;

/// Process-wide clause ceiling, shared by all parsers.
static MAX_CLAUSE_COUNT: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_CLAUSE_COUNT);

/// Returns the process-wide clause ceiling.
pub fn max_clause_count() -> usize {
    MAX_CLAUSE_COUNT.load(Ordering::Relaxed)
}

/// Sets the process-wide clause ceiling. Values below 1 are clamped to 1.
///
/// The new ceiling applies to parses that start after the call.
pub fn set_max_clause_count(limit: usize) {
    MAX_CLAUSE_COUNT.store(limit.max(1), Ordering::Relaxed);
}

/// Settings for one parser instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// How unmarked adjacent clauses combine.
    default_operator: Operator,
    /// Whether wildcard, prefix, fuzzy, and range text is lowercased.
    lowercase_expanded_terms: bool,
    /// Date resolution for fields without a specific one.
    default_date_resolution: Option<Resolution>,
    /// Per-field date resolutions, consulted before the default.
    field_date_resolutions: HashMap<String, Resolution>,
    /// Leading characters of a fuzzy term that must match exactly.
    fuzzy_prefix_length: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_operator: Operator::Or,
            lowercase_expanded_terms: true,
            default_date_resolution: None,
            field_date_resolutions: HashMap::new(),
            fuzzy_prefix_length: 0,
        }
    }
}

impl ParserConfig {
    /// Creates the default configuration: OR semantics, lowercased expanded
    /// terms, no date resolutions, fuzzy prefix length 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The operator applied to unmarked adjacent clauses.
    pub fn default_operator(&self) -> Operator {
        self.default_operator
    }

    /// Sets the operator applied to unmarked adjacent clauses.
    pub fn set_default_operator(&mut self, operator: Operator) {
        self.default_operator = operator;
    }

    /// Whether expanded terms (wildcard, prefix, fuzzy, range) lowercase.
    pub fn lowercase_expanded_terms(&self) -> bool {
        self.lowercase_expanded_terms
    }

    /// Sets whether expanded terms lowercase.
    pub fn set_lowercase_expanded_terms(&mut self, lowercase: bool) {
        self.lowercase_expanded_terms = lowercase;
    }

    /// The date resolution for fields without a specific one.
    pub fn default_date_resolution(&self) -> Option<Resolution> {
        self.default_date_resolution
    }

    /// Sets the date resolution for fields without a specific one.
    pub fn set_default_date_resolution(&mut self, resolution: Option<Resolution>) {
        self.default_date_resolution = resolution;
    }

    /// Sets a field-specific date resolution, overriding the default.
    pub fn set_date_resolution(&mut self, field: impl Into<String>, resolution: Resolution) {
        self.field_date_resolutions.insert(field.into(), resolution);
    }

    /// The resolution in effect for `field`: its own, else the default.
    pub fn resolution_for_field(&self, field: &str) -> Option<Resolution> {
        self.field_date_resolutions
            .get(field)
            .copied()
            .or(self.default_date_resolution)
    }

    /// Leading characters of a fuzzy term that must match exactly.
    pub fn fuzzy_prefix_length(&self) -> u32 {
        self.fuzzy_prefix_length
    }

    /// Sets the fuzzy prefix length used for `~` terms.
    pub fn set_fuzzy_prefix_length(&mut self, length: u32) {
        self.fuzzy_prefix_length = length;
    }
}
