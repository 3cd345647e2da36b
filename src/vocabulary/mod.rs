//! Reference vocabulary of valid codes.
//!
//! The vocabulary file is a JSON object keyed by field name, each value being a
//! map from code to display label:
//!
//! ```json
//! { "i94port": { "ATL": "ATLANTA, GA", "BOS": "BOSTON, MA" } }
//! ```
//!
//! A loaded [`Vocabulary`] is immutable and is handed to the validator
//! explicitly, usually behind an `Arc`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{PipelineError, Result};

/// Normalize a raw code for lookup
///
/// Surrounding whitespace is trimmed, and numeric codes stored as text
/// (`"5.0"`) collapse to their integral form (`"5"`), so codes survive a trip
/// through a floating-point column.
#[must_use]
pub fn normalize_code(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if trimmed.contains('.') {
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
                #[allow(clippy::cast_possible_truncation)]
                return Cow::Owned((value as i64).to_string());
            }
        }
    }
    Cow::Borrowed(trimmed)
}

/// Fixed mapping from valid codes to their display labels
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    field: String,
    labels: FxHashMap<String, String>,
}

impl Vocabulary {
    /// Build a vocabulary from code/label pairs
    pub fn new<I, K, V>(field: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let labels = entries
            .into_iter()
            .map(|(code, label)| (normalize_code(code.as_ref()).into_owned(), label.into()))
            .collect();
        Self {
            field: field.into(),
            labels,
        }
    }

    /// Load the codes listed under `field` in a vocabulary file
    pub fn from_path(path: &Path, field: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(PipelineError::io_at(path))?;
        let vocabulary = Self::from_json_str(&content, field)?;
        log::info!(
            "Loaded {} {field} codes from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Parse the codes listed under `field` from JSON text
    pub fn from_json_str(content: &str, field: &str) -> Result<Self> {
        let mut fields: HashMap<String, HashMap<String, String>> = serde_json::from_str(content)?;
        let entries = fields.remove(field).ok_or_else(|| {
            PipelineError::Vocabulary(format!("field '{field}' not present in vocabulary file"))
        })?;
        if entries.is_empty() {
            return Err(PipelineError::Vocabulary(format!(
                "field '{field}' has no codes"
            )));
        }
        Ok(Self::new(field, entries))
    }

    /// Name of the field this vocabulary validates
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether `code` is a valid key, after normalization
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.labels.contains_key(normalize_code(code).as_ref())
    }

    /// Display label for `code`, if it is valid
    #[must_use]
    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels
            .get(normalize_code(code).as_ref())
            .map(String::as_str)
    }

    /// Number of codes
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary has no codes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
