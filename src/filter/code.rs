//! Code-based filtering
//!
//! Filters that keep or drop rows by looking a code column up in a set of
//! codes. Lookups go through [`normalize_code`], so a code stored as
//! `"5.0"` matches the key `"5"`.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::filter::core::BatchFilter;
use crate::utils::arrow::string_column;
use crate::vocabulary::{Vocabulary, normalize_code};

/// Keeps rows whose code is a key of the reference vocabulary
///
/// Null codes are dropped.
#[derive(Debug, Clone)]
pub struct VocabularyFilter {
    column: String,
    vocabulary: Arc<Vocabulary>,
}

impl VocabularyFilter {
    /// Create a filter over `column` backed by `vocabulary`
    #[must_use]
    pub fn new(column: impl Into<String>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            column: column.into(),
            vocabulary,
        }
    }
}

impl BatchFilter for VocabularyFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let codes = string_column(batch, &self.column)?;
        Ok(codes
            .iter()
            .map(|code| Some(code.is_some_and(|c| self.vocabulary.contains(c))))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// Drops rows whose code is one of a set of excluded codes
///
/// Null codes are kept: a missing code is not an excluded one.
#[derive(Debug, Clone)]
pub struct ExcludedCodesFilter {
    column: String,
    excluded: FxHashSet<String>,
}

impl ExcludedCodesFilter {
    /// Create a filter over `column` dropping every code in `excluded`
    #[must_use]
    pub fn new<I, S>(column: impl Into<String>, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            column: column.into(),
            excluded: excluded
                .into_iter()
                .map(|code| normalize_code(code.as_ref()).into_owned())
                .collect(),
        }
    }
}

impl BatchFilter for ExcludedCodesFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let codes = string_column(batch, &self.column)?;
        Ok(codes
            .iter()
            .map(|code| {
                Some(code.is_none_or(|c| !self.excluded.contains(normalize_code(c).as_ref())))
            })
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// Keeps rows whose code appears in a set of codes (semi-join on one column)
#[derive(Debug, Clone)]
pub struct CodeSetFilter {
    column: String,
    codes: Arc<FxHashSet<String>>,
}

impl CodeSetFilter {
    /// Create a filter over `column` keeping codes present in `codes`
    ///
    /// `codes` are expected to be normalized already, as produced by
    /// [`crate::utils::arrow::distinct_codes`].
    #[must_use]
    pub fn new(column: impl Into<String>, codes: Arc<FxHashSet<String>>) -> Self {
        Self {
            column: column.into(),
            codes,
        }
    }
}

impl BatchFilter for CodeSetFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let values = string_column(batch, &self.column)?;
        Ok(values
            .iter()
            .map(|code| Some(code.is_some_and(|c| self.codes.contains(normalize_code(c).as_ref()))))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}
