//! Expression-based filtering
//!
//! Null-check expressions evaluated with Arrow's vectorized kernels.

use std::collections::HashSet;

use arrow::array::BooleanArray;
use arrow::compute::{and_kleene, is_not_null};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::core::BatchFilter;
use crate::utils::arrow::column_by_name;

/// Represents a filter expression over the columns of a batch
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column is not null
    IsNotNull(String),

    /// Logical AND of expressions
    And(Vec<Expr>),
}

impl Expr {
    /// All of the given columns are non-null
    #[must_use]
    pub fn all_not_null<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::And(
            columns
                .iter()
                .map(|c| Self::IsNotNull(c.as_ref().to_string()))
                .collect(),
        )
    }

    /// Returns a set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    fn collect_required_columns(&self, columns: &mut HashSet<String>) {
        match self {
            Self::IsNotNull(col) => {
                columns.insert(col.clone());
            }
            Self::And(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
        }
    }
}

/// Evaluate an expression against a record batch
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::IsNotNull(col) => Ok(is_not_null(column_by_name(batch, col)?)?),
        Expr::And(exprs) => exprs.iter().try_fold(
            BooleanArray::from(vec![true; batch.num_rows()]),
            |acc, expr| Ok(and_kleene(&acc, &evaluate_expr(batch, expr)?)?),
        ),
    }
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    expr: Expr,
}

impl ExpressionFilter {
    /// Create a new expression filter
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

impl BatchFilter for ExpressionFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        evaluate_expr(batch, &self.expr)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.expr.required_columns()
    }
}
