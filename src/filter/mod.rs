//! Row filtering over Arrow record batches
//!
//! Stateless filters implement [`BatchFilter`]; exact-duplicate removal is
//! stateful and lives in [`RowDeduplicator`].

pub mod code;
pub mod core;
pub mod distinct;
pub mod expr;

pub use code::{CodeSetFilter, ExcludedCodesFilter, VocabularyFilter};
pub use self::core::{BatchFilter, filter_record_batch};
pub use distinct::{RowDeduplicator, distinct_batches};
pub use expr::{Expr, ExpressionFilter, evaluate_expr};
