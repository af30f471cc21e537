//! Error types for cas_ast crate.

use crate::symbol::Assumptions;
use thiserror::Error;

/// Errors that can occur in AST operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstError {
    /// A symbol was re-declared with different assumptions
    #[error("symbol '{name}' already declared as {existing:?}, cannot redeclare as {requested:?}")]
    AssumptionConflict {
        name: String,
        existing: Assumptions,
        requested: Assumptions,
    },
}
