//! Expression arena, symbols and display for the CAS workspace.

pub mod builtin;
pub mod display;
pub mod error;
pub mod expression;
pub mod ordering;
pub mod symbol;
pub mod visitor;

pub use builtin::BuiltinFn;
pub use display::DisplayExpr;
pub use error::AstError;
pub use expression::{Constant, Context, ContextStats, Expr, ExprId};
pub use ordering::compare_expr;
pub use symbol::{Assumptions, SymbolId, SymbolTable};
pub use visitor::{contains_constant, contains_symbol, free_symbols, FreeSymbolCollector, Visitor};
