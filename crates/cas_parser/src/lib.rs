//! Infix expression parser producing nodes in a `cas_ast::Context`.

pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::parse;
