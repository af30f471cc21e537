//! Canonical-form simplifier, assumption queries, substitution and
//! integration over the `cas_ast` expression arena.

#![allow(clippy::too_many_arguments)] // Integration helpers thread context and variable through

pub mod assumptions;
pub mod engine;
pub mod error;
pub mod integration;
pub mod lowering;
pub mod normal_form;
pub mod options;
pub mod rule;
pub mod rules;
pub mod step;
pub mod substitute;
#[macro_use]
pub mod macros;

pub use assumptions::Sign;
pub use engine::Simplifier;
pub use error::IntegrationError;
pub use integration::{integrate, integrate_definite, integrate_definite_indexed, IndexedIntegral};
pub use normal_form::NormalForm;
pub use options::SimplifyOptions;
pub use rule::Rule;
pub use step::Step;
pub use substitute::substitute;
