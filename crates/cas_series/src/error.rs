use cas_engine::IntegrationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("interval_sup cannot be less than interval_inf")]
    InvalidInterval,
    #[error("Interval [{lower}, {upper}] has zero length")]
    EmptyInterval { lower: String, upper: String },
    #[error("Interval [{lower}, {upper}] is unbounded")]
    UnboundedInterval { lower: String, upper: String },
    #[error("Cannot decide whether {upper} >= {lower}")]
    IndeterminateInterval { lower: String, upper: String },
    #[error("Expansion variable must be a symbol, got '{0}'")]
    NotAVariable(String),
    #[error(transparent)]
    Engine(#[from] IntegrationError),
}
