use thiserror::Error;

/// Failures of the symbolic integrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("Cannot integrate '{integrand}' with respect to '{var}'")]
    Unsupported { integrand: String, var: String },
    #[error("Frequency '{frequency}' is not provably nonzero")]
    PossiblyZeroFrequency { frequency: String },
    #[error("Integration variable must be a symbol, got '{0}'")]
    NotAVariable(String),
}
