//! Truncated and symbolic Fourier series built on the `cas_engine`
//! integrator.

pub mod error;
pub mod fourier;
pub mod interval;

pub use error::SeriesError;
pub use fourier::{expand_symbolic, expand_truncated, fourier_terms, FourierSeries, Harmonic};
pub use interval::Interval;
