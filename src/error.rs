// src/error.rs
use thiserror::Error;
use crate::histogram::Axis;

/// Invalid inputs to a systematics run.
///
/// Every variant is raised while validating sources, settings or the nominal
/// histogram, before any sampling happens. A computation that passed
/// validation cannot fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Systematic source '{name}' has invalid fraction {fraction}; expected a finite value > 0")]
    InvalidFraction {
        name: String,
        fraction: f64,
    },

    #[error("Sample count must be > 0 when sampled sources are registered")]
    InvalidSampleCount,

    #[error("Systematic source '{0}' is registered more than once")]
    DuplicateSource(String),

    #[error("Systematic source name cannot be empty")]
    EmptySourceName,

    #[error("Systematic source name '{0}' cannot contain '/'")]
    InvalidSourceName(String),

    #[error("Systematic source '{0}' has the same name as the nominal histogram in a flat layout")]
    SourceShadowsNominal(String),

    #[error("Histogram has {found} bins, expected {expected}")]
    BinCountMismatch {
        expected: usize,
        found: usize,
    },

    #[error("Nominal histogram binning {found:?} does not match the configured binning {expected:?}")]
    BinningMismatch {
        expected: Axis,
        found: Axis,
    },

    #[error("Invalid axis: {bins} bins on [{low}, {high}]")]
    InvalidAxis {
        bins: usize,
        low: f64,
        high: f64,
    },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
