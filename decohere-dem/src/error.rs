//! Error types for detector error model derivation

use decohere_core::DecoherenceError;
use thiserror::Error;

/// Errors raised while deriving or parsing a detector error model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DemError {
    /// The circuit itself is malformed
    #[error(transparent)]
    Circuit(#[from] DecoherenceError),

    /// The circuit uses an operation the frame propagator cannot handle
    #[error("Unsupported instruction '{0}'")]
    UnsupportedInstruction(String),

    /// A probability is negative, above one, or not finite
    #[error("Invalid probability {value} in '{context}'")]
    InvalidProbability { context: String, value: f64 },

    /// A disjoint Pauli channel has no exact independent decomposition
    #[error("'{0}' cannot be expressed as independent X/Y/Z errors; enable approximate_disjoint_errors to use its probabilities directly")]
    NonIndependentChannel(String),

    /// Observable masks hold at most 64 observables
    #[error("Too many observables: {0} (at most 64 supported)")]
    TooManyObservables(usize),

    /// DEM text could not be parsed
    #[error("DEM parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl DemError {
    pub fn invalid_probability(context: impl Into<String>, value: f64) -> Self {
        Self::InvalidProbability {
            context: context.into(),
            value,
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
