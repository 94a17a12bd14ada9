//! Error types for decohere

use crate::QubitId;
use std::fmt;
use thiserror::Error;

/// Which input mapping a missing entry was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Relaxation time mapping
    T1,
    /// Dephasing time mapping
    T2,
    /// Operation duration table
    Duration,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::T1 => write!(f, "T1"),
            ParameterKind::T2 => write!(f, "T2"),
            ParameterKind::Duration => write!(f, "duration"),
        }
    }
}

/// Errors raised while building the noise model or annotating a circuit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecoherenceError {
    /// A time constant, duration, or probability is outside its domain
    #[error("Invalid parameter '{name}': {reason} (got {value})")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// A qubit or operation has no entry in a required mapping
    #[error("Missing {kind} for {key}")]
    MissingParameter { kind: ParameterKind, key: String },

    /// The circuit's tick or record structure is malformed
    #[error("Structural error: {0}")]
    StructuralError(String),

    /// Circuit text could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl DecoherenceError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// A qubit is absent from the T1 mapping
    pub fn missing_t1(qubit: QubitId) -> Self {
        Self::MissingParameter {
            kind: ParameterKind::T1,
            key: format!("qubit {}", qubit.index()),
        }
    }

    /// A qubit is absent from the T2 mapping
    pub fn missing_t2(qubit: QubitId) -> Self {
        Self::MissingParameter {
            kind: ParameterKind::T2,
            key: format!("qubit {}", qubit.index()),
        }
    }

    /// An operation is absent from the duration table
    pub fn missing_duration(operation: impl fmt::Display) -> Self {
        Self::MissingParameter {
            kind: ParameterKind::Duration,
            key: format!("operation '{}'", operation),
        }
    }

    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralError(message.into())
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_t1_names_qubit() {
        let err = DecoherenceError::missing_t1(QubitId::new(7));
        let msg = format!("{}", err);
        assert!(msg.contains("T1"));
        assert!(msg.contains("qubit 7"));
    }

    #[test]
    fn test_missing_duration_names_operation() {
        let err = DecoherenceError::missing_duration("MR");
        assert_eq!(
            err,
            DecoherenceError::MissingParameter {
                kind: ParameterKind::Duration,
                key: "operation 'MR'".to_string(),
            }
        );
        assert!(format!("{}", err).contains("'MR'"));
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = DecoherenceError::invalid_parameter("t1", -1.0, "must be positive");
        let msg = format!("{}", err);
        assert!(msg.contains("t1"));
        assert!(msg.contains("-1"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_parse_error_line() {
        let err = DecoherenceError::parse(3, "unknown target 'foo'");
        assert!(format!("{}", err).starts_with("Parse error on line 3"));
    }
}
