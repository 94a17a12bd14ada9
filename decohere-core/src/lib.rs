//! Core types for decoherence-aware QEC noise modeling
//!
//! This crate provides:
//! - [`Circuit`]: QEC circuit IR with a stim-style text format
//! - [`pauli_probabilities`]: T1/T2 Pauli-twirled error probabilities
//! - [`Annotator`] / [`annotate`]: tick-based injection of those errors
//!
//! # Example
//! ```
//! use decohere_core::{circuits, Annotator, DecoherenceParams, DurationTable};
//!
//! let circuit = circuits::repetition_code_memory(3, 2).unwrap();
//! let params = DecoherenceParams::uniform(circuit.qubits(), 55.4, 22.3).unwrap();
//! let durations = DurationTable::new([("R", 102.0), ("CX", 40.0), ("MR", 600.0), ("M", 500.0)])
//!     .unwrap();
//!
//! let noisy = Annotator::new(params, durations).annotate(&circuit).unwrap();
//! let events = noisy.to_string().matches("PAULI_CHANNEL_1").count();
//! assert_eq!(events, circuit.qubits().len() * (circuit.num_ticks() + 1));
//! ```

pub mod annotate;
pub mod circuit;
pub mod circuits;
pub mod config;
pub mod error;
pub mod gate;
pub mod noise;
pub mod qubit;

// Re-exports for convenience
pub use annotate::{annotate, annotate_with, Annotator, PauliErrorEvent};
pub use circuit::{Circuit, CircuitItem, Instruction, Target};
pub use config::{AnnotatorConfig, NoisePlacement, QubitUniverse, RegimePolicy};
pub use error::{DecoherenceError, ParameterKind};
pub use gate::{Gate, GateKind};
pub use noise::{
    log_likelihood_weight, pauli_probabilities, Calibration, DecoherenceParams, DurationTable,
    PauliProbabilities,
};
pub use qubit::QubitId;

/// Type alias for results in decohere
pub type Result<T> = std::result::Result<T, DecoherenceError>;
