//! Matching decoders for decoherence-limited QEC experiments
//!
//! [`build_decoder`] takes a noiseless tick-structured circuit plus per-qubit
//! T1/T2 times and per-operation durations, and returns an [`MwpmDecoder`]
//! whose edge weights reflect the decoherence each error location sees.
//!
//! # Example
//! ```
//! use decohere_core::circuits::repetition_code_memory;
//! use decohere_match::build_decoder;
//! use std::collections::HashMap;
//!
//! let circuit = repetition_code_memory(3, 2).unwrap();
//! let t1 = circuit.qubits().into_iter().map(|q| (q, 500.0)).collect::<HashMap<_, _>>();
//! let t2 = circuit.qubits().into_iter().map(|q| (q, 400.0)).collect::<HashMap<_, _>>();
//! let ops: HashMap<String, f64> = [("R", 10.0), ("CX", 20.0), ("MR", 50.0), ("M", 50.0)]
//!     .into_iter()
//!     .map(|(k, v)| (k.to_string(), v))
//!     .collect();
//!
//! let mut decoder = build_decoder(&circuit, &t1, &t2, &ops).unwrap();
//! let quiet = vec![false; decoder.num_detectors()];
//! assert_eq!(decoder.decode(&quiet).unwrap(), vec![false]);
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod graph;
pub mod pipeline;

pub use config::DecoderConfig;
pub use decoder::MwpmDecoder;
pub use error::DecoderError;
pub use graph::{MatchingEdge, MatchingGraph};
pub use pipeline::{build_decoder, build_decoder_with, noisy_model};

/// Type alias for results in decohere-match
pub type Result<T> = std::result::Result<T, DecoderError>;
