//! Detector error models for noisy QEC circuits
//!
//! [`DetectorErrorModel::from_circuit`] propagates Pauli frames through a
//! circuit annotated by `decohere-core` and lists every independent error
//! mechanism with the detectors and observables it flips. Models print and
//! parse as stim-style DEM text.
//!
//! # Example
//! ```
//! use decohere_core::Circuit;
//! use decohere_dem::{DemOptions, DetectorErrorModel};
//!
//! let circuit: Circuit = "R 0\nX_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]".parse().unwrap();
//! let dem = DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap();
//! assert_eq!(dem.to_string(), "error(0.1) D0\ndetector D0\n");
//! ```

pub mod analyzer;
pub mod channel;
pub mod error;
pub mod frame;
pub mod parser;
pub mod types;

pub use analyzer::DemOptions;
pub use error::DemError;
pub use parser::parse_dem;
pub use types::{combine_probabilities, DetectorErrorModel, ErrorMechanism, Symptom};

/// Type alias for results in decohere-dem
pub type Result<T> = std::result::Result<T, DemError>;
