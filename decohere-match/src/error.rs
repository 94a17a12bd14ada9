//! Error types for decoder construction and decoding

use decohere_core::DecoherenceError;
use decohere_dem::DemError;
use thiserror::Error;

/// Errors raised while building or running a matching decoder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecoderError {
    #[error(transparent)]
    Decoherence(#[from] DecoherenceError),

    #[error(transparent)]
    Dem(#[from] DemError),

    /// An error mechanism flips more than two detectors
    #[error("Error mechanism flipping detectors {detectors:?} is not graphlike")]
    NonGraphlike { detectors: Vec<u32> },

    /// The model has no edges to match along
    #[error("Detector error model has no matchable error mechanisms")]
    EmptyModel,

    /// Defects that no set of edges can explain
    #[error("Defect at detector {0} cannot be matched")]
    UnmatchableDefect(usize),

    /// Syndrome does not have one entry per detector
    #[error("Syndrome has {actual} entries, expected {expected}")]
    SyndromeLength { expected: usize, actual: usize },

    /// Defect index past the last detector
    #[error("Detector {detector} out of range (model has {num_detectors})")]
    UnknownDetector { detector: usize, num_detectors: usize },
}
