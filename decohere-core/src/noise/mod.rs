//! T1/T2 decoherence noise
//!
//! - [`pauli_probabilities`]: closed-form Pauli-twirled error probabilities
//!   for a qubit with relaxation time T1 and dephasing time T2
//! - [`AmplitudeDamping`], [`PhaseDamping`], [`ComposedChannel`] and
//!   [`pauli_twirl`]: the Kraus-operator form the closed form is derived from
//! - [`DecoherenceParams`], [`DurationTable`], [`Calibration`]: the inputs
//!   of circuit annotation
//! - [`log_likelihood_weight`]: decoder weights for injected probabilities
//!
//! # Usage
//!
//! ```
//! use decohere_core::noise::{pauli_twirl, ComposedChannel, pauli_probabilities};
//!
//! let channel = ComposedChannel::decoherence(55.4, 22.3, 102.0).unwrap();
//! let twirled = pauli_twirl(&channel).unwrap();
//! let closed = pauli_probabilities(55.4, 22.3, 102.0).unwrap();
//! assert!((twirled.pz - closed.pz).abs() < 1e-12);
//! ```

pub mod channels;
pub mod decoherence;
pub mod params;
pub mod time_tracker;
pub mod types;
pub mod weights;

pub use channels::{pauli_twirl, AmplitudeDamping, ComposedChannel, PhaseDamping};
pub use decoherence::{is_standard_regime, pauli_probabilities, PauliProbabilities};
pub use params::{Calibration, DecoherenceParams, DurationTable};
pub use time_tracker::QubitTimeTracker;
pub use types::{KrausOperator, NoiseChannel};
pub use weights::log_likelihood_weight;
