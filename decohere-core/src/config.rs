//! Annotator configuration

use serde::{Deserialize, Serialize};

/// What to do with a qubit whose T2 exceeds twice its T1
///
/// The closed-form model yields a negative Z probability in that regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimePolicy {
    /// Fail with `InvalidParameter` before annotating
    #[default]
    Reject,
    /// Emit the computed probabilities unchanged and log a warning
    PassThrough,
}

/// Which qubits receive noise events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QubitUniverse {
    /// Every qubit targeted by any instruction, `QUBIT_COORDS` included
    #[default]
    Referenced,
    /// Only qubits that are measured somewhere in the circuit
    Measured,
}

/// Where decoherence events are placed in the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoisePlacement {
    /// One event per qubit after each tick, spanning the tick's slowest
    /// operation
    #[default]
    PerTick,
    /// An event on each operated qubit right after the operation, for its
    /// own duration. At each `TICK` the qubits the layer left untouched idle
    /// for the layer's duration. Every operation of a layer must take the
    /// same time and touch distinct qubits.
    PerOperation,
}

/// Configuration for circuit annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Handling of t2 > 2·t1
    ///
    /// Default: `Reject`
    pub regime: RegimePolicy,

    /// Qubits that are tracked and receive one event per tick
    ///
    /// Default: `Referenced`
    pub universe: QubitUniverse,

    /// Default: `PerTick`
    pub placement: NoisePlacement,
}

impl AnnotatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any T1/T2 combination and annotate only measured qubits
    pub fn permissive() -> Self {
        Self {
            regime: RegimePolicy::PassThrough,
            universe: QubitUniverse::Measured,
            placement: NoisePlacement::PerTick,
        }
    }

    /// Set the regime policy
    pub fn with_regime(mut self, regime: RegimePolicy) -> Self {
        self.regime = regime;
        self
    }

    /// Set the qubit universe
    pub fn with_universe(mut self, universe: QubitUniverse) -> Self {
        self.universe = universe;
        self
    }

    pub fn with_placement(mut self, placement: NoisePlacement) -> Self {
        self.placement = placement;
        self
    }
}
