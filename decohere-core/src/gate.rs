//! Operation vocabulary understood by the circuit IR
//!
//! Instructions keep their (canonical, upper-case) name as a string so that
//! duration tables can be keyed by whatever names a circuit uses. [`Gate`]
//! classifies the names this workspace knows how to reason about.

use std::fmt;

/// Measurement or reset basis
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Basis {
    X,
    Y,
    Z,
}

/// Broad category of an operation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Zero-duration bookkeeping (`DETECTOR`, `QUBIT_COORDS`, ...)
    Annotation,
    /// The tick marker separating time slices
    Tick,
    /// Clifford unitary acting on `arity` qubits per application
    Unitary { arity: usize },
    /// Single-qubit measurement
    Measure(Basis),
    /// Single-qubit measurement followed by reset in the same basis
    MeasureReset(Basis),
    /// Single-qubit reset
    Reset(Basis),
    /// Pauli product measurement (`MPP`)
    PauliProductMeasure,
    /// Stochastic noise channel
    Noise,
}

/// Known operations
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    Tick,
    Detector,
    ObservableInclude,
    QubitCoords,
    ShiftCoords,
    I,
    X,
    Y,
    Z,
    H,
    S,
    SDag,
    SqrtX,
    SqrtXDag,
    SqrtY,
    SqrtYDag,
    Cx,
    Cy,
    Cz,
    Swap,
    M,
    Mx,
    My,
    Mr,
    Mrx,
    Mry,
    R,
    Rx,
    Ry,
    Mpp,
    PauliChannel1,
    XError,
    YError,
    ZError,
    Depolarize1,
    Depolarize2,
    PauliChannel2,
    CorrelatedError,
}

impl Gate {
    /// Look up a gate by (canonical) name
    pub fn from_name(name: &str) -> Option<Gate> {
        let gate = match name {
            "TICK" => Gate::Tick,
            "DETECTOR" => Gate::Detector,
            "OBSERVABLE_INCLUDE" => Gate::ObservableInclude,
            "QUBIT_COORDS" => Gate::QubitCoords,
            "SHIFT_COORDS" => Gate::ShiftCoords,
            "I" => Gate::I,
            "X" => Gate::X,
            "Y" => Gate::Y,
            "Z" => Gate::Z,
            "H" => Gate::H,
            "S" => Gate::S,
            "S_DAG" => Gate::SDag,
            "SQRT_X" => Gate::SqrtX,
            "SQRT_X_DAG" => Gate::SqrtXDag,
            "SQRT_Y" => Gate::SqrtY,
            "SQRT_Y_DAG" => Gate::SqrtYDag,
            "CX" => Gate::Cx,
            "CY" => Gate::Cy,
            "CZ" => Gate::Cz,
            "SWAP" => Gate::Swap,
            "M" => Gate::M,
            "MX" => Gate::Mx,
            "MY" => Gate::My,
            "MR" => Gate::Mr,
            "MRX" => Gate::Mrx,
            "MRY" => Gate::Mry,
            "R" => Gate::R,
            "RX" => Gate::Rx,
            "RY" => Gate::Ry,
            "MPP" => Gate::Mpp,
            "PAULI_CHANNEL_1" => Gate::PauliChannel1,
            "X_ERROR" => Gate::XError,
            "Y_ERROR" => Gate::YError,
            "Z_ERROR" => Gate::ZError,
            "DEPOLARIZE1" => Gate::Depolarize1,
            "DEPOLARIZE2" => Gate::Depolarize2,
            "PAULI_CHANNEL_2" => Gate::PauliChannel2,
            "E" => Gate::CorrelatedError,
            _ => return None,
        };
        Some(gate)
    }

    /// Canonical name as written in circuit text
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Tick => "TICK",
            Gate::Detector => "DETECTOR",
            Gate::ObservableInclude => "OBSERVABLE_INCLUDE",
            Gate::QubitCoords => "QUBIT_COORDS",
            Gate::ShiftCoords => "SHIFT_COORDS",
            Gate::I => "I",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::SDag => "S_DAG",
            Gate::SqrtX => "SQRT_X",
            Gate::SqrtXDag => "SQRT_X_DAG",
            Gate::SqrtY => "SQRT_Y",
            Gate::SqrtYDag => "SQRT_Y_DAG",
            Gate::Cx => "CX",
            Gate::Cy => "CY",
            Gate::Cz => "CZ",
            Gate::Swap => "SWAP",
            Gate::M => "M",
            Gate::Mx => "MX",
            Gate::My => "MY",
            Gate::Mr => "MR",
            Gate::Mrx => "MRX",
            Gate::Mry => "MRY",
            Gate::R => "R",
            Gate::Rx => "RX",
            Gate::Ry => "RY",
            Gate::Mpp => "MPP",
            Gate::PauliChannel1 => "PAULI_CHANNEL_1",
            Gate::XError => "X_ERROR",
            Gate::YError => "Y_ERROR",
            Gate::ZError => "Z_ERROR",
            Gate::Depolarize1 => "DEPOLARIZE1",
            Gate::Depolarize2 => "DEPOLARIZE2",
            Gate::PauliChannel2 => "PAULI_CHANNEL_2",
            Gate::CorrelatedError => "E",
        }
    }

    /// Category of this gate
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Tick => GateKind::Tick,
            Gate::Detector | Gate::ObservableInclude | Gate::QubitCoords | Gate::ShiftCoords => {
                GateKind::Annotation
            }
            Gate::I
            | Gate::X
            | Gate::Y
            | Gate::Z
            | Gate::H
            | Gate::S
            | Gate::SDag
            | Gate::SqrtX
            | Gate::SqrtXDag
            | Gate::SqrtY
            | Gate::SqrtYDag => GateKind::Unitary { arity: 1 },
            Gate::Cx | Gate::Cy | Gate::Cz | Gate::Swap => GateKind::Unitary { arity: 2 },
            Gate::M => GateKind::Measure(Basis::Z),
            Gate::Mx => GateKind::Measure(Basis::X),
            Gate::My => GateKind::Measure(Basis::Y),
            Gate::Mr => GateKind::MeasureReset(Basis::Z),
            Gate::Mrx => GateKind::MeasureReset(Basis::X),
            Gate::Mry => GateKind::MeasureReset(Basis::Y),
            Gate::R => GateKind::Reset(Basis::Z),
            Gate::Rx => GateKind::Reset(Basis::X),
            Gate::Ry => GateKind::Reset(Basis::Y),
            Gate::Mpp => GateKind::PauliProductMeasure,
            Gate::PauliChannel1
            | Gate::XError
            | Gate::YError
            | Gate::ZError
            | Gate::Depolarize1
            | Gate::Depolarize2
            | Gate::PauliChannel2
            | Gate::CorrelatedError => GateKind::Noise,
        }
    }

    /// Whether this gate produces measurement records
    pub fn produces_records(&self) -> bool {
        matches!(
            self.kind(),
            GateKind::Measure(_) | GateKind::MeasureReset(_) | GateKind::PauliProductMeasure
        )
    }

    /// Whether this gate occupies no time on hardware
    pub fn is_annotation(&self) -> bool {
        matches!(self.kind(), GateKind::Annotation | GateKind::Tick)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize an operation name: upper-case it and resolve aliases
///
/// # Example
/// ```
/// use decohere_core::gate::canonical_name;
/// assert_eq!(canonical_name("cnot"), "CX");
/// assert_eq!(canonical_name("MRZ"), "MR");
/// assert_eq!(canonical_name("custom_gate"), "CUSTOM_GATE");
/// ```
pub fn canonical_name(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    let alias = match upper.as_str() {
        "CNOT" | "ZCX" => "CX",
        "ZCY" => "CY",
        "ZCZ" => "CZ",
        "H_XZ" => "H",
        "SQRT_Z" => "S",
        "SQRT_Z_DAG" => "S_DAG",
        "MZ" => "M",
        "MRZ" => "MR",
        "RZ" => "R",
        "CORRELATED_ERROR" => "E",
        _ => return upper,
    };
    alias.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for name in ["TICK", "H", "CX", "MR", "MPP", "PAULI_CHANNEL_1", "E"] {
            let gate = Gate::from_name(name).unwrap();
            assert_eq!(gate.name(), name);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(canonical_name("zcx"), "CX");
        assert_eq!(canonical_name("MZ"), "M");
        assert_eq!(canonical_name("RZ"), "R");
        assert_eq!(canonical_name("sqrt_z"), "S");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Gate::Cz.kind(), GateKind::Unitary { arity: 2 });
        assert_eq!(Gate::Mrx.kind(), GateKind::MeasureReset(Basis::X));
        assert_eq!(Gate::XError.kind(), GateKind::Noise);
        assert!(Gate::Detector.is_annotation());
        assert!(Gate::Tick.is_annotation());
        assert!(!Gate::R.is_annotation());
        assert!(Gate::Mpp.produces_records());
        assert!(!Gate::R.produces_records());
    }

    #[test]
    fn test_unknown_name() {
        assert!(Gate::from_name("FOO").is_none());
    }
}
