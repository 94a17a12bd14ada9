//! Decoherence parameters, operation durations and calibration files

use crate::circuit::Instruction;
use crate::gate::canonical_name;
use crate::{DecoherenceError, QubitId, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// T1 and T2 per qubit
///
/// Values are validated on construction; lookups of qubits that are absent
/// from either mapping fail with `MissingParameter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoherenceParams {
    t1: HashMap<QubitId, f64>,
    t2: HashMap<QubitId, f64>,
}

impl DecoherenceParams {
    /// # Errors
    /// `InvalidParameter` if any time constant is not positive and finite
    pub fn new(t1: HashMap<QubitId, f64>, t2: HashMap<QubitId, f64>) -> Result<Self> {
        for (label, map) in [("t1", &t1), ("t2", &t2)] {
            for (qubit, value) in map {
                if !value.is_finite() || *value <= 0.0 {
                    return Err(DecoherenceError::invalid_parameter(
                        format!("{}[qubit {}]", label, qubit),
                        *value,
                        "must be positive and finite",
                    ));
                }
            }
        }
        Ok(Self { t1, t2 })
    }

    /// Same time constants for every qubit in `qubits`
    pub fn uniform(qubits: impl IntoIterator<Item = QubitId>, t1: f64, t2: f64) -> Result<Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        Self::new(
            qubits.iter().map(|q| (*q, t1)).collect(),
            qubits.iter().map(|q| (*q, t2)).collect(),
        )
    }

    pub fn t1(&self, qubit: QubitId) -> Result<f64> {
        self.t1
            .get(&qubit)
            .copied()
            .ok_or_else(|| DecoherenceError::missing_t1(qubit))
    }

    pub fn t2(&self, qubit: QubitId) -> Result<f64> {
        self.t2
            .get(&qubit)
            .copied()
            .ok_or_else(|| DecoherenceError::missing_t2(qubit))
    }

    /// `(t1, t2)` for a qubit
    pub fn get(&self, qubit: QubitId) -> Result<(f64, f64)> {
        Ok((self.t1(qubit)?, self.t2(qubit)?))
    }
}

/// Duration of each operation, keyed by canonical name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationTable {
    durations: HashMap<String, f64>,
}

impl DurationTable {
    /// Names are canonicalized, so `"cnot"` and `"CX"` share an entry.
    ///
    /// # Errors
    /// `InvalidParameter` if a duration is not positive and finite
    pub fn new<S: AsRef<str>>(durations: impl IntoIterator<Item = (S, f64)>) -> Result<Self> {
        let mut table = HashMap::new();
        for (name, value) in durations {
            let name = canonical_name(name.as_ref());
            if !value.is_finite() || value <= 0.0 {
                return Err(DecoherenceError::invalid_parameter(
                    format!("duration[{}]", name),
                    value,
                    "must be positive and finite",
                ));
            }
            table.insert(name, value);
        }
        Ok(Self { durations: table })
    }

    /// Declared duration of an operation name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.durations.get(&canonical_name(name)).copied()
    }

    /// Duration of an instruction; annotations and ticks take no time
    ///
    /// # Errors
    /// `MissingParameter` if the operation has no entry
    pub fn duration_of(&self, instruction: &Instruction) -> Result<f64> {
        if instruction.is_annotation() {
            return Ok(0.0);
        }
        self.durations
            .get(instruction.name())
            .copied()
            .ok_or_else(|| DecoherenceError::missing_duration(instruction.name()))
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Device calibration as stored on disk
///
/// ```json
/// {
///   "t1": { "0": 55.4, "1": 61.0 },
///   "t2": { "0": 22.3, "1": 30.5 },
///   "durations": { "R": 102.0, "CX": 40.0, "M": 600.0 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub t1: BTreeMap<QubitId, f64>,
    pub t2: BTreeMap<QubitId, f64>,
    pub durations: BTreeMap<String, f64>,
}

impl Calibration {
    /// Parse a calibration from JSON
    ///
    /// # Errors
    /// `Parse` with the offending line if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DecoherenceError::parse(e.line(), e.to_string()))
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DecoherenceError::parse(0, e.to_string()))
    }

    /// Validated per-qubit time constants
    pub fn params(&self) -> Result<DecoherenceParams> {
        DecoherenceParams::new(
            self.t1.iter().map(|(q, v)| (*q, *v)).collect(),
            self.t2.iter().map(|(q, v)| (*q, *v)).collect(),
        )
    }

    /// Validated duration table
    pub fn duration_table(&self) -> Result<DurationTable> {
        DurationTable::new(self.durations.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}
