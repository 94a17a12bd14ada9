//! Detector error model data

use crate::{DemError, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// The detectors and observables flipped by one error component
///
/// Detectors are kept sorted; a detector listed twice cancels out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symptom {
    pub detectors: SmallVec<[u32; 4]>,
    /// Bit `k` set when observable `k` flips
    pub observables: u64,
}

impl Symptom {
    /// Normalize detector ids: sort and drop pairs
    pub fn new(detectors: impl IntoIterator<Item = u32>, observables: u64) -> Self {
        let mut ids: SmallVec<[u32; 4]> = detectors.into_iter().collect();
        ids.sort_unstable();
        let mut out: SmallVec<[u32; 4]> = SmallVec::new();
        for id in ids {
            if out.last() == Some(&id) {
                out.pop();
            } else {
                out.push(id);
            }
        }
        Self {
            detectors: out,
            observables,
        }
    }

    /// Flips nothing
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty() && self.observables == 0
    }

    /// At most two detectors, so representable as a matching edge
    pub fn is_graphlike(&self) -> bool {
        self.detectors.len() <= 2
    }

    /// Combined effect of two components
    pub fn xor(&self, other: &Symptom) -> Symptom {
        Symptom::new(
            self.detectors.iter().chain(other.detectors.iter()).copied(),
            self.observables ^ other.observables,
        )
    }

    /// Indices of flipped observables
    pub fn observable_ids(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64u32).filter(move |k| (self.observables >> k) & 1 == 1)
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .detectors
            .iter()
            .map(|d| format!("D{}", d))
            .chain(self.observable_ids().map(|k| format!("L{}", k)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// An independent error: fires with `probability`, flipping the union of
/// its components
///
/// More than one component means the error was decomposed into graphlike
/// pieces (written `D0 D1 ^ D2` in DEM text).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorMechanism {
    pub probability: f64,
    pub components: Vec<Symptom>,
}

impl ErrorMechanism {
    pub fn new(probability: f64, symptom: Symptom) -> Self {
        Self {
            probability,
            components: vec![symptom],
        }
    }

    /// Total effect with components combined
    pub fn symptom(&self) -> Symptom {
        self.components
            .iter()
            .fold(Symptom::default(), |acc, c| acc.xor(c))
    }

    /// Every component is graphlike
    pub fn is_graphlike(&self) -> bool {
        self.components.iter().all(Symptom::is_graphlike)
    }
}

impl fmt::Display for ErrorMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error({})", self.probability)?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, " ^")?;
            }
            if !component.is_empty() {
                write!(f, " {}", component)?;
            }
        }
        Ok(())
    }
}

/// XOR-combine two independent probabilities of the same symptom
#[inline]
pub fn combine_probabilities(p1: f64, p2: f64) -> f64 {
    p1 + p2 - 2.0 * p1 * p2
}

/// A detector error model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorErrorModel {
    pub num_detectors: usize,
    pub num_observables: usize,
    /// Coordinates per detector, empty when none were declared
    pub detector_coords: Vec<Vec<f64>>,
    pub mechanisms: Vec<ErrorMechanism>,
}

impl DetectorErrorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of error mechanisms
    pub fn len(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanisms.is_empty()
    }

    /// Whether every mechanism can become a matching edge
    pub fn is_graphlike(&self) -> bool {
        self.mechanisms.iter().all(ErrorMechanism::is_graphlike)
    }

    /// Mechanisms flipping at least one observable
    pub fn logical_mechanisms(&self) -> impl Iterator<Item = &ErrorMechanism> {
        self.mechanisms
            .iter()
            .filter(|m| m.symptom().observables != 0)
    }

    /// Coordinates of detector `id`, if any were declared
    pub fn coords(&self, id: usize) -> Option<&[f64]> {
        self.detector_coords
            .get(id)
            .filter(|c| !c.is_empty())
            .map(|c| c.as_slice())
    }
}

impl fmt::Display for DetectorErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mechanism in &self.mechanisms {
            writeln!(f, "{}", mechanism)?;
        }
        for id in 0..self.num_detectors {
            match self.coords(id) {
                Some(coords) => {
                    let joined: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
                    writeln!(f, "detector({}) D{}", joined.join(", "), id)?;
                }
                None => writeln!(f, "detector D{}", id)?,
            }
        }
        for k in 0..self.num_observables {
            writeln!(f, "logical_observable L{}", k)?;
        }
        Ok(())
    }
}

impl FromStr for DetectorErrorModel {
    type Err = DemError;

    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse_dem(s)
    }
}

/// Accumulates mechanisms, merging those with identical components
#[derive(Debug, Default)]
pub(crate) struct MechanismSet {
    index: AHashMap<Vec<Symptom>, usize>,
    mechanisms: Vec<ErrorMechanism>,
}

impl MechanismSet {
    pub(crate) fn insert(&mut self, probability: f64, components: Vec<Symptom>) {
        if probability == 0.0 || components.iter().all(Symptom::is_empty) {
            return;
        }
        match self.index.get(&components) {
            Some(&i) => {
                let existing = &mut self.mechanisms[i];
                existing.probability = combine_probabilities(existing.probability, probability);
            }
            None => {
                self.index.insert(components.clone(), self.mechanisms.len());
                self.mechanisms.push(ErrorMechanism {
                    probability,
                    components,
                });
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.mechanisms.len()
    }

    pub(crate) fn into_mechanisms(self) -> Vec<ErrorMechanism> {
        self.mechanisms
    }
}
