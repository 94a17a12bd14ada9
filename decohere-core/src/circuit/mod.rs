//! QEC circuit representation
//!
//! A [`Circuit`] is an ordered list of items, each either an
//! [`Instruction`] or a `REPEAT` block holding a nested circuit. The text
//! form follows the stim circuit language; see [`parser`].

mod instruction;
pub mod parser;

pub use instruction::{Instruction, PauliKind, Target, MAX_OBSERVABLES};

use crate::gate::{Gate, GateKind};
use crate::{DecoherenceError, QubitId, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One entry of a circuit
#[derive(Clone, Debug, PartialEq)]
pub enum CircuitItem {
    Instruction(Instruction),
    Repeat { count: usize, body: Circuit },
}

/// A QEC circuit
///
/// # Example
/// ```
/// use decohere_core::Circuit;
///
/// let circuit: Circuit = "R 0 1\nTICK\nM 0 1\nDETECTOR rec[-1] rec[-2]".parse().unwrap();
/// assert_eq!(circuit.num_ticks(), 1);
/// assert_eq!(circuit.num_measurements(), 2);
/// assert_eq!(circuit.num_detectors(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    items: Vec<CircuitItem>,
}

impl Circuit {
    /// Create an empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from a flat instruction sequence
    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            items: instructions
                .into_iter()
                .map(CircuitItem::Instruction)
                .collect(),
        }
    }

    /// Number of top-level items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the circuit has no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top-level items in order
    pub fn items(&self) -> &[CircuitItem] {
        &self.items
    }

    /// Append an instruction
    pub fn push(&mut self, instruction: Instruction) {
        self.items.push(CircuitItem::Instruction(instruction));
    }

    /// Append a `REPEAT count { body }` block
    ///
    /// # Errors
    /// Returns a structural error when `count` is zero
    pub fn push_repeat(&mut self, count: usize, body: Circuit) -> Result<()> {
        if count == 0 {
            return Err(DecoherenceError::structural("REPEAT count must be positive"));
        }
        self.items.push(CircuitItem::Repeat { count, body });
        Ok(())
    }

    /// Expand every `REPEAT` block and fold `SHIFT_COORDS` into the
    /// coordinates of later `DETECTOR` and `QUBIT_COORDS` instructions
    pub fn flattened_instructions(&self) -> Vec<Instruction> {
        let mut out = Vec::with_capacity(self.len());
        let mut offset: Vec<f64> = Vec::new();
        self.flatten_into(&mut out, &mut offset);
        out
    }

    /// Flattened copy of this circuit
    pub fn flattened(&self) -> Circuit {
        Circuit::from_instructions(self.flattened_instructions())
    }

    fn flatten_into(&self, out: &mut Vec<Instruction>, offset: &mut Vec<f64>) {
        for item in &self.items {
            match item {
                CircuitItem::Instruction(inst) => match inst.gate() {
                    Some(Gate::ShiftCoords) => {
                        if offset.len() < inst.args().len() {
                            offset.resize(inst.args().len(), 0.0);
                        }
                        for (o, a) in offset.iter_mut().zip(inst.args()) {
                            *o += a;
                        }
                    }
                    Some(Gate::Detector) | Some(Gate::QubitCoords) => {
                        let mut shifted = inst.clone();
                        for (a, o) in shifted.args_mut().iter_mut().zip(offset.iter()) {
                            *a += o;
                        }
                        out.push(shifted);
                    }
                    _ => out.push(inst.clone()),
                },
                CircuitItem::Repeat { count, body } => {
                    for _ in 0..*count {
                        body.flatten_into(out, offset);
                    }
                }
            }
        }
    }

    fn count_where(&self, f: &impl Fn(&Instruction) -> usize) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                CircuitItem::Instruction(inst) => f(inst),
                CircuitItem::Repeat { count, body } => count * body.count_where(f),
            })
            .sum()
    }

    fn any_instruction(&self, f: &impl Fn(&Instruction) -> bool) -> bool {
        self.items.iter().any(|item| match item {
            CircuitItem::Instruction(inst) => f(inst),
            CircuitItem::Repeat { body, .. } => body.any_instruction(f),
        })
    }

    fn visit(&self, f: &mut impl FnMut(&Instruction)) {
        for item in &self.items {
            match item {
                CircuitItem::Instruction(inst) => f(inst),
                CircuitItem::Repeat { body, .. } => body.visit(f),
            }
        }
    }

    /// Number of `TICK` markers after flattening
    pub fn num_ticks(&self) -> usize {
        self.count_where(&|inst| usize::from(inst.is_tick()))
    }

    /// Number of measurement results after flattening
    pub fn num_measurements(&self) -> usize {
        self.count_where(&Instruction::num_measurements)
    }

    /// Number of `DETECTOR` instructions after flattening
    pub fn num_detectors(&self) -> usize {
        self.count_where(&|inst| usize::from(inst.gate() == Some(Gate::Detector)))
    }

    /// One past the largest observable index used by `OBSERVABLE_INCLUDE`
    ///
    /// # Errors
    /// `StructuralError` for an index outside `0..MAX_OBSERVABLES`
    pub fn num_observables(&self) -> Result<usize> {
        let mut n = 0;
        let mut invalid = None;
        self.visit(&mut |inst| {
            if inst.gate() == Some(Gate::ObservableInclude) && invalid.is_none() {
                match inst.observable_index() {
                    Ok(index) => n = n.max(index + 1),
                    Err(e) => invalid = Some(e),
                }
            }
        });
        match invalid {
            Some(e) => Err(e),
            None => Ok(n),
        }
    }

    /// Every qubit addressed by any instruction
    pub fn qubits(&self) -> BTreeSet<QubitId> {
        let mut qubits = BTreeSet::new();
        self.visit(&mut |inst| qubits.extend(inst.qubits()));
        qubits
    }

    /// Qubits addressed by a measurement
    pub fn measured_qubits(&self) -> BTreeSet<QubitId> {
        let mut qubits = BTreeSet::new();
        self.visit(&mut |inst| {
            if matches!(
                inst.kind(),
                Some(GateKind::Measure(_))
                    | Some(GateKind::MeasureReset(_))
                    | Some(GateKind::PauliProductMeasure)
            ) {
                qubits.extend(inst.qubits());
            }
        });
        qubits
    }

    /// Whether any instruction is a noise channel
    pub fn has_noise(&self) -> bool {
        self.any_instruction(&Instruction::is_noise)
    }

    /// Absolute measurement indices referenced by each detector, in order
    ///
    /// # Errors
    /// Returns a structural error when a record reference reaches before the
    /// first measurement
    pub fn detector_records(&self) -> Result<Vec<Vec<usize>>> {
        let resolved = RecordResolver::resolve(&self.flattened_instructions())?;
        Ok(resolved.detectors)
    }

    /// Absolute measurement indices included in each observable
    ///
    /// # Errors
    /// Same conditions as [`Circuit::detector_records`]
    pub fn observable_records(&self) -> Result<Vec<Vec<usize>>> {
        let resolved = RecordResolver::resolve(&self.flattened_instructions())?;
        Ok(resolved.observables)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        for item in &self.items {
            match item {
                CircuitItem::Instruction(inst) => writeln!(f, "{}{}", indent, inst)?,
                CircuitItem::Repeat { count, body } => {
                    writeln!(f, "{}REPEAT {} {{", indent, count)?;
                    body.fmt_indented(f, depth + 1)?;
                    writeln!(f, "{}}}", indent)?;
                }
            }
        }
        Ok(())
    }
}

/// Measurement indices resolved for detectors and observables
pub(crate) struct RecordResolver {
    pub detectors: Vec<Vec<usize>>,
    pub observables: Vec<Vec<usize>>,
}

impl RecordResolver {
    pub(crate) fn resolve(instructions: &[Instruction]) -> Result<Self> {
        let mut measured = 0usize;
        let mut detectors = Vec::new();
        let mut observables: Vec<Vec<usize>> = Vec::new();
        for inst in instructions {
            match inst.gate() {
                Some(Gate::Detector) => detectors.push(absolute_records(inst, measured)?),
                Some(Gate::ObservableInclude) => {
                    let index = inst.observable_index()?;
                    if observables.len() <= index {
                        observables.resize(index + 1, Vec::new());
                    }
                    let records = absolute_records(inst, measured)?;
                    observables[index].extend(records);
                }
                _ => measured += inst.num_measurements(),
            }
        }
        Ok(Self {
            detectors,
            observables,
        })
    }
}

fn absolute_records(inst: &Instruction, measured: usize) -> Result<Vec<usize>> {
    inst.lookbacks()
        .map(|k| {
            if k == 0 || k > measured {
                Err(DecoherenceError::structural(format!(
                    "'{}' references rec[-{}] but only {} measurements precede it",
                    inst, k, measured
                )))
            } else {
                Ok(measured - k)
            }
        })
        .collect()
}

impl FromIterator<Instruction> for Circuit {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Circuit::from_instructions(iter)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl FromStr for Circuit {
    type Err = DecoherenceError;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse_circuit(s)
    }
}
