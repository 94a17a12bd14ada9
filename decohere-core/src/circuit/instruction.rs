//! Instructions and their targets

use crate::gate::{canonical_name, Gate, GateKind};
use crate::noise::PauliProbabilities;
use crate::{DecoherenceError, QubitId, Result};
use smallvec::SmallVec;
use std::fmt;

/// Observable indices must lie below this bound
pub const MAX_OBSERVABLES: usize = 64;

/// Single-qubit Pauli used by `MPP` targets
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PauliKind {
    X,
    Y,
    Z,
}

impl fmt::Display for PauliKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauliKind::X => f.write_str("X"),
            PauliKind::Y => f.write_str("Y"),
            PauliKind::Z => f.write_str("Z"),
        }
    }
}

/// Instruction target
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Plain qubit, e.g. `5`
    Qubit(QubitId),
    /// Qubit whose measurement result is inverted, e.g. `!5`
    InvertedQubit(QubitId),
    /// Measurement record lookback, `Record(k)` is `rec[-k]`
    Record(usize),
    /// Pauli on a qubit, e.g. `X5`, used in products
    Pauli {
        pauli: PauliKind,
        qubit: QubitId,
        inverted: bool,
    },
    /// Product separator `*`
    Combiner,
}

impl Target {
    /// Plain qubit target
    pub fn qubit(index: usize) -> Self {
        Target::Qubit(QubitId::new(index))
    }

    /// Record lookback target `rec[-lookback]`
    pub fn rec(lookback: usize) -> Self {
        Target::Record(lookback)
    }

    /// The qubit this target addresses, if any
    pub fn qubit_id(&self) -> Option<QubitId> {
        match self {
            Target::Qubit(q) | Target::InvertedQubit(q) => Some(*q),
            Target::Pauli { qubit, .. } => Some(*qubit),
            Target::Record(_) | Target::Combiner => None,
        }
    }

    /// Record lookback, if this is a record target
    pub fn lookback(&self) -> Option<usize> {
        match self {
            Target::Record(k) => Some(*k),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Qubit(q) => write!(f, "{}", q),
            Target::InvertedQubit(q) => write!(f, "!{}", q),
            Target::Record(k) => write!(f, "rec[-{}]", k),
            Target::Pauli {
                pauli,
                qubit,
                inverted,
            } => {
                if *inverted {
                    write!(f, "!")?;
                }
                write!(f, "{}{}", pauli, qubit)
            }
            Target::Combiner => write!(f, "*"),
        }
    }
}

/// One circuit instruction: an operation name, numeric arguments, targets
///
/// # Example
/// ```
/// use decohere_core::circuit::{Instruction, Target};
///
/// let cx = Instruction::new("cnot", &[], &[Target::qubit(0), Target::qubit(1)]);
/// assert_eq!(cx.name(), "CX");
/// assert_eq!(cx.to_string(), "CX 0 1");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    name: String,
    args: SmallVec<[f64; 3]>,
    targets: SmallVec<[Target; 4]>,
}

impl Instruction {
    /// Create an instruction; the name is canonicalized
    pub fn new(name: &str, args: &[f64], targets: &[Target]) -> Self {
        Self {
            name: canonical_name(name),
            args: SmallVec::from_slice(args),
            targets: SmallVec::from_slice(targets),
        }
    }

    /// A bare `TICK` marker
    pub fn tick() -> Self {
        Self::new("TICK", &[], &[])
    }

    /// `PAULI_CHANNEL_1(px, py, pz) qubit`
    pub fn pauli_channel_1(qubit: QubitId, probabilities: PauliProbabilities) -> Self {
        Self::new(
            "PAULI_CHANNEL_1",
            &[probabilities.px, probabilities.py, probabilities.pz],
            &[Target::Qubit(qubit)],
        )
    }

    /// Canonical operation name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parenthesized numeric arguments
    #[inline]
    pub fn args(&self) -> &[f64] {
        &self.args
    }

    /// Targets in order
    #[inline]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Known gate, if the name is recognized
    pub fn gate(&self) -> Option<Gate> {
        Gate::from_name(&self.name)
    }

    /// Gate category, if the name is recognized
    pub fn kind(&self) -> Option<GateKind> {
        self.gate().map(|g| g.kind())
    }

    /// Whether this instruction is a tick marker
    pub fn is_tick(&self) -> bool {
        self.gate() == Some(Gate::Tick)
    }

    /// Whether this instruction takes no time (annotations and ticks)
    pub fn is_annotation(&self) -> bool {
        self.gate().is_some_and(|g| g.is_annotation())
    }

    /// Whether this instruction is a noise channel
    pub fn is_noise(&self) -> bool {
        self.kind() == Some(GateKind::Noise)
    }

    /// Observable index of an `OBSERVABLE_INCLUDE`, `0` when omitted
    ///
    /// # Errors
    /// `StructuralError` unless the argument is an integer in
    /// `0..MAX_OBSERVABLES`
    pub fn observable_index(&self) -> Result<usize> {
        let Some(&value) = self.args.first() else {
            return Ok(0);
        };
        if value.fract() != 0.0 || !(0.0..MAX_OBSERVABLES as f64).contains(&value) {
            return Err(DecoherenceError::structural(format!(
                "'{}' needs an integer observable index below {}",
                self, MAX_OBSERVABLES
            )));
        }
        Ok(value as usize)
    }

    /// Qubits addressed by this instruction, in target order
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.targets.iter().filter_map(Target::qubit_id)
    }

    /// Record lookbacks referenced by this instruction
    pub fn lookbacks(&self) -> impl Iterator<Item = usize> + '_ {
        self.targets.iter().filter_map(Target::lookback)
    }

    /// Number of measurement results this instruction appends to the record
    pub fn num_measurements(&self) -> usize {
        match self.kind() {
            Some(GateKind::Measure(_)) | Some(GateKind::MeasureReset(_)) => {
                self.targets.iter().filter(|t| t.qubit_id().is_some()).count()
            }
            Some(GateKind::PauliProductMeasure) => {
                let combiners = self
                    .targets
                    .iter()
                    .filter(|t| matches!(t, Target::Combiner))
                    .count();
                let factors = self.targets.len() - combiners;
                factors.saturating_sub(combiners)
            }
            _ => 0,
        }
    }

    /// Split `MPP` targets into products, each a list of Pauli factors
    pub fn pauli_products(&self) -> Vec<Vec<Target>> {
        let mut products: Vec<Vec<Target>> = Vec::new();
        let mut join_next = false;
        for target in &self.targets {
            match target {
                Target::Combiner => join_next = true,
                other => {
                    match products.last_mut() {
                        Some(current) if join_next => current.push(*other),
                        _ => products.push(vec![*other]),
                    }
                    join_next = false;
                }
            }
        }
        products
    }

    pub(crate) fn args_mut(&mut self) -> &mut SmallVec<[f64; 3]> {
        &mut self.args
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")?;
        }
        let mut previous_was_combiner = false;
        for target in &self.targets {
            let is_combiner = matches!(target, Target::Combiner);
            if !is_combiner && !previous_was_combiner {
                write!(f, " ")?;
            }
            write!(f, "{}", target)?;
            previous_was_combiner = is_combiner;
        }
        Ok(())
    }
}
