//! Tick-based decoherence annotation
//!
//! The circuit is flattened and split at its `TICK` markers. Each tick lasts
//! as long as its slowest operation, and every qubit of the universe idles or
//! operates for that long. After each tick's instructions the annotator
//! emits one `PAULI_CHANNEL_1` per qubit carrying the T1/T2 error
//! probabilities accumulated since that qubit's previous event. Noise
//! instructions produce no measurement results, so every `rec[-k]` keeps
//! pointing at the same measurement.
//!
//! [`NoisePlacement::PerOperation`] instead follows each operation with
//! noise on its qubits for that operation's duration, and idles the rest of
//! the universe at the `TICK` closing the layer.
//!
//! # Example
//! ```
//! use decohere_core::{Annotator, Circuit, DecoherenceParams, DurationTable, QubitId};
//!
//! let circuit: Circuit = "R 0\nTICK\nM 0".parse().unwrap();
//! let params = DecoherenceParams::uniform([QubitId::new(0)], 55.4, 22.3).unwrap();
//! let durations = DurationTable::new([("R", 102.0), ("M", 600.0)]).unwrap();
//!
//! let annotated = Annotator::new(params, durations).annotate(&circuit).unwrap();
//! assert_eq!(annotated.to_string().matches("PAULI_CHANNEL_1").count(), 2);
//! ```

pub mod tick;

pub use tick::{partition, TimeSlice};

use crate::circuit::{Instruction, RecordResolver};
use crate::config::{AnnotatorConfig, NoisePlacement, QubitUniverse, RegimePolicy};
use crate::gate::Gate;
use crate::noise::{
    is_standard_regime, pauli_probabilities, DecoherenceParams, DurationTable,
    PauliProbabilities, QubitTimeTracker,
};
use crate::{Circuit, DecoherenceError, QubitId, Result};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// One injected Pauli error
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauliErrorEvent {
    pub qubit: QubitId,
    pub probabilities: PauliProbabilities,
}

impl PauliErrorEvent {
    /// The `PAULI_CHANNEL_1` instruction for this event
    pub fn to_instruction(&self) -> Instruction {
        Instruction::pauli_channel_1(self.qubit, self.probabilities)
    }

    /// Events described by a `PAULI_CHANNEL_1` instruction, one per target
    pub fn from_instruction(instruction: &Instruction) -> Vec<PauliErrorEvent> {
        if instruction.gate() != Some(Gate::PauliChannel1) {
            return Vec::new();
        }
        let args = instruction.args();
        let probabilities = PauliProbabilities::new(
            args.first().copied().unwrap_or(0.0),
            args.get(1).copied().unwrap_or(0.0),
            args.get(2).copied().unwrap_or(0.0),
        );
        instruction
            .qubits()
            .map(|qubit| PauliErrorEvent {
                qubit,
                probabilities,
            })
            .collect()
    }
}

/// Injects T1/T2 noise into circuits
#[derive(Debug, Clone)]
pub struct Annotator {
    params: DecoherenceParams,
    durations: DurationTable,
    config: AnnotatorConfig,
}

impl Annotator {
    /// Annotator with the default configuration
    pub fn new(params: DecoherenceParams, durations: DurationTable) -> Self {
        Self {
            params,
            durations,
            config: AnnotatorConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: AnnotatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn params(&self) -> &DecoherenceParams {
        &self.params
    }

    pub fn durations(&self) -> &DurationTable {
        &self.durations
    }

    /// Annotated, flattened copy of `circuit`
    ///
    /// Under [`NoisePlacement::PerTick`] a circuit without `TICK` markers is
    /// returned flattened but otherwise unchanged.
    ///
    /// # Errors
    /// - `StructuralError` if the circuit already contains noise, a tick
    ///   marker has targets or arguments, a record reference reaches before
    ///   the first measurement, or an observable index is invalid
    /// - `StructuralError` under [`NoisePlacement::PerOperation`] for a layer
    ///   mixing durations or touching a qubit twice
    /// - `MissingParameter` for a universe qubit without T1/T2 or an
    ///   operation without a duration
    /// - `InvalidParameter` for t2 > 2·t1 under [`RegimePolicy::Reject`]
    ///
    /// Nothing is built until every check has passed.
    pub fn annotate(&self, circuit: &Circuit) -> Result<Circuit> {
        let flat = circuit.flattened_instructions();

        if let Some(noisy) = flat.iter().find(|inst| inst.is_noise()) {
            return Err(DecoherenceError::structural(format!(
                "circuit already contains noise '{}'",
                noisy
            )));
        }
        RecordResolver::resolve(&flat)?;
        let slices = partition(&flat)?;

        match self.config.placement {
            NoisePlacement::PerTick => self.annotate_ticks(circuit, flat, &slices),
            NoisePlacement::PerOperation => self.annotate_operations(circuit, flat),
        }
    }

    fn annotate_ticks(
        &self,
        circuit: &Circuit,
        flat: Vec<Instruction>,
        slices: &[TimeSlice],
    ) -> Result<Circuit> {
        if slices.len() == 1 {
            debug!("no tick markers in {} instructions, nothing to annotate", flat.len());
            return Ok(Circuit::from_instructions(flat));
        }

        let universe = self.universe(circuit);
        let constants = self.time_constants(&universe)?;
        let durations = slices
            .iter()
            .map(|slice| slice.duration(&flat, &self.durations))
            .collect::<Result<Vec<f64>>>()?;
        let events = self.tick_events(&constants, &durations)?;

        let mut out = Vec::with_capacity(flat.len() + universe.len() * slices.len());
        for (slice, tick_events) in slices.iter().zip(&events) {
            out.extend_from_slice(slice.instructions(&flat));
            out.extend(tick_events.iter().map(PauliErrorEvent::to_instruction));
            if let Some(marker) = slice.marker {
                out.push(flat[marker].clone());
            }
        }

        debug!(
            "annotated {} ticks x {} qubits ({} events, total duration {})",
            slices.len(),
            universe.len(),
            universe.len() * slices.len(),
            durations.iter().sum::<f64>()
        );
        Ok(Circuit::from_instructions(out))
    }

    fn annotate_operations(&self, circuit: &Circuit, flat: Vec<Instruction>) -> Result<Circuit> {
        let universe = self.universe(circuit);
        let constants: HashMap<QubitId, (f64, f64)> = self
            .time_constants(&universe)?
            .into_iter()
            .map(|(qubit, t1, t2)| (qubit, (t1, t2)))
            .collect();
        let mut tracker = QubitTimeTracker::new(universe.iter().copied());
        let mut layer = Layer::default();
        let mut out = Vec::with_capacity(2 * flat.len());
        let mut num_events = 0;

        for inst in flat {
            if inst.is_annotation() {
                if inst.is_tick() {
                    if let Some(duration) = layer.duration.take() {
                        for &qubit in &universe {
                            if !layer.active.contains(&qubit) {
                                tracker.advance_qubit(qubit, duration);
                                out.push(drain(&mut tracker, &constants, qubit)?);
                                num_events += 1;
                            }
                        }
                    }
                    layer.active.clear();
                }
                out.push(inst);
                continue;
            }

            let duration = self.durations.duration_of(&inst)?;
            match layer.duration {
                Some(current) if current != duration => {
                    return Err(DecoherenceError::structural(format!(
                        "'{}' takes {} but its layer takes {}",
                        inst, duration, current
                    )));
                }
                _ => layer.duration = Some(duration),
            }
            let qubits: Vec<QubitId> = inst.qubits().collect();
            for &qubit in &qubits {
                if !layer.active.insert(qubit) {
                    return Err(DecoherenceError::structural(format!(
                        "'{}' acts on qubit {} twice in one layer",
                        inst, qubit
                    )));
                }
            }

            out.push(inst);
            for qubit in qubits {
                if constants.contains_key(&qubit) {
                    tracker.advance_qubit(qubit, duration);
                    out.push(drain(&mut tracker, &constants, qubit)?);
                    num_events += 1;
                }
            }
        }

        debug!(
            "annotated {} operations on {} qubits with {} events",
            out.len() - num_events,
            universe.len(),
            num_events
        );
        Ok(Circuit::from_instructions(out))
    }

    /// Per-event `(qubit, [wX, wY, wZ])` log-likelihood weights of an
    /// annotated circuit, in circuit order
    ///
    /// Components with zero probability have no finite weight and are `None`.
    pub fn event_weights(annotated: &Circuit) -> Vec<(QubitId, [Option<f64>; 3])> {
        annotated
            .flattened_instructions()
            .iter()
            .flat_map(PauliErrorEvent::from_instruction)
            .map(|event| (event.qubit, event.probabilities.weights()))
            .collect()
    }

    fn universe(&self, circuit: &Circuit) -> Vec<QubitId> {
        let set = match self.config.universe {
            QubitUniverse::Referenced => circuit.qubits(),
            QubitUniverse::Measured => circuit.measured_qubits(),
        };
        set.into_iter().collect()
    }

    fn time_constants(&self, universe: &[QubitId]) -> Result<Vec<(QubitId, f64, f64)>> {
        let mut constants = Vec::with_capacity(universe.len());
        for &qubit in universe {
            let (t1, t2) = self.params.get(qubit)?;
            if !is_standard_regime(t1, t2) {
                match self.config.regime {
                    RegimePolicy::Reject => {
                        return Err(DecoherenceError::invalid_parameter(
                            format!("t2[qubit {}]", qubit),
                            t2,
                            format!("exceeds 2*t1 = {}", 2.0 * t1),
                        ));
                    }
                    RegimePolicy::PassThrough => warn!(
                        "qubit {} has t2 = {} > 2*t1 = {}, Z error probability will be negative",
                        qubit,
                        t2,
                        2.0 * t1
                    ),
                }
            }
            constants.push((qubit, t1, t2));
        }
        Ok(constants)
    }

    fn tick_events(
        &self,
        constants: &[(QubitId, f64, f64)],
        durations: &[f64],
    ) -> Result<Vec<Vec<PauliErrorEvent>>> {
        let mut tracker = QubitTimeTracker::new(constants.iter().map(|(q, _, _)| *q));
        let mut events = Vec::with_capacity(durations.len());
        for &duration in durations {
            tracker.advance_all(duration);
            let mut tick_events = Vec::with_capacity(constants.len());
            for &(qubit, t1, t2) in constants {
                let elapsed = tracker.take(qubit).unwrap_or(0.0);
                tick_events.push(PauliErrorEvent {
                    qubit,
                    probabilities: pauli_probabilities(t1, t2, elapsed)?,
                });
            }
            events.push(tick_events);
        }
        Ok(events)
    }
}

/// Operations since the last `TICK`
#[derive(Debug, Default)]
struct Layer {
    duration: Option<f64>,
    active: HashSet<QubitId>,
}

/// Noise for the time a qubit has accumulated since its last event
fn drain(
    tracker: &mut QubitTimeTracker,
    constants: &HashMap<QubitId, (f64, f64)>,
    qubit: QubitId,
) -> Result<Instruction> {
    let (t1, t2) = constants
        .get(&qubit)
        .copied()
        .ok_or_else(|| DecoherenceError::missing_t1(qubit))?;
    let elapsed = tracker.take(qubit).unwrap_or(0.0);
    let event = PauliErrorEvent {
        qubit,
        probabilities: pauli_probabilities(t1, t2, elapsed)?,
    };
    Ok(event.to_instruction())
}

/// Annotate `circuit` with T1/T2 noise using the default configuration
///
/// # Errors
/// See [`Annotator::annotate`]; invalid map values are `InvalidParameter`.
pub fn annotate(
    circuit: &Circuit,
    t1_map: &HashMap<QubitId, f64>,
    t2_map: &HashMap<QubitId, f64>,
    op_duration: &HashMap<String, f64>,
) -> Result<Circuit> {
    annotate_with(circuit, t1_map, t2_map, op_duration, AnnotatorConfig::default())
}

/// [`annotate`] with an explicit configuration
pub fn annotate_with(
    circuit: &Circuit,
    t1_map: &HashMap<QubitId, f64>,
    t2_map: &HashMap<QubitId, f64>,
    op_duration: &HashMap<String, f64>,
    config: AnnotatorConfig,
) -> Result<Circuit> {
    let params = DecoherenceParams::new(t1_map.clone(), t2_map.clone())?;
    let durations = DurationTable::new(op_duration.iter().map(|(k, v)| (k.as_str(), *v)))?;
    Annotator::new(params, durations)
        .with_config(config)
        .annotate(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Target;
    use crate::error::ParameterKind;
    use approx::assert_abs_diff_eq;

    fn annotator(qubits: usize) -> Annotator {
        let params =
            DecoherenceParams::uniform((0..qubits).map(QubitId::new), 55.4, 22.3).unwrap();
        let durations =
            DurationTable::new([("R", 102.0), ("H", 20.0), ("CX", 40.0), ("M", 600.0), ("MR", 700.0)])
                .unwrap();
        Annotator::new(params, durations)
    }

    fn noise_events(circuit: &Circuit) -> Vec<PauliErrorEvent> {
        circuit
            .flattened_instructions()
            .iter()
            .flat_map(PauliErrorEvent::from_instruction)
            .collect()
    }

    #[test]
    fn test_events_after_each_tick() {
        let circuit: Circuit = "R 0 1\nTICK\nCX 0 1\nTICK\nM 0 1".parse().unwrap();
        let annotated = annotator(2).annotate(&circuit).unwrap();
        let names: Vec<String> = annotated
            .flattened_instructions()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "R",
                "PAULI_CHANNEL_1",
                "PAULI_CHANNEL_1",
                "TICK",
                "CX",
                "PAULI_CHANNEL_1",
                "PAULI_CHANNEL_1",
                "TICK",
                "M",
                "PAULI_CHANNEL_1",
                "PAULI_CHANNEL_1"
            ]
        );
    }

    #[test]
    fn test_reset_tick_probabilities() {
        let circuit: Circuit = "R 0\nTICK\nM 0".parse().unwrap();
        let annotated = annotator(1).annotate(&circuit).unwrap();
        let events = noise_events(&annotated);
        assert_eq!(events.len(), 2);
        assert_abs_diff_eq!(events[0].probabilities.px, 0.2086, epsilon = 1e-4);
        assert_abs_diff_eq!(events[0].probabilities.pz, 0.2914, epsilon = 1e-4);
    }

    #[test]
    fn test_tick_duration_is_slowest_operation() {
        let circuit: Circuit = "H 0\nMR 1\nTICK\nH 0".parse().unwrap();
        let annotated = annotator(2).annotate(&circuit).unwrap();
        let events = noise_events(&annotated);
        let expected = pauli_probabilities(55.4, 22.3, 700.0).unwrap();
        assert_eq!(events[0].probabilities, expected);
        assert_eq!(events[1].probabilities, expected);
        let second = pauli_probabilities(55.4, 22.3, 20.0).unwrap();
        assert_eq!(events[2].probabilities, second);
    }

    #[test]
    fn test_empty_ticks_emit_zero_events() {
        let circuit: Circuit = "R 0\nTICK\nTICK\nDETECTOR\nTICK".parse().unwrap();
        let annotated = annotator(1).annotate(&circuit).unwrap();
        let events = noise_events(&annotated);
        assert_eq!(events.len(), 4);
        for event in &events[1..] {
            assert_eq!(event.probabilities, PauliProbabilities::ZERO);
        }
        assert_eq!(annotated.num_ticks(), 3);
    }

    #[test]
    fn test_no_ticks_unchanged() {
        let circuit: Circuit = "R 0\nREPEAT 2 {\n    H 0\n}\nM 0".parse().unwrap();
        let annotated = annotator(1).annotate(&circuit).unwrap();
        assert_eq!(annotated, circuit.flattened());
        assert!(!annotated.has_noise());
    }

    #[test]
    fn test_existing_noise_rejected() {
        let circuit: Circuit = "R 0\nX_ERROR(0.1) 0\nTICK\nM 0".parse().unwrap();
        assert!(matches!(
            annotator(1).annotate(&circuit),
            Err(DecoherenceError::StructuralError(_))
        ));
    }

    #[test]
    fn test_missing_duration_reported() {
        let circuit: Circuit = "R 0\nTICK\nS 0\nM 0".parse().unwrap();
        match annotator(1).annotate(&circuit) {
            Err(DecoherenceError::MissingParameter { kind, key }) => {
                assert_eq!(kind, ParameterKind::Duration);
                assert!(key.contains("'S'"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_regime_policy() {
        let params = DecoherenceParams::uniform([QubitId::new(0)], 10.0, 30.0).unwrap();
        let durations = DurationTable::new([("R", 1.0)]).unwrap();
        let circuit: Circuit = "R 0\nTICK\nR 0".parse().unwrap();

        let strict = Annotator::new(params.clone(), durations.clone());
        assert!(matches!(
            strict.annotate(&circuit),
            Err(DecoherenceError::InvalidParameter { .. })
        ));

        let lenient = Annotator::new(params, durations)
            .with_config(AnnotatorConfig::new().with_regime(RegimePolicy::PassThrough));
        let events = noise_events(&lenient.annotate(&circuit).unwrap());
        assert!(events[0].probabilities.pz < 0.0);
    }

    #[test]
    fn test_measured_universe() {
        let circuit: Circuit = "R 0 1 2\nTICK\nCX 0 1\nTICK\nM 1".parse().unwrap();
        let ann = annotator(3)
            .with_config(AnnotatorConfig::new().with_universe(QubitUniverse::Measured));
        let events = noise_events(&ann.annotate(&circuit).unwrap());
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.qubit == QubitId::new(1)));
    }

    #[test]
    fn test_event_weights() {
        let circuit: Circuit = "R 0\nTICK\nTICK".parse().unwrap();
        let annotated = annotator(1).annotate(&circuit).unwrap();
        let weights = Annotator::event_weights(&annotated);
        assert_eq!(weights.len(), 3);
        let p = pauli_probabilities(55.4, 22.3, 102.0).unwrap();
        assert_abs_diff_eq!(weights[0].1[0].unwrap(), ((1.0 - p.px) / p.px).ln(), epsilon = 1e-12);
        assert_eq!(weights[1].1, [None, None, None]);
    }

    fn per_operation(qubits: usize) -> Annotator {
        annotator(qubits)
            .with_config(AnnotatorConfig::new().with_placement(NoisePlacement::PerOperation))
    }

    #[test]
    fn test_per_operation_noise_follows_each_gate() {
        let circuit: Circuit = "R 0 1 2\nTICK\nCX 0 1\nTICK\nM 0 1 2".parse().unwrap();
        let annotated = per_operation(3).annotate(&circuit).unwrap();
        let names: Vec<String> = annotated
            .flattened_instructions()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        let mut expected = vec!["R"];
        expected.extend(["PAULI_CHANNEL_1"; 3]);
        expected.extend(["TICK", "CX", "PAULI_CHANNEL_1", "PAULI_CHANNEL_1"]);
        // qubit 2 idles through the CX layer
        expected.extend(["PAULI_CHANNEL_1", "TICK", "M"]);
        expected.extend(["PAULI_CHANNEL_1"; 3]);
        assert_eq!(names, expected);

        let events = noise_events(&annotated);
        let reset = pauli_probabilities(55.4, 22.3, 102.0).unwrap();
        let cx = pauli_probabilities(55.4, 22.3, 40.0).unwrap();
        assert_eq!(events[0].probabilities, reset);
        assert_eq!(events[3].probabilities, cx);
        assert_eq!(events[5].qubit, QubitId::new(2));
        assert_eq!(events[5].probabilities, cx);
    }

    #[test]
    fn test_per_operation_without_ticks() {
        // a circuit without markers is a single layer
        let circuit: Circuit = "H 0\nH 1".parse().unwrap();
        let events = noise_events(&per_operation(2).annotate(&circuit).unwrap());
        assert_eq!(events.len(), 2);
        let h = pauli_probabilities(55.4, 22.3, 20.0).unwrap();
        assert!(events.iter().all(|e| e.probabilities == h));
    }

    #[test]
    fn test_per_operation_layer_checks() {
        // R and H in one layer take different times
        let mixed: Circuit = "R 0\nH 1\nTICK\nM 0 1".parse().unwrap();
        assert!(matches!(
            per_operation(2).annotate(&mixed),
            Err(DecoherenceError::StructuralError(_))
        ));

        let reused: Circuit = "R 0 1\nTICK\nCX 0 1\nCX 1 2\nTICK\nM 0".parse().unwrap();
        assert!(matches!(
            per_operation(3).annotate(&reused),
            Err(DecoherenceError::StructuralError(_))
        ));

        // the same qubits in consecutive layers are fine
        let ok: Circuit = "H 0\nTICK\nH 0\nTICK\nH 0".parse().unwrap();
        assert_eq!(noise_events(&per_operation(1).annotate(&ok).unwrap()).len(), 3);
    }

    #[test]
    fn test_per_operation_shares_validation() {
        let circuit: Circuit = "R 0\nTICK\nS 0".parse().unwrap();
        assert!(matches!(
            per_operation(1).annotate(&circuit),
            Err(DecoherenceError::MissingParameter { .. })
        ));

        let params = DecoherenceParams::uniform([QubitId::new(0)], 10.0, 30.0).unwrap();
        let durations = DurationTable::new([("R", 1.0)]).unwrap();
        let strict = Annotator::new(params, durations)
            .with_config(AnnotatorConfig::new().with_placement(NoisePlacement::PerOperation));
        assert!(matches!(
            strict.annotate(&"R 0".parse::<Circuit>().unwrap()),
            Err(DecoherenceError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_bad_observable_index_is_an_error() {
        let circuit = Circuit::from_instructions([
            Instruction::new("R", &[], &[Target::qubit(0)]),
            Instruction::tick(),
            Instruction::new("M", &[], &[Target::qubit(0)]),
            Instruction::new("OBSERVABLE_INCLUDE", &[f64::INFINITY], &[Target::rec(1)]),
        ]);
        for ann in [annotator(1), per_operation(1)] {
            assert!(matches!(
                ann.annotate(&circuit),
                Err(DecoherenceError::StructuralError(_))
            ));
        }
    }

    #[test]
    fn test_free_function() {
        let circuit: Circuit = "R 0\nTICK\nM 0".parse().unwrap();
        let t1 = HashMap::from([(QubitId::new(0), 55.4)]);
        let t2 = HashMap::from([(QubitId::new(0), 22.3)]);
        let durations = HashMap::from([("R".to_string(), 102.0), ("M".to_string(), 600.0)]);
        let annotated = annotate(&circuit, &t1, &t2, &durations).unwrap();
        assert_eq!(noise_events(&annotated).len(), 2);

        let missing = annotate(&circuit, &HashMap::new(), &t2, &durations);
        assert_eq!(
            missing.unwrap_err(),
            DecoherenceError::missing_t1(QubitId::new(0))
        );
    }
}
