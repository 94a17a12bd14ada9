//! Detector error model derivation
//!
//! Every noise site (one target of one noise instruction) gets two frame
//! lanes: one carrying an X error from that point on and one carrying a Z
//! error. After propagating to the end of the circuit each lane's flipped
//! detectors and observables are its symptom; the Y symptom is the XOR of
//! the two. Sites are processed 32 per pass, each pass starting at the
//! instruction of its first site.

use crate::channel::{self, IndependentPaulis};
use crate::frame::FrameBatch;
use crate::types::{DetectorErrorModel, MechanismSet, Symptom};
use crate::{DemError, Result};
use decohere_core::gate::{Gate, GateKind};
use decohere_core::{Circuit, DecoherenceError, Instruction, QubitId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Lanes per frame word, two per site
const SITES_PER_PASS: usize = 32;

/// Options for [`DetectorErrorModel::from_circuit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemOptions {
    /// Use disjoint channel probabilities directly when no exact
    /// independent form exists
    pub approximate_disjoint_errors: bool,
    /// Split Y errors with more than two detectors into X `^` Z parts
    pub decompose_errors: bool,
}

impl Default for DemOptions {
    fn default() -> Self {
        Self {
            approximate_disjoint_errors: false,
            decompose_errors: true,
        }
    }
}

impl DemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_approximate_disjoint_errors(mut self, approximate: bool) -> Self {
        self.approximate_disjoint_errors = approximate;
        self
    }

    pub fn with_decompose_errors(mut self, decompose: bool) -> Self {
        self.decompose_errors = decompose;
        self
    }
}

/// One noise target with its independent flip probabilities
#[derive(Debug, Clone, Copy)]
struct NoiseSite {
    instruction: usize,
    qubit: QubitId,
    paulis: IndependentPaulis,
}

impl DetectorErrorModel {
    /// Derive the detector error model of a noisy circuit
    ///
    /// # Errors
    /// - `UnsupportedInstruction` for operations without frame rules
    /// - `InvalidProbability` / `NonIndependentChannel` for bad noise
    /// - `Circuit(StructuralError)` for bad record references, arities or
    ///   observable indices
    pub fn from_circuit(circuit: &Circuit, options: &DemOptions) -> Result<Self> {
        let instructions = circuit.flattened_instructions();
        let detectors = circuit.detector_records()?;
        let observables = circuit.observable_records()?;

        let mut num_qubits = 0;
        for inst in &instructions {
            check_supported(inst)?;
            if let Some(max) = inst.qubits().map(|q| q.index()).max() {
                num_qubits = num_qubits.max(max + 1);
            }
        }

        let sites = noise_sites(&instructions, options)?;

        // measurements preceding each instruction
        let mut measured_before = Vec::with_capacity(instructions.len() + 1);
        let mut measured = 0;
        for inst in &instructions {
            measured_before.push(measured);
            measured += inst.num_measurements();
        }

        let mut set = MechanismSet::default();
        for batch in sites.chunks(SITES_PER_PASS) {
            let symptoms = propagate(
                &instructions,
                batch,
                &measured_before,
                num_qubits,
                measured,
                &detectors,
                &observables,
            )?;
            for (j, site) in batch.iter().enumerate() {
                let sx = &symptoms[2 * j];
                let sz = &symptoms[2 * j + 1];
                let sy = sx.xor(sz);
                set.insert(site.paulis.x, vec![sx.clone()]);
                set.insert(site.paulis.z, vec![sz.clone()]);
                set.insert(site.paulis.y, decompose(sy, sx, sz, options, site));
            }
        }

        let detector_coords = instructions
            .iter()
            .filter(|inst| inst.gate() == Some(Gate::Detector))
            .map(|inst| inst.args().to_vec())
            .collect();

        debug!(
            "derived DEM: {} noise sites, {} mechanisms, {} detectors, {} observables",
            sites.len(),
            set.len(),
            detectors.len(),
            observables.len()
        );

        Ok(DetectorErrorModel {
            num_detectors: detectors.len(),
            num_observables: observables.len(),
            detector_coords,
            mechanisms: set.into_mechanisms(),
        })
    }
}

fn check_supported(inst: &Instruction) -> Result<()> {
    let gate = inst
        .gate()
        .ok_or_else(|| DemError::UnsupportedInstruction(inst.name().to_string()))?;
    match gate {
        Gate::Depolarize2 | Gate::PauliChannel2 | Gate::CorrelatedError => {
            Err(DemError::UnsupportedInstruction(inst.name().to_string()))
        }
        _ => match gate.kind() {
            GateKind::Unitary { arity: 2 } if inst.targets().len() % 2 != 0 => {
                Err(DecoherenceError::structural(format!(
                    "'{}' needs an even number of targets",
                    inst
                ))
                .into())
            }
            _ => Ok(()),
        },
    }
}

/// Expand noise instructions into per-target sites
fn noise_sites(instructions: &[Instruction], options: &DemOptions) -> Result<Vec<NoiseSite>> {
    let mut sites = Vec::new();
    for (index, inst) in instructions.iter().enumerate() {
        if !inst.is_noise() {
            continue;
        }
        let context = inst.to_string();
        let args = inst.args();
        let expect_args = |n: usize| -> Result<()> {
            if args.len() == n {
                Ok(())
            } else {
                Err(DecoherenceError::structural(format!(
                    "'{}' takes {} argument(s), got {}",
                    context,
                    n,
                    args.len()
                ))
                .into())
            }
        };
        let approximate = options.approximate_disjoint_errors;
        let paulis = match inst.gate() {
            Some(Gate::PauliChannel1) => {
                expect_args(3)?;
                channel::disjoint_to_independent(&context, args[0], args[1], args[2], approximate)?
            }
            Some(Gate::Depolarize1) => {
                expect_args(1)?;
                channel::depolarize1(&context, args[0], approximate)?
            }
            Some(gate @ (Gate::XError | Gate::YError | Gate::ZError)) => {
                expect_args(1)?;
                let p = channel::check_probability(&context, args[0])?;
                match gate {
                    Gate::XError => IndependentPaulis { x: p, y: 0.0, z: 0.0 },
                    Gate::YError => IndependentPaulis { x: 0.0, y: p, z: 0.0 },
                    _ => IndependentPaulis { x: 0.0, y: 0.0, z: p },
                }
            }
            _ => return Err(DemError::UnsupportedInstruction(inst.name().to_string())),
        };
        if paulis.x == 0.0 && paulis.y == 0.0 && paulis.z == 0.0 {
            continue;
        }
        for qubit in inst.qubits() {
            sites.push(NoiseSite {
                instruction: index,
                qubit,
                paulis,
            });
        }
    }
    Ok(sites)
}

/// Run one pass and return the symptom of each lane (X lane then Z lane
/// per site)
fn propagate(
    instructions: &[Instruction],
    batch: &[NoiseSite],
    measured_before: &[usize],
    num_qubits: usize,
    num_measurements: usize,
    detectors: &[Vec<usize>],
    observables: &[Vec<usize>],
) -> Result<Vec<Symptom>> {
    let Some(first) = batch.first() else {
        return Ok(Vec::new());
    };
    let start = first.instruction;
    let mut frame = FrameBatch::new(num_qubits, num_measurements);
    frame.skip_records(measured_before[start]);

    let mut pending = batch.iter().enumerate().peekable();
    for (index, inst) in instructions.iter().enumerate().skip(start) {
        while let Some((j, site)) = pending.next_if(|(_, s)| s.instruction == index) {
            frame.inject(site.qubit, 1 << (2 * j), 1 << (2 * j + 1));
        }
        apply(&mut frame, inst)?;
    }

    let records = frame.records();
    let lanes = 2 * batch.len();
    let mut lane_detectors: Vec<SmallVec<[u32; 4]>> = vec![SmallVec::new(); lanes];
    let mut lane_observables = vec![0u64; lanes];

    for (d, recs) in detectors.iter().enumerate() {
        for lane in set_lanes(parity(records, recs)) {
            lane_detectors[lane].push(d as u32);
        }
    }
    for (k, recs) in observables.iter().enumerate() {
        for lane in set_lanes(parity(records, recs)) {
            lane_observables[lane] |= 1 << k;
        }
    }

    Ok(lane_detectors
        .into_iter()
        .zip(lane_observables)
        .map(|(dets, obs)| Symptom::new(dets, obs))
        .collect())
}

fn parity(records: &[u64], indices: &[usize]) -> u64 {
    indices.iter().fold(0, |acc, &r| acc ^ records[r])
}

fn set_lanes(mut mask: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let lane = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(lane)
    })
}

/// Frame update for one instruction
fn apply(frame: &mut FrameBatch, inst: &Instruction) -> Result<()> {
    let Some(gate) = inst.gate() else {
        return Err(DemError::UnsupportedInstruction(inst.name().to_string()));
    };
    let qubits: SmallVec<[QubitId; 8]> = inst.qubits().collect();
    match gate {
        Gate::Tick
        | Gate::Detector
        | Gate::ObservableInclude
        | Gate::QubitCoords
        | Gate::ShiftCoords
        | Gate::I
        | Gate::X
        | Gate::Y
        | Gate::Z
        | Gate::PauliChannel1
        | Gate::XError
        | Gate::YError
        | Gate::ZError
        | Gate::Depolarize1 => {}
        Gate::H | Gate::SqrtY | Gate::SqrtYDag => qubits.iter().for_each(|&q| frame.apply_h(q)),
        Gate::S | Gate::SDag => qubits.iter().for_each(|&q| frame.apply_s(q)),
        Gate::SqrtX | Gate::SqrtXDag => qubits.iter().for_each(|&q| frame.apply_sqrt_x(q)),
        Gate::Cx => qubits.chunks_exact(2).for_each(|p| frame.apply_cx(p[0], p[1])),
        Gate::Cy => qubits.chunks_exact(2).for_each(|p| frame.apply_cy(p[0], p[1])),
        Gate::Cz => qubits.chunks_exact(2).for_each(|p| frame.apply_cz(p[0], p[1])),
        Gate::Swap => qubits.chunks_exact(2).for_each(|p| frame.apply_swap(p[0], p[1])),
        Gate::M | Gate::Mx | Gate::My => {
            if let GateKind::Measure(basis) = gate.kind() {
                qubits.iter().for_each(|&q| frame.measure(q, basis));
            }
        }
        Gate::Mr | Gate::Mrx | Gate::Mry => {
            if let GateKind::MeasureReset(basis) = gate.kind() {
                for &q in &qubits {
                    frame.measure(q, basis);
                    frame.reset(q);
                }
            }
        }
        Gate::R | Gate::Rx | Gate::Ry => qubits.iter().for_each(|&q| frame.reset(q)),
        Gate::Mpp => {
            for product in inst.pauli_products() {
                frame.measure_product(&product);
            }
        }
        Gate::Depolarize2 | Gate::PauliChannel2 | Gate::CorrelatedError => {
            return Err(DemError::UnsupportedInstruction(inst.name().to_string()));
        }
    }
    Ok(())
}

/// Components recorded for a Y error
fn decompose(
    sy: Symptom,
    sx: &Symptom,
    sz: &Symptom,
    options: &DemOptions,
    site: &NoiseSite,
) -> Vec<Symptom> {
    if !options.decompose_errors || sy.is_graphlike() {
        return vec![sy];
    }
    if !sx.is_empty() && !sz.is_empty() && sx.is_graphlike() && sz.is_graphlike() {
        return vec![sx.clone(), sz.clone()];
    }
    warn!(
        "Y error on qubit {} flips {} detectors and has no graphlike X/Z split",
        site.qubit,
        sy.detectors.len()
    );
    vec![sy]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dem(text: &str) -> DetectorErrorModel {
        let circuit: Circuit = text.parse().unwrap();
        DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap()
    }

    #[test]
    fn test_single_x_error_before_measurement() {
        let model = dem("R 0\nX_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]");
        assert_eq!(model.num_detectors, 1);
        assert_eq!(model.len(), 1);
        assert_eq!(model.mechanisms[0].to_string(), "error(0.1) D0");
    }

    #[test]
    fn test_z_error_invisible_to_z_measurement() {
        let model = dem("R 0\nZ_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]");
        assert!(model.is_empty());
    }

    #[test]
    fn test_error_spreads_through_cx() {
        let model = dem(
            "R 0 1\nX_ERROR(0.2) 0\nCX 0 1\nM 0 1\nDETECTOR rec[-2]\nDETECTOR rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-1]",
        );
        assert_eq!(model.len(), 1);
        assert_eq!(model.mechanisms[0].to_string(), "error(0.2) D0 D1 L0");
        assert_eq!(model.num_observables, 1);
    }

    #[test]
    fn test_hadamard_turns_z_into_x() {
        let model = dem("R 0\nZ_ERROR(0.1) 0\nH 0\nM 0\nDETECTOR rec[-1]");
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_pauli_channel_merges_x_and_y() {
        let model = dem("R 0\nPAULI_CHANNEL_1(0.01, 0.01, 0.02) 0\nM 0\nDETECTOR rec[-1]");
        // X and Y both flip D0; Z does nothing
        assert_eq!(model.len(), 1);
        let ind = channel::disjoint_to_independent("", 0.01, 0.01, 0.02, false).unwrap();
        let expected = ind.x + ind.y - 2.0 * ind.x * ind.y;
        assert_abs_diff_eq!(model.mechanisms[0].probability, expected, epsilon = 1e-12);
        // the merged probability equals the disjoint P(X or Y)
        assert_abs_diff_eq!(model.mechanisms[0].probability, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_repeated_errors_merge() {
        let model = dem("R 0\nX_ERROR(0.1) 0\nX_ERROR(0.2) 0\nM 0\nDETECTOR rec[-1]");
        assert_eq!(model.len(), 1);
        assert_abs_diff_eq!(model.mechanisms[0].probability, 0.26, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_clears_frame() {
        let model = dem("X_ERROR(0.1) 0\nR 0\nM 0\nDETECTOR rec[-1]");
        assert!(model.is_empty());
    }

    #[test]
    fn test_y_hyperedge_is_decomposed() {
        // X part on qubit 0 flips D0 D1 through CX 0 1, Z part is copied
        // onto qubit 2 by CX 2 0 and flips D2
        let text = "R 0 1\nRX 2\nY_ERROR(0.1) 0\nCX 0 1\nCX 2 0\nM 0 1\nMX 2\n\
                    DETECTOR rec[-3]\nDETECTOR rec[-2]\nDETECTOR rec[-1]";
        let circuit: Circuit = text.parse().unwrap();
        let decomposed = DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap();
        assert_eq!(decomposed.len(), 1);
        assert_eq!(decomposed.mechanisms[0].components.len(), 2);
        assert!(decomposed.is_graphlike());

        let whole = DetectorErrorModel::from_circuit(
            &circuit,
            &DemOptions::default().with_decompose_errors(false),
        )
        .unwrap();
        assert!(!whole.is_graphlike());
    }

    #[test]
    fn test_errors_inside_repeat_and_detector_offsets() {
        let model = dem(
            "R 0\nM 0\nREPEAT 2 {\n    X_ERROR(0.1) 0\n    M 0\n    DETECTOR rec[-1] rec[-2]\n}",
        );
        // an X flip persists through M, so each round's error shows only in
        // that round's comparison
        let rendered: Vec<String> = model.mechanisms.iter().map(|m| m.to_string()).collect();
        assert_eq!(rendered, vec!["error(0.1) D0", "error(0.1) D1"]);
    }

    #[test]
    fn test_unsupported_instruction() {
        let circuit: Circuit = "R 0 1\nDEPOLARIZE2(0.1) 0 1\nM 0 1".parse().unwrap();
        assert!(matches!(
            DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()),
            Err(DemError::UnsupportedInstruction(name)) if name == "DEPOLARIZE2"
        ));
    }

    #[test]
    fn test_invalid_probability() {
        let circuit: Circuit = "R 0\nX_ERROR(1.5) 0\nM 0".parse().unwrap();
        assert!(matches!(
            DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()),
            Err(DemError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_many_sites_span_passes() {
        // 40 qubits, each with its own detector: more sites than one pass holds
        let n = 40;
        let mut text = String::new();
        let all: Vec<String> = (0..n).map(|q| q.to_string()).collect();
        text.push_str(&format!("R {}\nX_ERROR(0.01) {}\nM {}\n", all.join(" "), all.join(" "), all.join(" ")));
        for q in 0..n {
            text.push_str(&format!("DETECTOR rec[-{}]\n", n - q));
        }
        let model = dem(&text);
        assert_eq!(model.len(), n);
        for (q, mechanism) in model.mechanisms.iter().enumerate() {
            assert_eq!(mechanism.symptom().detectors.as_slice(), &[q as u32]);
        }
    }

    #[test]
    fn test_detector_coordinates_carry_shifts() {
        let model = dem("R 0\nM 0\nDETECTOR(1, 0) rec[-1]\nSHIFT_COORDS(0, 2)\nM 0\nDETECTOR(1, 0) rec[-1]");
        assert_eq!(model.coords(0), Some(&[1.0, 0.0][..]));
        assert_eq!(model.coords(1), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_options_serde_defaults() {
        let options: DemOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DemOptions::default());
        assert!(options.decompose_errors);
    }
}
