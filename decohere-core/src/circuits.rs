//! Standard QEC experiment circuits
//!
//! Generated circuits are noiseless and tick-structured, ready for
//! [`Annotator`](crate::Annotator).

use crate::circuit::{Circuit, Instruction, Target};
use crate::{DecoherenceError, Result};

/// Repetition-code memory experiment protecting against X errors
///
/// Data qubits sit at even indices `0, 2, ..., 2(d-1)` and parity ancillas
/// at the odd indices between them. Each round entangles every ancilla with
/// its two neighbours, measures and resets it, and fires one detector per
/// ancilla. A final data measurement closes the detectors and
/// `OBSERVABLE_INCLUDE(0)` tracks the last data qubit.
///
/// Tick layout: one after the initial reset, then three per round.
///
/// # Errors
/// `InvalidParameter` for `distance < 2` or `rounds == 0`
///
/// # Example
/// ```
/// use decohere_core::circuits::repetition_code_memory;
///
/// let circuit = repetition_code_memory(3, 2).unwrap();
/// assert_eq!(circuit.num_ticks(), 7);
/// assert_eq!(circuit.num_detectors(), 2 * 2 + 2);
/// assert_eq!(circuit.num_measurements(), 2 * 2 + 3);
/// ```
pub fn repetition_code_memory(distance: usize, rounds: usize) -> Result<Circuit> {
    if distance < 2 {
        return Err(DecoherenceError::invalid_parameter(
            "distance",
            distance as f64,
            "must be at least 2",
        ));
    }
    if rounds == 0 {
        return Err(DecoherenceError::invalid_parameter(
            "rounds",
            rounds as f64,
            "must be at least 1",
        ));
    }

    let num_anc = distance - 1;
    let data: Vec<usize> = (0..distance).map(|i| 2 * i).collect();
    let ancillas: Vec<usize> = (0..num_anc).map(|i| 2 * i + 1).collect();
    let all: Vec<Target> = (0..2 * distance - 1).map(Target::qubit).collect();

    let mut circuit = Circuit::new();
    for q in 0..2 * distance - 1 {
        circuit.push(Instruction::new("QUBIT_COORDS", &[q as f64, 0.0], &[Target::qubit(q)]));
    }
    circuit.push(Instruction::new("R", &[], &all));
    circuit.push(Instruction::tick());

    append_round(&mut circuit, &ancillas, false);
    if rounds > 1 {
        let mut body = Circuit::new();
        append_round(&mut body, &ancillas, true);
        circuit.push_repeat(rounds - 1, body)?;
    }

    let data_targets: Vec<Target> = data.iter().map(|&q| Target::qubit(q)).collect();
    circuit.push(Instruction::new("M", &[], &data_targets));
    for (j, &anc) in ancillas.iter().enumerate() {
        circuit.push(Instruction::new(
            "DETECTOR",
            &[anc as f64, 1.0],
            &[
                Target::rec(distance - j),
                Target::rec(distance - j - 1),
                Target::rec(distance + num_anc - j),
            ],
        ));
    }
    circuit.push(Instruction::new("OBSERVABLE_INCLUDE", &[0.0], &[Target::rec(1)]));

    Ok(circuit)
}

fn append_round(circuit: &mut Circuit, ancillas: &[usize], compare: bool) {
    let num_anc = ancillas.len();

    let left: Vec<Target> = ancillas
        .iter()
        .flat_map(|&a| [Target::qubit(a - 1), Target::qubit(a)])
        .collect();
    circuit.push(Instruction::new("CX", &[], &left));
    circuit.push(Instruction::tick());

    let right: Vec<Target> = ancillas
        .iter()
        .flat_map(|&a| [Target::qubit(a + 1), Target::qubit(a)])
        .collect();
    circuit.push(Instruction::new("CX", &[], &right));
    circuit.push(Instruction::tick());

    let anc_targets: Vec<Target> = ancillas.iter().map(|&a| Target::qubit(a)).collect();
    circuit.push(Instruction::new("MR", &[], &anc_targets));
    for (j, &anc) in ancillas.iter().enumerate() {
        let mut targets = vec![Target::rec(num_anc - j)];
        if compare {
            targets.push(Target::rec(2 * num_anc - j));
        }
        circuit.push(Instruction::new("DETECTOR", &[anc as f64, 0.0], &targets));
    }
    circuit.push(Instruction::new("SHIFT_COORDS", &[0.0, 1.0], &[]));
    circuit.push(Instruction::tick());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure() {
        let circuit = repetition_code_memory(5, 3).unwrap();
        assert_eq!(circuit.qubits().len(), 9);
        assert_eq!(circuit.num_ticks(), 1 + 3 * 3);
        assert_eq!(circuit.num_measurements(), 4 * 3 + 5);
        assert_eq!(circuit.num_detectors(), 4 * 3 + 4);
        assert_eq!(circuit.num_observables().unwrap(), 1);
        assert!(!circuit.has_noise());
    }

    #[test]
    fn test_detector_records() {
        let circuit = repetition_code_memory(3, 2).unwrap();
        let records = circuit.detector_records().unwrap();
        // round 1: ancillas measured as records 0, 1
        assert_eq!(records[0], vec![0]);
        assert_eq!(records[1], vec![1]);
        // round 2 compares with round 1
        assert_eq!(records[2], vec![2, 0]);
        assert_eq!(records[3], vec![3, 1]);
        // final: data 4, 5, 6 against last ancillas 2, 3
        assert_eq!(records[4], vec![4, 5, 2]);
        assert_eq!(records[5], vec![5, 6, 3]);
        assert_eq!(circuit.observable_records().unwrap(), vec![vec![6]]);
    }

    #[test]
    fn test_detector_coordinates_shift_per_round() {
        let circuit = repetition_code_memory(2, 3).unwrap();
        let times: Vec<f64> = circuit
            .flattened_instructions()
            .iter()
            .filter(|i| i.name() == "DETECTOR")
            .map(|i| i.args()[1])
            .collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(repetition_code_memory(1, 3).is_err());
        assert!(repetition_code_memory(3, 0).is_err());
    }

    #[test]
    fn test_text_round_trip() {
        let circuit = repetition_code_memory(3, 4).unwrap();
        let reparsed: Circuit = circuit.to_string().parse().unwrap();
        assert_eq!(reparsed, circuit);
    }
}
