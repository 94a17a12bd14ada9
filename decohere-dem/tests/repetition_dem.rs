//! Detector error models of repetition-code memory experiments

use decohere_core::circuits::repetition_code_memory;
use decohere_core::{Annotator, Circuit, CircuitItem, DecoherenceParams, DurationTable, Instruction, Target};
use decohere_dem::{DemError, DemOptions, DetectorErrorModel};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Insert `X_ERROR(p)` on every data qubit after each tick
fn with_data_x_errors(circuit: &Circuit, distance: usize, p: f64) -> Circuit {
    let data: Vec<Target> = (0..distance).map(|i| Target::qubit(2 * i)).collect();
    let mut out = Circuit::new();
    for item in circuit.items() {
        match item {
            CircuitItem::Instruction(inst) => {
                out.push(inst.clone());
                if inst.is_tick() {
                    out.push(Instruction::new("X_ERROR", &[p], &data));
                }
            }
            CircuitItem::Repeat { count, body } => {
                out.push_repeat(*count, with_data_x_errors(body, distance, p))
                    .unwrap();
            }
        }
    }
    out
}

fn annotated(distance: usize, rounds: usize) -> Circuit {
    let circuit = repetition_code_memory(distance, rounds).unwrap();
    let params = DecoherenceParams::uniform(circuit.qubits(), 55.4, 22.3).unwrap();
    let durations =
        DurationTable::new([("R", 102.0), ("CX", 40.0), ("MR", 600.0), ("M", 500.0)]).unwrap();
    Annotator::new(params, durations).annotate(&circuit).unwrap()
}

#[test]
fn test_data_x_errors_are_graphlike() {
    init_logging();
    for distance in [3, 5] {
        let circuit = with_data_x_errors(&repetition_code_memory(distance, 3).unwrap(), distance, 0.01);
        let dem = DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap();

        assert_eq!(dem.num_detectors, circuit.num_detectors());
        assert_eq!(dem.num_observables, 1);
        assert!(dem.is_graphlike());
        for mechanism in &dem.mechanisms {
            assert_eq!(mechanism.components.len(), 1);
            assert!(!mechanism.symptom().detectors.is_empty());
        }
        // only errors on the tracked data qubit touch the observable
        assert!(dem.logical_mechanisms().count() > 0);
        assert!(dem.logical_mechanisms().count() < dem.len());
    }
}

#[test]
fn test_decoherence_noise_is_graphlike() {
    init_logging();
    let circuit = annotated(3, 3);
    let dem = DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap();
    assert_eq!(dem.num_detectors, circuit.num_detectors());
    assert!(!dem.is_empty());
    assert!(dem.is_graphlike());
    for mechanism in &dem.mechanisms {
        assert!(mechanism.probability > 0.0 && mechanism.probability < 1.0);
    }
}

#[test]
fn test_detector_coordinates_follow_rounds() {
    let circuit = repetition_code_memory(3, 3).unwrap();
    let dem = DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()).unwrap();
    // no noise, but detectors and their coordinates are still listed
    assert!(dem.is_empty());
    assert_eq!(dem.coords(0), Some(&[1.0, 0.0][..]));
    assert_eq!(dem.coords(2), Some(&[1.0, 1.0][..]));
    assert_eq!(dem.coords(5), Some(&[3.0, 2.0][..]));
    assert_eq!(dem.coords(7), Some(&[3.0, 4.0][..]));
}

#[test]
fn test_text_round_trip() {
    let dem = DetectorErrorModel::from_circuit(&annotated(3, 2), &DemOptions::default()).unwrap();
    let reparsed: DetectorErrorModel = dem.to_string().parse().unwrap();
    assert_eq!(reparsed, dem);
}

#[test]
fn test_two_qubit_noise_is_rejected() {
    let mut circuit = repetition_code_memory(3, 1).unwrap();
    circuit.push(Instruction::new("DEPOLARIZE2", &[0.01], &[Target::qubit(0), Target::qubit(2)]));
    assert!(matches!(
        DetectorErrorModel::from_circuit(&circuit, &DemOptions::default()),
        Err(DemError::UnsupportedInstruction(_))
    ));
}
