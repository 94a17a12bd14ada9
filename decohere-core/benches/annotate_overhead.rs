use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use decohere_core::circuits::repetition_code_memory;
use decohere_core::noise::{pauli_twirl, ComposedChannel};
use decohere_core::{pauli_probabilities, Annotator, DecoherenceParams, DurationTable};

fn durations() -> DurationTable {
    DurationTable::new([("R", 102.0), ("CX", 40.0), ("MR", 600.0), ("M", 500.0)]).unwrap()
}

/// Benchmark the closed-form probability function
fn bench_pauli_probabilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("pauli_probabilities");

    for duration in [0.1, 10.0, 1000.0].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("closed_form", duration),
            duration,
            |b, &t| {
                b.iter(|| {
                    let p = pauli_probabilities(black_box(55.4), black_box(22.3), black_box(t))
                        .unwrap();
                    black_box(p);
                });
            },
        );
    }

    group.bench_function("kraus_twirl", |b| {
        b.iter(|| {
            let channel = ComposedChannel::decoherence(55.4, 22.3, black_box(10.0)).unwrap();
            black_box(pauli_twirl(&channel).unwrap());
        });
    });

    group.finish();
}

/// Benchmark annotation of repetition-code memory circuits
fn bench_annotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");

    for distance in [3, 7, 15, 31].iter() {
        let circuit = repetition_code_memory(*distance, *distance).unwrap();
        let params = DecoherenceParams::uniform(circuit.qubits(), 55.4, 22.3).unwrap();
        let annotator = Annotator::new(params, durations());

        let events = circuit.qubits().len() * (circuit.num_ticks() + 1);
        group.throughput(Throughput::Elements(events as u64));
        group.bench_with_input(
            BenchmarkId::new("repetition_code", distance),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    let annotated = annotator.annotate(black_box(circuit)).unwrap();
                    black_box(annotated);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pauli_probabilities, bench_annotate);
criterion_main!(benches);
