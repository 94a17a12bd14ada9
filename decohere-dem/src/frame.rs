//! Pauli frame propagation for 64 errors at once
//!
//! Each qubit holds an X word and a Z word; bit `i` of both words is the
//! Pauli frame of lane `i`. Clifford gates conjugate the frame, so gate
//! application is a handful of word XORs shared by all lanes.
//!
//! Measurement records store which lanes flipped each outcome.

use decohere_core::circuit::{PauliKind, Target};
use decohere_core::gate::Basis;
use decohere_core::QubitId;

/// Frames of up to 64 lanes over `n` qubits
#[derive(Debug, Clone)]
pub struct FrameBatch {
    x: Vec<u64>,
    z: Vec<u64>,
    /// Lanes flipping each measurement, in record order
    records: Vec<u64>,
}

impl FrameBatch {
    pub fn new(num_qubits: usize, num_measurements: usize) -> Self {
        Self {
            x: vec![0; num_qubits],
            z: vec![0; num_qubits],
            records: Vec::with_capacity(num_measurements),
        }
    }

    /// Flip outcome masks, indexed by absolute measurement
    pub fn records(&self) -> &[u64] {
        &self.records
    }

    /// Account for measurements that happened before this batch started
    pub fn skip_records(&mut self, count: usize) {
        self.records.resize(self.records.len() + count, 0);
    }

    /// Inject X and/or Z on the lanes in `lanes`
    pub fn inject(&mut self, qubit: QubitId, x_lanes: u64, z_lanes: u64) {
        let q = qubit.index();
        self.x[q] ^= x_lanes;
        self.z[q] ^= z_lanes;
    }

    pub fn x_word(&self, qubit: QubitId) -> u64 {
        self.x[qubit.index()]
    }

    pub fn z_word(&self, qubit: QubitId) -> u64 {
        self.z[qubit.index()]
    }

    // Clifford conjugation, tracked up to phase

    /// H, and √Y up to sign: X ↔ Z
    pub fn apply_h(&mut self, q: QubitId) {
        let q = q.index();
        std::mem::swap(&mut self.x[q], &mut self.z[q]);
    }

    /// S and S†: X → Y
    pub fn apply_s(&mut self, q: QubitId) {
        let q = q.index();
        self.z[q] ^= self.x[q];
    }

    /// √X and √X†: Z → Y
    pub fn apply_sqrt_x(&mut self, q: QubitId) {
        let q = q.index();
        self.x[q] ^= self.z[q];
    }

    /// CX: X_c → X_c X_t, Z_t → Z_c Z_t
    pub fn apply_cx(&mut self, control: QubitId, target: QubitId) {
        let (c, t) = (control.index(), target.index());
        self.x[t] ^= self.x[c];
        self.z[c] ^= self.z[t];
    }

    /// CY: X_c → X_c Y_t, X_t → Z_c X_t, Z_t → Z_c Z_t
    pub fn apply_cy(&mut self, control: QubitId, target: QubitId) {
        let (c, t) = (control.index(), target.index());
        let toggles_control = self.x[t] ^ self.z[t];
        self.x[t] ^= self.x[c];
        self.z[t] ^= self.x[c];
        self.z[c] ^= toggles_control;
    }

    /// CZ: X_a → X_a Z_b, X_b → Z_a X_b
    pub fn apply_cz(&mut self, a: QubitId, b: QubitId) {
        let (a, b) = (a.index(), b.index());
        self.z[b] ^= self.x[a];
        self.z[a] ^= self.x[b];
    }

    pub fn apply_swap(&mut self, a: QubitId, b: QubitId) {
        let (a, b) = (a.index(), b.index());
        self.x.swap(a, b);
        self.z.swap(a, b);
    }

    /// Single-qubit measurement; the frame component along the measured
    /// axis is absorbed
    pub fn measure(&mut self, q: QubitId, basis: Basis) {
        let q = q.index();
        let flip = match basis {
            Basis::Z => {
                self.z[q] = 0;
                self.x[q]
            }
            Basis::X => {
                self.x[q] = 0;
                self.z[q]
            }
            Basis::Y => {
                let flip = self.x[q] ^ self.z[q];
                let absorbed = self.x[q] & self.z[q];
                self.x[q] ^= absorbed;
                self.z[q] ^= absorbed;
                flip
            }
        };
        self.records.push(flip);
    }

    /// Reset to a fresh eigenstate: any frame is erased
    pub fn reset(&mut self, q: QubitId) {
        let q = q.index();
        self.x[q] = 0;
        self.z[q] = 0;
    }

    /// Measure a Pauli product given as `MPP` factors; frames are unchanged
    pub fn measure_product(&mut self, factors: &[Target]) {
        let mut flip = 0u64;
        for factor in factors {
            if let Target::Pauli { pauli, qubit, .. } = factor {
                let q = qubit.index();
                flip ^= match pauli {
                    PauliKind::X => self.z[q],
                    PauliKind::Z => self.x[q],
                    PauliKind::Y => self.x[q] ^ self.z[q],
                };
            }
        }
        self.records.push(flip);
    }
}
