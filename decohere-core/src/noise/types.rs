//! Kraus operators and the channel trait

use crate::{DecoherenceError, Result};
use num_complex::Complex64;
use std::fmt;

/// A Kraus operator representing a quantum operation
///
/// Quantum channels are described by a set of Kraus operators {K_i}
/// that satisfy the completeness relation: Σ K_i† K_i = I
///
/// The channel transforms a density matrix ρ as:
/// ρ → Σ_i K_i ρ K_i†
#[derive(Clone, Debug, PartialEq)]
pub struct KrausOperator {
    /// Matrix elements in row-major order
    pub matrix: Vec<Complex64>,
    /// Dimension of the operator (2^n for n qubits)
    pub dimension: usize,
}

impl KrausOperator {
    /// Create a new Kraus operator from a matrix
    ///
    /// # Errors
    /// Returns error if dimension is not a power of 2 or the matrix size
    /// doesn't match
    pub fn new(matrix: Vec<Complex64>, dimension: usize) -> Result<Self> {
        if dimension == 0 || !dimension.is_power_of_two() {
            return Err(DecoherenceError::invalid_parameter(
                "dimension",
                dimension as f64,
                "Kraus operator dimension must be a power of 2",
            ));
        }
        if matrix.len() != dimension * dimension {
            return Err(DecoherenceError::invalid_parameter(
                "matrix length",
                matrix.len() as f64,
                format!("expected {}x{} elements", dimension, dimension),
            ));
        }
        Ok(Self { matrix, dimension })
    }

    /// Single-qubit operator from real entries `[[a, b], [c, d]]`
    pub fn real_2x2(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            matrix: vec![
                Complex64::new(a, 0.0),
                Complex64::new(b, 0.0),
                Complex64::new(c, 0.0),
                Complex64::new(d, 0.0),
            ],
            dimension: 2,
        }
    }

    /// Number of qubits this operator acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.dimension.trailing_zeros() as usize
    }

    /// Matrix element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * self.dimension + col]
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let n = self.dimension;
        let mut adj = vec![Complex64::new(0.0, 0.0); self.matrix.len()];
        for i in 0..n {
            for j in 0..n {
                adj[j * n + i] = self.matrix[i * n + j].conj();
            }
        }
        Self {
            matrix: adj,
            dimension: n,
        }
    }

    /// Matrix product `self · rhs`; both must have the same dimension
    pub(crate) fn mul(&self, rhs: &KrausOperator) -> Self {
        let n = self.dimension;
        let mut out = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for j in 0..n {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..n {
                    acc += self.get(i, k) * rhs.get(k, j);
                }
                out[i * n + j] = acc;
            }
        }
        Self {
            matrix: out,
            dimension: n,
        }
    }
}

/// Trait for quantum noise channels in Kraus form
pub trait NoiseChannel: Send + Sync + fmt::Debug {
    /// Kraus operators defining this channel
    ///
    /// The operators must satisfy Σ_i K_i† K_i = I within numerical
    /// precision.
    fn kraus_operators(&self) -> Vec<KrausOperator>;

    /// Number of qubits this channel acts on
    fn num_qubits(&self) -> usize;

    /// Name of this noise channel (e.g. "amplitude_damping")
    fn name(&self) -> &str;

    fn description(&self) -> String {
        format!("{}-qubit {} channel", self.num_qubits(), self.name())
    }

    /// Verify the completeness relation Σ K_i† K_i = I
    fn verify_completeness(&self, tolerance: f64) -> bool {
        let operators = self.kraus_operators();
        let Some(first) = operators.first() else {
            return false;
        };
        let dim = first.dimension;
        let mut sum = vec![Complex64::new(0.0, 0.0); dim * dim];

        for kraus in &operators {
            let product = kraus.adjoint().mul(kraus);
            for (s, p) in sum.iter_mut().zip(&product.matrix) {
                *s += p;
            }
        }

        (0..dim).all(|i| {
            (0..dim).all(|j| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (sum[i * dim + j] - Complex64::new(expected, 0.0)).norm() <= tolerance
            })
        })
    }
}
