//! Closed-form T1/T2 Pauli error probabilities
//!
//! Under the Pauli twirl approximation, amplitude damping (T1) followed by
//! pure dephasing (the part of T2 not explained by T1) becomes a Pauli
//! channel with
//!
//! ```text
//! pX = pY = (1 - exp(-t/T1)) / 4
//! pZ      = (1 - exp(-t/T2)) / 2 - (1 - exp(-t/T1)) / 4
//! ```

use super::weights::log_likelihood_weight;
use crate::{DecoherenceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probabilities of an X, Y or Z error on one qubit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PauliProbabilities {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl PauliProbabilities {
    /// No error
    pub const ZERO: Self = Self {
        px: 0.0,
        py: 0.0,
        pz: 0.0,
    };

    pub const fn new(px: f64, py: f64, pz: f64) -> Self {
        Self { px, py, pz }
    }

    /// pX + pY + pZ
    #[inline]
    pub fn total(&self) -> f64 {
        self.px + self.py + self.pz
    }

    /// Probability that no error occurs
    #[inline]
    pub fn identity(&self) -> f64 {
        1.0 - self.total()
    }

    /// `[pX, pY, pZ]`
    #[inline]
    pub fn as_array(&self) -> [f64; 3] {
        [self.px, self.py, self.pz]
    }

    /// Whether all three are non-negative and they sum to at most one
    pub fn is_physical(&self) -> bool {
        self.as_array().iter().all(|p| *p >= 0.0) && self.total() <= 1.0
    }

    /// Log-likelihood weights `ln((1 - p) / p)` for X, Y and Z
    ///
    /// A component outside `(0, 1)` has no finite weight and yields `None`.
    pub fn weights(&self) -> [Option<f64>; 3] {
        self.as_array().map(|p| log_likelihood_weight(p).ok())
    }
}

impl fmt::Display for PauliProbabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(pX={}, pY={}, pZ={})", self.px, self.py, self.pz)
    }
}

fn check_time_constant(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DecoherenceError::invalid_parameter(
            name,
            value,
            "must be positive and finite",
        ));
    }
    Ok(())
}

pub(crate) fn check_duration(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DecoherenceError::invalid_parameter(
            name,
            value,
            "must be non-negative and finite",
        ));
    }
    Ok(())
}

/// Pauli error probabilities for a qubit idling or operating for `duration`
///
/// `t2 <= 2 * t1` is not checked here. Outside that regime `pz` comes out
/// negative and is returned as computed.
///
/// # Errors
/// `InvalidParameter` when `t1` or `t2` is not positive, `duration` is
/// negative, or any input is not finite
///
/// # Example
/// ```
/// use decohere_core::pauli_probabilities;
///
/// let p = pauli_probabilities(55.4, 22.3, 102.0).unwrap();
/// assert!((p.px - 0.2086).abs() < 1e-4);
/// assert!((p.pz - 0.2914).abs() < 1e-4);
/// ```
pub fn pauli_probabilities(t1: f64, t2: f64, duration: f64) -> Result<PauliProbabilities> {
    check_time_constant("t1", t1)?;
    check_time_constant("t2", t2)?;
    check_duration("duration", duration)?;

    let relaxed = 1.0 - (-duration / t1).exp();
    let dephased = 1.0 - (-duration / t2).exp();
    let px = relaxed / 4.0;

    Ok(PauliProbabilities {
        px,
        py: px,
        pz: dephased / 2.0 - px,
    })
}

/// Whether `(t1, t2)` is in the physical regime `t2 <= 2 * t1`
#[inline]
pub fn is_standard_regime(t1: f64, t2: f64) -> bool {
    t2 <= 2.0 * t1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_duration_is_exact_zero() {
        for (t1, t2) in [(1.0, 1.0), (55.4, 22.3), (10.0, 100.0)] {
            let p = pauli_probabilities(t1, t2, 0.0).unwrap();
            assert_eq!(p, PauliProbabilities::ZERO);
        }
    }

    #[test]
    fn test_reference_values() {
        let p = pauli_probabilities(55.4, 22.3, 102.0).unwrap();
        assert_abs_diff_eq!(p.px, 0.2086, epsilon = 1e-4);
        assert_abs_diff_eq!(p.py, 0.2086, epsilon = 1e-4);
        assert_abs_diff_eq!(p.pz, 0.2914, epsilon = 1e-4);
        assert!(p.is_physical());
    }

    #[test]
    fn test_px_equals_py_and_bounded() {
        for duration in [0.0, 0.1, 1.0, 10.0, 100.0, 1000.0] {
            let p = pauli_probabilities(30.0, 40.0, duration).unwrap();
            assert_eq!(p.px, p.py);
            assert!(p.px >= 0.0 && p.px < 0.25);
        }
    }

    #[test]
    fn test_long_duration_limit() {
        let p = pauli_probabilities(20.0, 30.0, 20.0 * 1000.0).unwrap();
        assert_abs_diff_eq!(p.px, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(p.total(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_pz_passes_through() {
        let p = pauli_probabilities(10.0, 100.0, 5.0).unwrap();
        assert!(!is_standard_regime(10.0, 100.0));
        assert!(p.pz < 0.0);
        assert!(!p.is_physical());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(pauli_probabilities(0.0, 1.0, 1.0).is_err());
        assert!(pauli_probabilities(1.0, -1.0, 1.0).is_err());
        assert!(pauli_probabilities(1.0, 1.0, -0.5).is_err());
        assert!(pauli_probabilities(f64::NAN, 1.0, 1.0).is_err());
        assert!(pauli_probabilities(1.0, 1.0, f64::INFINITY).is_err());
        match pauli_probabilities(-2.0, 1.0, 1.0) {
            Err(DecoherenceError::InvalidParameter { name, .. }) => assert_eq!(name, "t1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_weights_skip_zero_components() {
        let w = PauliProbabilities::new(0.1, 0.0, 0.5).weights();
        assert_abs_diff_eq!(w[0].unwrap(), (0.9f64 / 0.1).ln(), epsilon = 1e-12);
        assert!(w[1].is_none());
        assert_abs_diff_eq!(w[2].unwrap(), 0.0, epsilon = 1e-12);
    }
}
