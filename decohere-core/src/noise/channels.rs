//! Decoherence channels and their Pauli twirl

use super::decoherence::{check_duration, PauliProbabilities};
use super::types::{KrausOperator, NoiseChannel};
use crate::{DecoherenceError, Result};
use num_complex::Complex64;

/// Amplitude damping channel
///
/// Models energy relaxation (T1 decay) from |1⟩ to |0⟩ with
/// probability γ = 1 - exp(-t/T1).
///
/// # Kraus Operators
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, √γ], [0, 0]]
/// ```
///
/// # Example
/// ```
/// # use decohere_core::noise::AmplitudeDamping;
/// let channel = AmplitudeDamping::from_t1(50.0, 0.0).unwrap();
/// assert_eq!(channel.gamma(), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeDamping {
    gamma: f64,
}

impl AmplitudeDamping {
    /// # Errors
    /// Returns error if gamma is not in [0, 1]
    pub fn new(gamma: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(DecoherenceError::invalid_parameter(
                "gamma",
                gamma,
                "must be in [0, 1]",
            ));
        }
        Ok(Self { gamma })
    }

    /// Decay over `duration` for a qubit with relaxation time `t1`
    pub fn from_t1(t1: f64, duration: f64) -> Result<Self> {
        if !t1.is_finite() || t1 <= 0.0 {
            return Err(DecoherenceError::invalid_parameter(
                "t1",
                t1,
                "must be positive and finite",
            ));
        }
        check_duration("duration", duration)?;
        Self::new(1.0 - (-duration / t1).exp())
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl NoiseChannel for AmplitudeDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let g = self.gamma;
        vec![
            KrausOperator::real_2x2(1.0, 0.0, 0.0, (1.0 - g).sqrt()),
            KrausOperator::real_2x2(0.0, g.sqrt(), 0.0, 0.0),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "amplitude_damping"
    }
}

/// Phase damping channel
///
/// Models pure dephasing: a Z flip with probability λ.
///
/// # Kraus Operators
/// ```text
/// K₀ = √(1-λ) I
/// K₁ = √λ Z
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PhaseDamping {
    lambda: f64,
}

impl PhaseDamping {
    /// # Errors
    /// Returns error if lambda is not in [0, 0.5]
    pub fn new(lambda: f64) -> Result<Self> {
        if !(0.0..=0.5).contains(&lambda) {
            return Err(DecoherenceError::invalid_parameter(
                "lambda",
                lambda,
                "must be in [0, 0.5]",
            ));
        }
        Ok(Self { lambda })
    }

    /// Dephasing left over once amplitude damping is accounted for
    ///
    /// Amplitude damping alone shrinks coherences by √(1-γ); this channel
    /// supplies the rest so the total decay is exp(-t/T2), giving
    /// 1 - 2λ = exp(-t/T2 + t/(2·T1)).
    ///
    /// # Errors
    /// `InvalidParameter` for non-positive time constants, a negative
    /// duration, or `t2 > 2 * t1` (no physical residual exists)
    pub fn residual(t1: f64, t2: f64, duration: f64) -> Result<Self> {
        for (name, value) in [("t1", t1), ("t2", t2)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DecoherenceError::invalid_parameter(
                    name,
                    value,
                    "must be positive and finite",
                ));
            }
        }
        check_duration("duration", duration)?;
        if t2 > 2.0 * t1 {
            return Err(DecoherenceError::invalid_parameter(
                "t2",
                t2,
                format!("exceeds 2*t1 = {}", 2.0 * t1),
            ));
        }
        let coherence = (-duration / t2 + duration / (2.0 * t1)).exp();
        Self::new(((1.0 - coherence) / 2.0).clamp(0.0, 0.5))
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl NoiseChannel for PhaseDamping {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let keep = (1.0 - self.lambda).sqrt();
        let flip = self.lambda.sqrt();
        vec![
            KrausOperator::real_2x2(keep, 0.0, 0.0, keep),
            KrausOperator::real_2x2(flip, 0.0, 0.0, -flip),
        ]
    }

    fn num_qubits(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "phase_damping"
    }
}

/// `first` followed by `second`
#[derive(Debug)]
pub struct ComposedChannel {
    first: Box<dyn NoiseChannel>,
    second: Box<dyn NoiseChannel>,
}

impl ComposedChannel {
    /// # Errors
    /// Returns error if the two channels act on different numbers of qubits
    pub fn new(
        first: impl NoiseChannel + 'static,
        second: impl NoiseChannel + 'static,
    ) -> Result<Self> {
        if first.num_qubits() != second.num_qubits() {
            return Err(DecoherenceError::invalid_parameter(
                "num_qubits",
                second.num_qubits() as f64,
                format!("cannot compose with a {}-qubit channel", first.num_qubits()),
            ));
        }
        Ok(Self {
            first: Box::new(first),
            second: Box::new(second),
        })
    }

    /// Amplitude damping then residual dephasing for one qubit over `duration`
    pub fn decoherence(t1: f64, t2: f64, duration: f64) -> Result<Self> {
        Self::new(
            AmplitudeDamping::from_t1(t1, duration)?,
            PhaseDamping::residual(t1, t2, duration)?,
        )
    }
}

impl NoiseChannel for ComposedChannel {
    fn kraus_operators(&self) -> Vec<KrausOperator> {
        let firsts = self.first.kraus_operators();
        let seconds = self.second.kraus_operators();
        seconds
            .iter()
            .flat_map(|b| firsts.iter().map(move |a| b.mul(a)))
            .collect()
    }

    fn num_qubits(&self) -> usize {
        self.first.num_qubits()
    }

    fn name(&self) -> &str {
        "composed"
    }
}

/// Pauli twirl of a single-qubit channel
///
/// p_P = Σ_k |Tr(P K_k)|² / 4 for P in {X, Y, Z}.
///
/// # Errors
/// Returns error for channels on more than one qubit
pub fn pauli_twirl(channel: &dyn NoiseChannel) -> Result<PauliProbabilities> {
    if channel.num_qubits() != 1 {
        return Err(DecoherenceError::invalid_parameter(
            "num_qubits",
            channel.num_qubits() as f64,
            "Pauli twirl is defined for single-qubit channels",
        ));
    }
    let i = Complex64::new(0.0, 1.0);
    let mut probs = PauliProbabilities::ZERO;
    for k in channel.kraus_operators() {
        let tr_x = k.get(0, 1) + k.get(1, 0);
        let tr_y = i * k.get(0, 1) - i * k.get(1, 0);
        let tr_z = k.get(0, 0) - k.get(1, 1);
        probs.px += tr_x.norm_sqr() / 4.0;
        probs.py += tr_y.norm_sqr() / 4.0;
        probs.pz += tr_z.norm_sqr() / 4.0;
    }
    Ok(probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::pauli_probabilities;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_amplitude_damping_channel() {
        let channel = AmplitudeDamping::new(0.1).unwrap();
        assert_eq!(channel.kraus_operators().len(), 2);
        assert!(channel.verify_completeness(1e-10));
        assert!(AmplitudeDamping::new(1.5).is_err());
    }

    #[test]
    fn test_amplitude_damping_from_t1() {
        let channel = AmplitudeDamping::from_t1(50.0, 0.1).unwrap();
        assert_abs_diff_eq!(channel.gamma(), 1.0 - (-0.1f64 / 50.0).exp(), epsilon = 1e-15);
        assert!(AmplitudeDamping::from_t1(0.0, 1.0).is_err());
    }

    #[test]
    fn test_phase_damping_channel() {
        let channel = PhaseDamping::new(0.05).unwrap();
        assert!(channel.verify_completeness(1e-10));
        assert!(PhaseDamping::new(0.6).is_err());
    }

    #[test]
    fn test_residual_dephasing_at_t2_limit() {
        // T2 = 2*T1 means relaxation accounts for all dephasing
        let channel = PhaseDamping::residual(10.0, 20.0, 7.0).unwrap();
        assert_abs_diff_eq!(channel.lambda(), 0.0, epsilon = 1e-15);
        assert!(PhaseDamping::residual(10.0, 25.0, 7.0).is_err());
    }

    #[test]
    fn test_composed_channel_is_complete() {
        let channel = ComposedChannel::decoherence(55.4, 22.3, 102.0).unwrap();
        assert_eq!(channel.kraus_operators().len(), 4);
        assert!(channel.verify_completeness(1e-10));
    }

    #[test]
    fn test_twirl_matches_closed_form() {
        for (t1, t2, t) in [(55.4, 22.3, 102.0), (30.0, 40.0, 1.5), (100.0, 200.0, 50.0)] {
            let channel = ComposedChannel::decoherence(t1, t2, t).unwrap();
            let twirled = pauli_twirl(&channel).unwrap();
            let closed = pauli_probabilities(t1, t2, t).unwrap();
            assert_abs_diff_eq!(twirled.px, closed.px, epsilon = 1e-12);
            assert_abs_diff_eq!(twirled.py, closed.py, epsilon = 1e-12);
            assert_abs_diff_eq!(twirled.pz, closed.pz, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_twirl_of_phase_damping() {
        let p = pauli_twirl(&PhaseDamping::new(0.2).unwrap()).unwrap();
        assert_abs_diff_eq!(p.px, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.py, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.pz, 0.2, epsilon = 1e-15);
    }
}
