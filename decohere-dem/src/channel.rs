//! Independent X/Y/Z decomposition of single-qubit Pauli channels
//!
//! A detector error model lists independent mechanisms, while
//! `PAULI_CHANNEL_1` and `DEPOLARIZE1` describe mutually exclusive (disjoint)
//! outcomes. Both are diagonal in the Pauli basis with eigenvalues
//!
//! ```text
//! disjoint:     fX = pI + pX - pY - pZ   (and cyclically)
//! independent:  fX = (1 - 2y)(1 - 2z)    (and cyclically)
//! ```
//!
//! so a disjoint channel has an exact independent form iff solving the
//! second line for `x, y, z` yields values in `[0, 1/2]`.

use crate::{DemError, Result};

/// Round-off allowed below zero before a probability counts as negative
const TOLERANCE: f64 = 1e-12;

/// Independent probabilities of X, Y and Z flips
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndependentPaulis {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Validate a single probability
pub fn check_probability(context: &str, p: f64) -> Result<f64> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(DemError::invalid_probability(context, p));
    }
    Ok(p)
}

/// Convert disjoint `(pX, pY, pZ)` into independent X/Y/Z probabilities
///
/// With `approximate` set, channels without an exact decomposition fall back
/// to using the disjoint probabilities as independent ones.
///
/// # Errors
/// - `InvalidProbability` for components outside `[0, 1]` or a total above one
/// - `NonIndependentChannel` when no exact form exists and `approximate`
///   is off
pub fn disjoint_to_independent(
    context: &str,
    px: f64,
    py: f64,
    pz: f64,
    approximate: bool,
) -> Result<IndependentPaulis> {
    for p in [px, py, pz] {
        check_probability(context, p)?;
    }
    let total = px + py + pz;
    if total > 1.0 + TOLERANCE {
        return Err(DemError::invalid_probability(context, total));
    }
    if total == 0.0 {
        return Ok(IndependentPaulis {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        });
    }

    let pi = 1.0 - total;
    let fx = pi + px - py - pz;
    let fy = pi - px + py - pz;
    let fz = pi - px - py + pz;

    let solve = |a: f64, b: f64, c: f64| -> Option<f64> {
        // (1 - 2p)^2 = a * b / c
        if c <= 0.0 {
            return None;
        }
        let sq = a * b / c;
        if !sq.is_finite() || sq < 0.0 {
            return None;
        }
        let p = (1.0 - sq.sqrt()) / 2.0;
        if p < -TOLERANCE || p > 0.5 + TOLERANCE {
            return None;
        }
        Some(p.clamp(0.0, 0.5))
    };

    let exact = (fx > 0.0 && fy > 0.0 && fz > 0.0)
        .then(|| Some((solve(fy, fz, fx)?, solve(fx, fz, fy)?, solve(fx, fy, fz)?)))
        .flatten();

    match exact {
        Some((x, y, z)) => Ok(IndependentPaulis { x, y, z }),
        None if approximate => Ok(IndependentPaulis {
            x: px,
            y: py,
            z: pz,
        }),
        None => Err(DemError::NonIndependentChannel(context.to_string())),
    }
}

/// Disjoint → independent for `DEPOLARIZE1(p)`
pub fn depolarize1(context: &str, p: f64, approximate: bool) -> Result<IndependentPaulis> {
    check_probability(context, p)?;
    disjoint_to_independent(context, p / 3.0, p / 3.0, p / 3.0, approximate)
}
