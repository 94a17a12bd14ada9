//! Decoder edge weights from error probabilities

use crate::{DecoherenceError, Result};

/// Log-likelihood ratio weight `ln((1 - p) / p)`
///
/// Positive for `p < 0.5`, zero at `p = 0.5`, negative above.
///
/// # Errors
/// `InvalidParameter` unless `0 < p < 1`
pub fn log_likelihood_weight(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(DecoherenceError::invalid_parameter(
            "probability",
            p,
            "weight requires 0 < p < 1",
        ));
    }
    Ok(((1.0 - p) / p).ln())
}
