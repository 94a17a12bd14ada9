//! Decoder construction configuration

use decohere_core::AnnotatorConfig;
use decohere_dem::DemOptions;
use serde::{Deserialize, Serialize};

/// Scale from log-likelihood weights to the integer weights the solver uses
pub const DEFAULT_WEIGHT_SCALE: f64 = 500.0;

/// Configuration for [`build_decoder_with`](crate::build_decoder_with)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// How the circuit is annotated with T1/T2 noise
    pub annotator: AnnotatorConfig,

    /// How the detector error model is derived
    pub dem: DemOptions,

    /// Half the integer weight per unit of `ln((1 - p) / p)`; truncated
    /// weights are doubled so the solver sees even values
    ///
    /// Default: 500.0
    pub weight_scale: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            annotator: AnnotatorConfig::default(),
            dem: DemOptions::default(),
            weight_scale: DEFAULT_WEIGHT_SCALE,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotator(mut self, annotator: AnnotatorConfig) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn with_dem_options(mut self, dem: DemOptions) -> Self {
        self.dem = dem;
        self
    }

    pub fn with_weight_scale(mut self, scale: f64) -> Self {
        self.weight_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decohere_core::RegimePolicy;

    #[test]
    fn test_builder() {
        let config = DecoderConfig::new()
            .with_annotator(AnnotatorConfig::new().with_regime(RegimePolicy::PassThrough))
            .with_weight_scale(100.0);
        assert_eq!(config.annotator.regime, RegimePolicy::PassThrough);
        assert_eq!(config.weight_scale, 100.0);
        assert!(config.dem.decompose_errors);
    }

    #[test]
    fn test_partial_json() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"annotator": {"regime": "pass_through"}}"#).unwrap();
        assert_eq!(config.annotator.regime, RegimePolicy::PassThrough);
        assert_eq!(config.weight_scale, DEFAULT_WEIGHT_SCALE);
    }
}
