//! End-to-end decoder construction from a noiseless circuit

use crate::config::DecoderConfig;
use crate::decoder::MwpmDecoder;
use crate::graph::check_weight_scale;
use crate::Result;
use decohere_core::{annotate_with, Circuit, QubitId};
use decohere_dem::DetectorErrorModel;
use log::debug;
use std::collections::HashMap;

/// Build a decoder for `circuit` under T1/T2 decoherence
///
/// Annotates the circuit tick by tick, derives its detector error model and
/// wraps the weighted matching graph in an MWPM solver.
///
/// # Errors
/// Any annotation error (missing or invalid parameters, malformed circuit),
/// DEM derivation error, or graph error such as `EmptyModel` for a circuit
/// with no `TICK` markers
pub fn build_decoder(
    circuit: &Circuit,
    t1_map: &HashMap<QubitId, f64>,
    t2_map: &HashMap<QubitId, f64>,
    op_duration: &HashMap<String, f64>,
) -> Result<MwpmDecoder> {
    build_decoder_with(circuit, t1_map, t2_map, op_duration, &DecoderConfig::default())
}

/// [`build_decoder`] with an explicit configuration
pub fn build_decoder_with(
    circuit: &Circuit,
    t1_map: &HashMap<QubitId, f64>,
    t2_map: &HashMap<QubitId, f64>,
    op_duration: &HashMap<String, f64>,
    config: &DecoderConfig,
) -> Result<MwpmDecoder> {
    check_weight_scale(config.weight_scale)?;
    let dem = noisy_model(circuit, t1_map, t2_map, op_duration, config)?;
    let decoder = MwpmDecoder::from_dem_with_scale(&dem, config.weight_scale)?;
    debug!("built decoder: {:?}", decoder);
    Ok(decoder)
}

/// The detector error model [`build_decoder_with`] matches against
pub fn noisy_model(
    circuit: &Circuit,
    t1_map: &HashMap<QubitId, f64>,
    t2_map: &HashMap<QubitId, f64>,
    op_duration: &HashMap<String, f64>,
    config: &DecoderConfig,
) -> Result<DetectorErrorModel> {
    let annotated = annotate_with(circuit, t1_map, t2_map, op_duration, config.annotator)?;
    Ok(DetectorErrorModel::from_circuit(&annotated, &config.dem)?)
}
