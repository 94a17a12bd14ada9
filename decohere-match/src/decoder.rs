//! Minimum-weight perfect matching decoder

use crate::config::DEFAULT_WEIGHT_SCALE;
use crate::graph::MatchingGraph;
use crate::{DecoderError, Result};
use decohere_dem::DetectorErrorModel;
use fusion_blossom::mwpm_solver::{PrimalDualSolver, SolverSerial};
use fusion_blossom::util::{SyndromePattern, VertexIndex};
use log::debug;
use std::fmt;

/// MWPM decoder over the matching graph of a detector error model
///
/// Decoding maps a syndrome (which detectors fired) to the predicted flip of
/// each logical observable.
///
/// # Example
/// ```
/// use decohere_dem::DetectorErrorModel;
/// use decohere_match::MwpmDecoder;
///
/// let dem: DetectorErrorModel = "error(0.1) D0\nerror(0.1) D0 D1\nerror(0.1) D1 L0"
///     .parse()
///     .unwrap();
/// let mut decoder = MwpmDecoder::from_dem(&dem).unwrap();
/// assert_eq!(decoder.decode(&[false, true]).unwrap(), vec![true]);
/// assert_eq!(decoder.decode(&[true, false]).unwrap(), vec![false]);
/// ```
pub struct MwpmDecoder {
    graph: MatchingGraph,
    solver: SolverSerial,
}

impl MwpmDecoder {
    /// Decoder for an externally produced model with the default weight scale
    ///
    /// # Errors
    /// See [`MatchingGraph::from_dem`]
    pub fn from_dem(dem: &DetectorErrorModel) -> Result<Self> {
        Self::from_dem_with_scale(dem, DEFAULT_WEIGHT_SCALE)
    }

    pub fn from_dem_with_scale(dem: &DetectorErrorModel, weight_scale: f64) -> Result<Self> {
        let graph = MatchingGraph::from_dem(dem, weight_scale)?;
        Ok(Self::from_graph(graph))
    }

    pub fn from_graph(graph: MatchingGraph) -> Self {
        let solver = SolverSerial::new(&graph.initializer());
        Self { graph, solver }
    }

    pub fn graph(&self) -> &MatchingGraph {
        &self.graph
    }

    pub fn num_detectors(&self) -> usize {
        self.graph.num_detectors()
    }

    pub fn num_observables(&self) -> usize {
        self.graph.num_observables()
    }

    /// Predict observable flips from one syndrome
    ///
    /// # Errors
    /// - `SyndromeLength` unless there is one entry per detector
    /// - `UnmatchableDefect` if the fired detectors admit no matching
    pub fn decode(&mut self, syndrome: &[bool]) -> Result<Vec<bool>> {
        if syndrome.len() != self.num_detectors() {
            return Err(DecoderError::SyndromeLength {
                expected: self.num_detectors(),
                actual: syndrome.len(),
            });
        }
        let defects: Vec<usize> = syndrome
            .iter()
            .enumerate()
            .filter_map(|(d, &fired)| fired.then_some(d))
            .collect();
        let mask = self.solve(&defects)?;
        Ok(self.unpack(mask))
    }

    /// Predict observable flips from the list of fired detectors
    ///
    /// A detector listed twice cancels.
    pub fn decode_defects(&mut self, defects: &[usize]) -> Result<Vec<bool>> {
        let mut fired = vec![false; self.num_detectors()];
        for &d in defects {
            let slot = fired.get_mut(d).ok_or(DecoderError::UnknownDetector {
                detector: d,
                num_detectors: self.graph.num_detectors(),
            })?;
            *slot ^= true;
        }
        self.decode(&fired)
    }

    /// Observable flips as a bit mask, bit `k` for observable `k`
    pub fn decode_to_mask(&mut self, syndrome: &[bool]) -> Result<u64> {
        let flips = self.decode(syndrome)?;
        Ok(flips
            .iter()
            .enumerate()
            .fold(0, |mask, (k, &f)| mask | (u64::from(f) << k)))
    }

    /// Decode many syndromes, stopping at the first failure
    pub fn decode_batch(&mut self, syndromes: &[Vec<bool>]) -> Result<Vec<Vec<bool>>> {
        syndromes.iter().map(|s| self.decode(s)).collect()
    }

    fn solve(&mut self, defects: &[usize]) -> Result<u64> {
        if defects.is_empty() {
            return Ok(0);
        }
        self.graph.check_matchable(defects)?;

        let vertices: Vec<VertexIndex> = defects.iter().map(|&d| d as VertexIndex).collect();
        self.solver.solve(&SyndromePattern::new_vertices(vertices));
        let subgraph = self.solver.subgraph();
        self.solver.clear();

        let edges = self.graph.edges();
        let mask = subgraph
            .iter()
            .filter_map(|&e| edges.get(e as usize))
            .fold(0u64, |mask, edge| mask ^ edge.observables);
        debug!(
            "matched {} defects with {} edges",
            defects.len(),
            subgraph.len()
        );
        Ok(mask)
    }

    fn unpack(&self, mask: u64) -> Vec<bool> {
        (0..self.num_observables())
            .map(|k| (mask >> k) & 1 == 1)
            .collect()
    }
}

impl fmt::Debug for MwpmDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MwpmDecoder")
            .field("num_detectors", &self.num_detectors())
            .field("num_observables", &self.num_observables())
            .field("num_edges", &self.graph.edges().len())
            .finish()
    }
}
