//! Matching graph construction from a detector error model
//!
//! Each detector is a vertex; one extra virtual vertex stands for the code
//! boundary. A graphlike component flipping two detectors becomes an edge
//! between them, one flipping a single detector an edge to the boundary.
//! Weights are `ln((1 - p) / p)` scaled to even integers.

use crate::{DecoderError, Result};
use decohere_core::{log_likelihood_weight, DecoherenceError};
use decohere_dem::{combine_probabilities, DetectorErrorModel, Symptom};
use fusion_blossom::util::{SolverInitializer, VertexIndex, Weight};
use log::{debug, warn};
use std::collections::HashMap;

/// One edge of the matching graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingEdge {
    pub u: VertexIndex,
    pub v: VertexIndex,
    /// Merged probability of all mechanisms on this edge
    pub probability: f64,
    pub weight: Weight,
    /// Observables flipped when this edge is part of the correction
    pub observables: u64,
}

/// Weighted matching graph with a single boundary vertex
#[derive(Debug, Clone)]
pub struct MatchingGraph {
    num_detectors: usize,
    num_observables: usize,
    edges: Vec<MatchingEdge>,
    /// Component root per detector
    components: Vec<usize>,
    /// Whether each component root is connected to the boundary
    touches_boundary: Vec<bool>,
    /// Whether each detector has at least one incident edge
    connected: Vec<bool>,
}

impl MatchingGraph {
    /// Build the graph of a graphlike model
    ///
    /// # Errors
    /// - `NonGraphlike` if a mechanism component flips more than two detectors
    /// - `EmptyModel` if no mechanism yields an edge
    /// - `Decoherence(InvalidParameter)` for a scale that is not positive
    ///   and finite
    pub fn from_dem(dem: &DetectorErrorModel, weight_scale: f64) -> Result<Self> {
        check_weight_scale(weight_scale)?;
        let boundary = dem.num_detectors;
        // (u, v) with u < v, boundary last
        let mut by_pair: HashMap<(usize, usize), (f64, u64)> = HashMap::new();
        let mut order: Vec<(usize, usize)> = Vec::new();

        for mechanism in &dem.mechanisms {
            for component in &mechanism.components {
                let Some(pair) = endpoints(component, boundary)? else {
                    warn!(
                        "error(p={}) flips only observables and cannot be corrected",
                        mechanism.probability
                    );
                    continue;
                };
                match by_pair.get_mut(&pair) {
                    Some((p, obs)) if *obs == component.observables => {
                        *p = combine_probabilities(*p, mechanism.probability);
                    }
                    Some((p, obs)) => {
                        debug!(
                            "parallel edges {:?} disagree on observables; keeping the likelier",
                            pair
                        );
                        if mechanism.probability > *p {
                            *p = mechanism.probability;
                            *obs = component.observables;
                        }
                    }
                    None => {
                        by_pair.insert(pair, (mechanism.probability, component.observables));
                        order.push(pair);
                    }
                }
            }
        }

        if order.is_empty() {
            return Err(DecoderError::EmptyModel);
        }

        let mut edges = Vec::with_capacity(order.len());
        for pair in order {
            let (probability, observables) = by_pair[&pair];
            edges.push(MatchingEdge {
                u: pair.0 as VertexIndex,
                v: pair.1 as VertexIndex,
                probability,
                weight: integer_weight(probability, weight_scale)?,
                observables,
            });
        }

        let mut graph = Self {
            num_detectors: dem.num_detectors,
            num_observables: dem.num_observables,
            edges,
            components: Vec::new(),
            touches_boundary: Vec::new(),
            connected: Vec::new(),
        };
        graph.index_components();

        debug!(
            "matching graph: {} detectors, {} edges",
            graph.num_detectors,
            graph.edges.len()
        );
        Ok(graph)
    }

    pub fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    pub fn num_observables(&self) -> usize {
        self.num_observables
    }

    pub fn edges(&self) -> &[MatchingEdge] {
        &self.edges
    }

    /// The virtual boundary vertex
    pub fn boundary(&self) -> VertexIndex {
        self.num_detectors as VertexIndex
    }

    /// Solver input: detectors plus the boundary vertex
    pub fn initializer(&self) -> SolverInitializer {
        let weighted_edges = self.edges.iter().map(|e| (e.u, e.v, e.weight)).collect();
        SolverInitializer::new(self.num_detectors + 1, weighted_edges, vec![self.boundary()])
    }

    /// Check that a defect set has a perfect matching: every defect has an
    /// edge and no boundary-free component holds an odd number of defects
    ///
    /// # Errors
    /// `UnmatchableDefect` naming the first offending detector
    pub fn check_matchable(&self, defects: &[usize]) -> Result<()> {
        let mut parity: HashMap<usize, (usize, usize)> = HashMap::new();
        for &d in defects {
            if !self.connected[d] {
                return Err(DecoderError::UnmatchableDefect(d));
            }
            let root = self.components[d];
            if !self.touches_boundary[root] {
                let entry = parity.entry(root).or_insert((0, d));
                entry.0 += 1;
            }
        }
        match parity.values().filter(|(count, _)| count % 2 == 1).map(|(_, d)| *d).min() {
            Some(d) => Err(DecoderError::UnmatchableDefect(d)),
            None => Ok(()),
        }
    }

    fn index_components(&mut self) {
        let n = self.num_detectors + 1;
        let mut parent: Vec<usize> = (0..n).collect();
        let mut connected = vec![false; self.num_detectors];

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for edge in &self.edges {
            let (u, v) = (edge.u as usize, edge.v as usize);
            for end in [u, v] {
                if end < self.num_detectors {
                    connected[end] = true;
                }
            }
            let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
            if ru != rv {
                parent[ru] = rv;
            }
        }

        let boundary_root = find(&mut parent, self.num_detectors);
        let components: Vec<usize> = (0..n).map(|x| find(&mut parent, x)).collect();
        let mut touches_boundary = vec![false; n];
        touches_boundary[boundary_root] = true;

        self.components = components;
        self.touches_boundary = touches_boundary;
        self.connected = connected;
    }
}

/// Edge endpoints of a component, `None` for observable-only components
fn endpoints(component: &Symptom, boundary: usize) -> Result<Option<(usize, usize)>> {
    match component.detectors.as_slice() {
        [] => Ok(None),
        [d] => Ok(Some((*d as usize, boundary))),
        [a, b] => Ok(Some((*a as usize, *b as usize))),
        more => Err(DecoderError::NonGraphlike {
            detectors: more.to_vec(),
        }),
    }
}

/// Reject a weight scale that is not positive and finite
pub(crate) fn check_weight_scale(weight_scale: f64) -> Result<()> {
    if !weight_scale.is_finite() || weight_scale <= 0.0 {
        return Err(DecoherenceError::invalid_parameter(
            "weight_scale",
            weight_scale,
            "must be positive and finite",
        )
        .into());
    }
    Ok(())
}

/// Even integer weight of an edge
///
/// Probabilities of one half or more carry no evidence and are clamped to
/// weight zero.
pub fn integer_weight(probability: f64, weight_scale: f64) -> Result<Weight> {
    check_weight_scale(weight_scale)?;
    if probability >= 0.5 {
        warn!(
            "edge probability {} >= 0.5, clamping its weight to zero",
            probability
        );
        return Ok(0);
    }
    let llr = log_likelihood_weight(probability)?;
    Ok(((llr * weight_scale) as Weight) * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dem(text: &str) -> DetectorErrorModel {
        text.parse().unwrap()
    }

    #[test]
    fn test_edges_and_boundary() {
        let graph = MatchingGraph::from_dem(&dem("error(0.1) D0 D1\nerror(0.1) D1 L0"), 500.0).unwrap();
        assert_eq!(graph.boundary(), 2);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[1].v, graph.boundary());
        assert_eq!(graph.edges()[1].observables, 1);
        assert!(graph.edges().iter().all(|e| e.weight % 2 == 0 && e.weight > 0));
    }

    #[test]
    fn test_parallel_edges_merge() {
        let graph =
            MatchingGraph::from_dem(&dem("error(0.1) D0 D1\nerror(0.2) D0 D1"), 500.0).unwrap();
        assert_eq!(graph.edges().len(), 1);
        assert!((graph.edges()[0].probability - 0.26).abs() < 1e-12);
    }

    #[test]
    fn test_decomposed_components_become_edges() {
        let graph = MatchingGraph::from_dem(&dem("error(0.1) D0 D1 ^ D2"), 500.0).unwrap();
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_hyperedge_rejected() {
        assert!(matches!(
            MatchingGraph::from_dem(&dem("error(0.1) D0 D1 D2"), 500.0),
            Err(DecoderError::NonGraphlike { detectors }) if detectors == vec![0, 1, 2]
        ));
    }

    #[test]
    fn test_empty_model() {
        assert!(matches!(
            MatchingGraph::from_dem(&dem("detector D0"), 500.0),
            Err(DecoderError::EmptyModel)
        ));
    }

    #[test]
    fn test_weights() {
        assert_eq!(integer_weight(0.5, 500.0).unwrap(), 0);
        assert_eq!(integer_weight(0.7, 500.0).unwrap(), 0);
        // ln(9) * 500 = 1098.6
        assert_eq!(integer_weight(0.1, 500.0).unwrap(), 2196);
    }

    #[test]
    fn test_bad_weight_scale() {
        let model = dem("error(0.1) D0 D1\nerror(0.1) D1 L0");
        for scale in [-500.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MatchingGraph::from_dem(&model, scale),
                Err(DecoderError::Decoherence(DecoherenceError::InvalidParameter { .. }))
            ));
            assert!(integer_weight(0.1, scale).is_err());
        }
    }

    #[test]
    fn test_matchability() {
        // D0-D1 isolated from the boundary, D2 on the boundary, D3 unused
        let graph = MatchingGraph::from_dem(
            &dem("error(0.1) D0 D1\nerror(0.1) D2\ndetector D3"),
            500.0,
        )
        .unwrap();
        assert!(graph.check_matchable(&[0, 1]).is_ok());
        assert!(graph.check_matchable(&[2]).is_ok());
        assert!(matches!(
            graph.check_matchable(&[1]),
            Err(DecoderError::UnmatchableDefect(1))
        ));
        assert!(matches!(
            graph.check_matchable(&[3]),
            Err(DecoderError::UnmatchableDefect(3))
        ));
    }
}
