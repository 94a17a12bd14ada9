//! Per-qubit elapsed time since the last noise injection
//!
//! A qubit decoheres whether or not it is being operated on. Per tick every
//! qubit of the universe accumulates the tick's full duration; per operation
//! only the operated or idling qubits advance. The accumulator is drained
//! when noise for that span is injected.
//!
//! # Example
//!
//! ```
//! use decohere_core::noise::QubitTimeTracker;
//! use decohere_core::QubitId;
//!
//! let mut tracker = QubitTimeTracker::new([QubitId::new(0), QubitId::new(2)]);
//! tracker.advance_all(3.0);
//! assert_eq!(tracker.take(QubitId::new(2)), Some(3.0));
//! assert_eq!(tracker.elapsed(QubitId::new(2)), Some(0.0));
//! assert_eq!(tracker.total_time(), 3.0);
//! ```

use crate::QubitId;
use std::collections::BTreeMap;

/// Tracks time accumulated by each qubit since its last injection
#[derive(Debug, Clone, Default)]
pub struct QubitTimeTracker {
    /// Elapsed time per qubit
    pending: BTreeMap<QubitId, f64>,

    /// Total wall-clock time advanced so far
    total_time: f64,
}

impl QubitTimeTracker {
    /// Track the given qubits, all starting at zero
    pub fn new(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            pending: qubits.into_iter().map(|q| (q, 0.0)).collect(),
            total_time: 0.0,
        }
    }

    /// Number of tracked qubits
    pub fn num_qubits(&self) -> usize {
        self.pending.len()
    }

    /// Advance every tracked qubit by `duration`
    pub fn advance_all(&mut self, duration: f64) {
        for t in self.pending.values_mut() {
            *t += duration;
        }
        self.total_time += duration;
    }

    /// Advance a single qubit's clock
    pub fn advance_qubit(&mut self, qubit: QubitId, duration: f64) {
        if let Some(t) = self.pending.get_mut(&qubit) {
            *t += duration;
        }
    }

    /// Elapsed time since the qubit's last injection
    pub fn elapsed(&self, qubit: QubitId) -> Option<f64> {
        self.pending.get(&qubit).copied()
    }

    /// Return the qubit's accumulated time and reset it to zero
    pub fn take(&mut self, qubit: QubitId) -> Option<f64> {
        self.pending.get_mut(&qubit).map(std::mem::take)
    }

    /// Total time advanced with [`advance_all`](Self::advance_all)
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Tracked qubits in ascending order
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.pending.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_creation() {
        let tracker = QubitTimeTracker::new((0..3).map(QubitId::new));
        assert_eq!(tracker.num_qubits(), 3);
        assert_eq!(tracker.total_time(), 0.0);
        assert_eq!(tracker.elapsed(QubitId::new(1)), Some(0.0));
        assert_eq!(tracker.elapsed(QubitId::new(5)), None);
    }

    #[test]
    fn test_take_resets_single_qubit() {
        let mut tracker = QubitTimeTracker::new((0..2).map(QubitId::new));
        tracker.advance_all(1.5);
        tracker.advance_qubit(QubitId::new(1), 0.5);
        assert_eq!(tracker.take(QubitId::new(0)), Some(1.5));
        tracker.advance_all(1.0);
        assert_eq!(tracker.elapsed(QubitId::new(0)), Some(1.0));
        assert_eq!(tracker.elapsed(QubitId::new(1)), Some(3.0));
        assert_eq!(tracker.total_time(), 2.5);
    }

    #[test]
    fn test_untracked_qubit_ignored() {
        let mut tracker = QubitTimeTracker::new([QubitId::new(4)]);
        tracker.advance_qubit(QubitId::new(9), 2.0);
        assert_eq!(tracker.take(QubitId::new(9)), None);
        let qubits: Vec<QubitId> = tracker.qubits().collect();
        assert_eq!(qubits, vec![QubitId::new(4)]);
    }
}
