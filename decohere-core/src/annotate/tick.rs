//! Splitting a flat instruction list into ticks

use crate::circuit::Instruction;
use crate::noise::DurationTable;
use crate::{DecoherenceError, Result};
use std::ops::Range;

/// Instructions of one tick as an index range into the flat list
///
/// `marker` is the index of the `TICK` closing the slice; the last slice
/// runs to the end of the circuit and has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlice {
    pub range: Range<usize>,
    pub marker: Option<usize>,
}

impl TimeSlice {
    /// The slice's instructions
    pub fn instructions<'a>(&self, flat: &'a [Instruction]) -> &'a [Instruction] {
        &flat[self.range.clone()]
    }

    /// Longest operation in the slice, `0` when it holds only annotations
    pub fn duration(&self, flat: &[Instruction], durations: &DurationTable) -> Result<f64> {
        let mut longest = 0.0f64;
        for inst in self.instructions(flat) {
            longest = longest.max(durations.duration_of(inst)?);
        }
        Ok(longest)
    }
}

/// Partition `flat` at its `TICK` markers
///
/// M markers give M + 1 slices.
///
/// # Errors
/// `StructuralError` for a `TICK` carrying targets or arguments
pub fn partition(flat: &[Instruction]) -> Result<Vec<TimeSlice>> {
    let mut slices = Vec::new();
    let mut start = 0;
    for (index, inst) in flat.iter().enumerate() {
        if !inst.is_tick() {
            continue;
        }
        if !inst.targets().is_empty() || !inst.args().is_empty() {
            return Err(DecoherenceError::structural(format!(
                "malformed tick marker '{}' at instruction {}",
                inst, index
            )));
        }
        slices.push(TimeSlice {
            range: start..index,
            marker: Some(index),
        });
        start = index + 1;
    }
    slices.push(TimeSlice {
        range: start..flat.len(),
        marker: None,
    });
    Ok(slices)
}
