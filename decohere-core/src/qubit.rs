//! Qubit labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// A qubit as numbered in circuit text, so `H 3` acts on `QubitId::new(3)`
///
/// Serialized as the bare number, which lets calibration files key their
/// T1/T2 tables by qubit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(usize);

impl QubitId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
