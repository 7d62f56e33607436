//! Per-qubit leakage status tracking.

use std::fmt;

use derive_more::Display;
use smallvec::SmallVec;

/// Discrete leakage level of one qubit.
///
/// `0` means the qubit is in the computational subspace |C⟩; a value *n* ≥ 1
/// labels the leaked level displayed as `|n+1⟩`.
pub type LeakageLevel = u8;

/// Classification of a single-qubit `(from, to)` leakage level pair.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum TransitionType {
    /// Remains in the computational subspace.
    R,
    /// Leaves the computational subspace.
    U,
    /// Returns to the computational subspace.
    D,
    /// Moves between leaked levels.
    L,
}

impl TransitionType {
    #[must_use]
    pub fn classify(from: LeakageLevel, to: LeakageLevel) -> Self {
        match (from, to) {
            (0, 0) => TransitionType::R,
            (0, _) => TransitionType::U,
            (_, 0) => TransitionType::D,
            (_, _) => TransitionType::L,
        }
    }
}

/// An ordered vector of leakage levels for a fixed set of qubits.
///
/// Used both for the simulator's full status vector and for the joint status
/// of a channel's target group; equality is component-wise and "leaked" means
/// any component is positive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct LeakageStatus(SmallVec<[LeakageLevel; 4]>);

impl LeakageStatus {
    /// All-zero status on `num_qubits` qubits.
    #[must_use]
    pub fn new(num_qubits: usize) -> Self {
        LeakageStatus(SmallVec::from_elem(0, num_qubits))
    }

    #[must_use]
    pub fn from_levels(levels: &[LeakageLevel]) -> Self {
        LeakageStatus(SmallVec::from_slice(levels))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The level of qubit slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> LeakageLevel {
        self.0[index]
    }

    pub fn set(&mut self, index: usize, level: LeakageLevel) {
        self.0[index] = level;
    }

    /// Return slot `index` to the computational subspace.
    pub fn reset(&mut self, index: usize) {
        self.0[index] = 0;
    }

    /// Return every slot to the computational subspace.
    pub fn clear(&mut self) {
        self.0.fill(0);
    }

    #[must_use]
    pub fn is_leaked(&self, index: usize) -> bool {
        self.0[index] > 0
    }

    #[must_use]
    pub fn any_leaked(&self) -> bool {
        self.0.iter().any(|&level| level > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = LeakageLevel> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<LeakageLevel> for LeakageStatus {
    fn from_iter<T: IntoIterator<Item = LeakageLevel>>(iter: T) -> Self {
        LeakageStatus(iter.into_iter().collect())
    }
}

impl fmt::Display for LeakageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.iter() {
            if level == 0 {
                write!(f, "|C⟩")?;
            } else {
                write!(f, "|{}⟩", level + 1)?;
            }
        }
        Ok(())
    }
}
