//! Single- and multi-qubit Pauli operators.

use std::fmt;
use std::str::FromStr;

use derive_more::Display;
use smallvec::SmallVec;
use thiserror::Error;

/// A single-qubit Pauli operator.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Default)]
pub enum Pauli {
    #[default]
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// Parse a single Pauli character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }
}

/// Error returned when a Pauli string contains a character outside `IXYZ`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid Pauli character {0:?}, expected one of I, X, Y, Z")]
pub struct PauliStringParseError(pub char);

/// A fixed-length word of single-qubit Paulis, one per qubit slot.
///
/// Unlike a sparse Pauli observable, a `PauliString` has an explicit length
/// and identity slots are significant: `"IX"` acts on two qubits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PauliString(SmallVec<[Pauli; 2]>);

impl PauliString {
    /// The identity string on `len` qubits.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        PauliString(SmallVec::from_elem(Pauli::I, len))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The Pauli in slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> Pauli {
        self.0[index]
    }

    pub fn push(&mut self, pauli: Pauli) {
        self.0.push(pauli);
    }

    pub fn iter(&self) -> impl Iterator<Item = Pauli> + '_ {
        self.0.iter().copied()
    }

    /// Number of non-identity slots.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.0.iter().filter(|p| !p.is_identity()).count()
    }
}

impl FromIterator<Pauli> for PauliString {
    fn from_iter<T: IntoIterator<Item = Pauli>>(iter: T) -> Self {
        PauliString(iter.into_iter().collect())
    }
}

impl FromStr for PauliString {
    type Err = PauliStringParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| Pauli::from_char(c).ok_or(PauliStringParseError(c)))
            .collect()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pauli in self.iter() {
            write!(f, "{pauli}")?;
        }
        Ok(())
    }
}
