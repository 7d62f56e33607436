//! The textual instruction vocabulary shared by circuits and simulators.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when an instruction name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instruction name {0:?}")]
pub struct UnknownGate(pub String);

/// One kind of circuit instruction, in stim's textual vocabulary.
///
/// Covers the Clifford unitaries, Z-basis measurement and reset, the
/// measurement/reset bases that exist in the language but are rejected at
/// execution time, and the stochastic Pauli noise channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    // Single-qubit Clifford unitaries.
    I,
    X,
    Y,
    Z,
    H,
    Hxy,
    Hyz,
    S,
    SDag,
    SqrtX,
    SqrtXDag,
    SqrtY,
    SqrtYDag,
    Cxyz,
    Czyx,
    // Two-qubit Clifford unitaries.
    Cx,
    Cy,
    Cz,
    Swap,
    // Z-basis collapsing instructions.
    M,
    Mr,
    R,
    // Bases that parse but are rejected by the leakage simulator.
    Mx,
    My,
    Rx,
    Ry,
    Mrx,
    Mry,
    Mpp,
    // Stochastic Pauli noise channels.
    XError,
    YError,
    ZError,
    Depolarize1,
    Depolarize2,
}

impl GateKind {
    /// Look up a gate by its textual name, accepting the usual aliases
    /// (`CNOT` for `CX`, `MZ` for `M`, `SQRT_Z` for `S`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        use GateKind::*;
        let kind = match name {
            "I" => I,
            "X" => X,
            "Y" => Y,
            "Z" => Z,
            "H" | "H_XZ" => H,
            "H_XY" => Hxy,
            "H_YZ" => Hyz,
            "S" | "SQRT_Z" => S,
            "S_DAG" | "SQRT_Z_DAG" => SDag,
            "SQRT_X" => SqrtX,
            "SQRT_X_DAG" => SqrtXDag,
            "SQRT_Y" => SqrtY,
            "SQRT_Y_DAG" => SqrtYDag,
            "C_XYZ" => Cxyz,
            "C_ZYX" => Czyx,
            "CX" | "CNOT" | "ZCX" => Cx,
            "CY" | "ZCY" => Cy,
            "CZ" | "ZCZ" => Cz,
            "SWAP" => Swap,
            "M" | "MZ" => M,
            "MR" | "MRZ" => Mr,
            "R" | "RZ" => R,
            "MX" => Mx,
            "MY" => My,
            "RX" => Rx,
            "RY" => Ry,
            "MRX" => Mrx,
            "MRY" => Mry,
            "MPP" => Mpp,
            "X_ERROR" => XError,
            "Y_ERROR" => YError,
            "Z_ERROR" => ZError,
            "DEPOLARIZE1" => Depolarize1,
            "DEPOLARIZE2" => Depolarize2,
            _ => return None,
        };
        Some(kind)
    }

    /// The canonical textual name.
    #[must_use]
    pub fn name(self) -> &'static str {
        use GateKind::*;
        match self {
            I => "I",
            X => "X",
            Y => "Y",
            Z => "Z",
            H => "H",
            Hxy => "H_XY",
            Hyz => "H_YZ",
            S => "S",
            SDag => "S_DAG",
            SqrtX => "SQRT_X",
            SqrtXDag => "SQRT_X_DAG",
            SqrtY => "SQRT_Y",
            SqrtYDag => "SQRT_Y_DAG",
            Cxyz => "C_XYZ",
            Czyx => "C_ZYX",
            Cx => "CX",
            Cy => "CY",
            Cz => "CZ",
            Swap => "SWAP",
            M => "M",
            Mr => "MR",
            R => "R",
            Mx => "MX",
            My => "MY",
            Rx => "RX",
            Ry => "RY",
            Mrx => "MRX",
            Mry => "MRY",
            Mpp => "MPP",
            XError => "X_ERROR",
            YError => "Y_ERROR",
            ZError => "Z_ERROR",
            Depolarize1 => "DEPOLARIZE1",
            Depolarize2 => "DEPOLARIZE2",
        }
    }

    /// True for Clifford unitaries (including the identity).
    #[must_use]
    pub fn is_unitary(self) -> bool {
        use GateKind::*;
        matches!(
            self,
            I | X | Y | Z | H | Hxy | Hyz | S | SDag | SqrtX | SqrtXDag | SqrtY | SqrtYDag | Cxyz | Czyx | Cx | Cy | Cz | Swap
        )
    }

    /// True for unitaries acting on target pairs.
    #[must_use]
    pub fn is_two_qubit(self) -> bool {
        matches!(self, GateKind::Cx | GateKind::Cy | GateKind::Cz | GateKind::Swap)
    }

    /// True if executing this gate appends to the measurement record.
    #[must_use]
    pub fn produces_measurements(self) -> bool {
        use GateKind::*;
        matches!(self, M | Mr | Mx | My | Mrx | Mry | Mpp)
    }

    /// True if executing this gate resets its targets.
    #[must_use]
    pub fn is_reset(self) -> bool {
        use GateKind::*;
        matches!(self, R | Mr | Rx | Ry | Mrx | Mry)
    }

    /// True for stochastic Pauli noise channels.
    #[must_use]
    pub fn is_noise(self) -> bool {
        use GateKind::*;
        matches!(self, XError | YError | ZError | Depolarize1 | Depolarize2)
    }

    /// True for measurement/reset bases outside the supported Z basis.
    #[must_use]
    pub fn is_unsupported_basis(self) -> bool {
        use GateKind::*;
        matches!(self, Mx | My | Rx | Ry | Mrx | Mry | Mpp)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateKind {
    type Err = UnknownGate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::from_name(s).ok_or_else(|| UnknownGate(s.to_owned()))
    }
}
