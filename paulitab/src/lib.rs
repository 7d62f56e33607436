//! Pauli primitives and a CHP-style Clifford tableau simulator.
//!
//! `paulitab` is the stabilizer layer underneath [`leakiverse`]: it knows
//! nothing about leakage, and simply evolves an *n*-qubit stabilizer state
//! under the named Clifford gate set, Z-basis measurement and reset, and a
//! handful of stochastic Pauli noise channels.
//!
//! # Overview
//!
//! - [`Pauli`] / [`PauliString`]: single- and multi-qubit Pauli operators.
//! - [`GateKind`]: the full textual instruction vocabulary (unitaries,
//!   measurement, reset, noise), with stim-compatible names and aliases.
//! - [`Tableau`]: the Aaronson-Gottesman destabilizer/stabilizer tableau with
//!   bit-packed rows.
//! - [`TableauSimulator`]: a tableau plus a random number generator and an
//!   append-only classical measurement record.
//!
//! # Quick Start
//!
//! ```
//! use paulitab::{GateKind, TableauSimulator};
//!
//! let mut sim = TableauSimulator::with_seed(2, 7);
//! sim.apply_unitary(GateKind::H, &[0]);
//! sim.apply_unitary(GateKind::Cx, &[0, 1]);
//! let a = sim.measure_z(0);
//! let b = sim.measure_z(1);
//! assert_eq!(a, b);
//! ```
//!
//! [`leakiverse`]: https://docs.rs/leakiverse

pub mod gate;
pub mod pauli;
pub mod simulator;
pub mod tableau;

pub use gate::{GateKind, UnknownGate};
pub use pauli::{Pauli, PauliString, PauliStringParseError};
pub use simulator::TableauSimulator;
pub use tableau::Tableau;
