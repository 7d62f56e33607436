//! A tableau bundled with randomness and a classical measurement record.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::gate::GateKind;
use crate::pauli::Pauli;
use crate::tableau::Tableau;

/// A stabilizer simulator over [`Tableau`].
///
/// Owns the random number generator used for measurement outcomes and noise
/// sampling, and appends every Z-basis measurement outcome to an internal
/// record in program order.
#[derive(Clone, Debug)]
pub struct TableauSimulator {
    tableau: Tableau,
    rng: SmallRng,
    record: Vec<bool>,
}

impl TableauSimulator {
    /// Create a simulator on `num_qubits` qubits, seeded from entropy.
    #[must_use]
    pub fn new(num_qubits: usize) -> Self {
        Self::from_rng(num_qubits, SmallRng::from_entropy())
    }

    /// Create a simulator with a reproducible seed.
    #[must_use]
    pub fn with_seed(num_qubits: usize, seed: u64) -> Self {
        Self::from_rng(num_qubits, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(num_qubits: usize, rng: SmallRng) -> Self {
        TableauSimulator {
            tableau: Tableau::new(num_qubits),
            rng,
            record: Vec::new(),
        }
    }

    /// Reinitialise to |0...0⟩ on `num_qubits` qubits and clear the
    /// measurement record. The random number generator keeps its state.
    pub fn reinit(&mut self, num_qubits: usize) {
        self.tableau = Tableau::new(num_qubits);
        self.record.clear();
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.tableau.num_qubits()
    }

    /// All Z-basis measurement outcomes so far, in program order.
    #[must_use]
    pub fn measurement_record(&self) -> &[bool] {
        &self.record
    }

    /// Apply a named Clifford unitary to a single target group.
    ///
    /// `targets` must hold one qubit for single-qubit gates and two distinct
    /// qubits for two-qubit gates.
    pub fn apply_unitary(&mut self, gate: GateKind, targets: &[usize]) {
        debug_assert!(gate.is_unitary(), "not a unitary gate: {gate}");
        if gate.is_two_qubit() {
            debug_assert_eq!(targets.len(), 2);
            let (a, b) = (targets[0], targets[1]);
            match gate {
                GateKind::Cx => self.tableau.apply_cx(a, b),
                GateKind::Cy => self.tableau.apply_cy(a, b),
                GateKind::Cz => self.tableau.apply_cz(a, b),
                GateKind::Swap => self.tableau.apply_swap(a, b),
                _ => unreachable!(),
            }
            return;
        }
        debug_assert_eq!(targets.len(), 1);
        let k = targets[0];
        match gate {
            GateKind::I => {}
            GateKind::X => self.tableau.apply_x(k),
            GateKind::Y => self.tableau.apply_y(k),
            GateKind::Z => self.tableau.apply_z(k),
            GateKind::H => self.tableau.apply_h(k),
            GateKind::Hxy => self.tableau.apply_h_xy(k),
            GateKind::Hyz => self.tableau.apply_h_yz(k),
            GateKind::S => self.tableau.apply_s(k),
            GateKind::SDag => self.tableau.apply_s_dag(k),
            GateKind::SqrtX => self.tableau.apply_sqrt_x(k),
            GateKind::SqrtXDag => self.tableau.apply_sqrt_x_dag(k),
            GateKind::SqrtY => self.tableau.apply_sqrt_y(k),
            GateKind::SqrtYDag => self.tableau.apply_sqrt_y_dag(k),
            GateKind::Cxyz => self.tableau.apply_c_xyz(k),
            GateKind::Czyx => self.tableau.apply_c_zyx(k),
            _ => unreachable!(),
        }
    }

    /// Apply a single-qubit Pauli to `target`.
    pub fn apply_pauli(&mut self, pauli: Pauli, target: usize) {
        match pauli {
            Pauli::I => {}
            Pauli::X => self.tableau.apply_x(target),
            Pauli::Y => self.tableau.apply_y(target),
            Pauli::Z => self.tableau.apply_z(target),
        }
    }

    /// Measure qubit `target` in the Z basis and append the outcome to the
    /// measurement record.
    pub fn measure_z(&mut self, target: usize) -> bool {
        let outcome = self.tableau.measure_z(target, &mut self.rng);
        self.record.push(outcome);
        outcome
    }

    /// Collapse qubit `target` to |0⟩ without recording anything.
    pub fn reset_z(&mut self, target: usize) {
        self.tableau.reset_z(target, &mut self.rng);
    }

    /// Apply X to `target` with the given probability.
    pub fn x_error(&mut self, target: usize, probability: f64) {
        if self.rng.gen::<f64>() < probability {
            self.tableau.apply_x(target);
        }
    }

    /// Apply a stochastic Pauli noise channel to its targets.
    ///
    /// `X_ERROR`, `Y_ERROR`, `Z_ERROR` and `DEPOLARIZE1` act per target;
    /// `DEPOLARIZE2` acts on consecutive target pairs.
    pub fn apply_noise(&mut self, gate: GateKind, probability: f64, targets: &[usize]) {
        debug_assert!(gate.is_noise(), "not a noise channel: {gate}");
        match gate {
            GateKind::XError => {
                for &target in targets {
                    self.x_error(target, probability);
                }
            }
            GateKind::YError => {
                for &target in targets {
                    if self.rng.gen::<f64>() < probability {
                        self.tableau.apply_y(target);
                    }
                }
            }
            GateKind::ZError => {
                for &target in targets {
                    if self.rng.gen::<f64>() < probability {
                        self.tableau.apply_z(target);
                    }
                }
            }
            GateKind::Depolarize1 => {
                for &target in targets {
                    if self.rng.gen::<f64>() < probability {
                        let pauli = [Pauli::X, Pauli::Y, Pauli::Z][self.rng.gen_range(0..3)];
                        self.apply_pauli(pauli, target);
                    }
                }
            }
            GateKind::Depolarize2 => {
                debug_assert_eq!(targets.len() % 2, 0);
                for pair in targets.chunks(2) {
                    if self.rng.gen::<f64>() < probability {
                        // Uniform over the 15 non-identity two-qubit Paulis,
                        // two bits per qubit.
                        let bits = self.rng.gen_range(1..16u8);
                        self.apply_pauli(two_bit_pauli(bits & 0b11), pair[0]);
                        self.apply_pauli(two_bit_pauli(bits >> 2), pair[1]);
                    }
                }
            }
            _ => unreachable!(),
        }
    }
}

fn two_bit_pauli(bits: u8) -> Pauli {
    match bits & 0b11 {
        0 => Pauli::I,
        1 => Pauli::X,
        2 => Pauli::Z,
        _ => Pauli::Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_grows_in_program_order() {
        let mut sim = TableauSimulator::with_seed(3, 11);
        sim.apply_unitary(GateKind::X, &[1]);
        sim.measure_z(0);
        sim.measure_z(1);
        sim.measure_z(2);
        assert_eq!(sim.measurement_record(), &[false, true, false]);
    }

    #[test]
    fn reinit_clears_state_and_record() {
        let mut sim = TableauSimulator::with_seed(2, 11);
        sim.apply_unitary(GateKind::X, &[0]);
        sim.measure_z(0);
        sim.reinit(2);
        assert!(sim.measurement_record().is_empty());
        assert!(!sim.measure_z(0));
    }

    #[test]
    fn reset_does_not_record() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        sim.apply_unitary(GateKind::X, &[0]);
        sim.reset_z(0);
        assert!(sim.measurement_record().is_empty());
        assert!(!sim.measure_z(0));
    }

    #[test]
    fn x_error_with_certainty_flips() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        sim.x_error(0, 1.0);
        assert!(sim.measure_z(0));
    }

    #[test]
    fn x_error_with_probability_zero_never_flips() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        for _ in 0..100 {
            sim.x_error(0, 0.0);
        }
        assert!(!sim.measure_z(0));
    }

    #[test]
    fn x_error_half_is_roughly_balanced() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        let trials = 1000;
        let mut ones = 0;
        for _ in 0..trials {
            sim.reinit(1);
            sim.x_error(0, 0.5);
            if sim.measure_z(0) {
                ones += 1;
            }
        }
        assert!((400..600).contains(&ones), "got {ones} ones out of {trials}");
    }

    #[test]
    fn z_error_is_invisible_in_the_z_basis() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        sim.apply_noise(GateKind::ZError, 1.0, &[0]);
        assert!(!sim.measure_z(0));
    }

    #[test]
    fn y_error_with_certainty_flips() {
        let mut sim = TableauSimulator::with_seed(1, 11);
        sim.apply_noise(GateKind::YError, 1.0, &[0]);
        assert!(sim.measure_z(0));
    }

    #[test]
    fn depolarize_with_probability_zero_is_identity() {
        let mut sim = TableauSimulator::with_seed(2, 11);
        for _ in 0..50 {
            sim.apply_noise(GateKind::Depolarize1, 0.0, &[0]);
            sim.apply_noise(GateKind::Depolarize2, 0.0, &[0, 1]);
        }
        assert!(!sim.measure_z(0));
        assert!(!sim.measure_z(1));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut sim = TableauSimulator::with_seed(4, 99);
            for qubit in 0..4 {
                sim.apply_unitary(GateKind::H, &[qubit]);
                sim.measure_z(qubit);
            }
            sim.measurement_record().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn two_bit_pauli_covers_all_values() {
        assert_eq!(two_bit_pauli(0), Pauli::I);
        assert_eq!(two_bit_pauli(1), Pauli::X);
        assert_eq!(two_bit_pauli(2), Pauli::Z);
        assert_eq!(two_bit_pauli(3), Pauli::Y);
    }
}
