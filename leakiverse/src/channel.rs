//! Stochastic leakage transition tables attached to gates.

use std::fmt;

use rand::Rng;

use paulitab::{Pauli, PauliString};

use crate::error::LeakyError;
use crate::status::{LeakageStatus, TransitionType};

/// Tolerance for cumulative-probability normalisation checks.
pub const NORMALISATION_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
struct Outcome {
    to: LeakageStatus,
    pauli: PauliString,
}

/// A stochastic map from the joint leakage status of one or two qubits to a
/// new joint status plus a Pauli correction.
///
/// The table keeps initial statuses in insertion order and, per initial
/// status, a parallel list of outcomes and a cumulative probability prefix
/// over them. The order is observable: it defines the prefix boundaries used
/// by [`sample`](Self::sample) and the line order of the `Display`
/// rendering. Since only a handful of initial statuses are ever populated, a
/// flat scan of the status list beats hashing and keeps that order for free.
///
/// Channels are grown with [`add_transition`](Self::add_transition),
/// validated once with [`safety_check`](Self::safety_check), and treated as
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct LeakyPauliChannel {
    num_qubits: usize,
    initial_statuses: Vec<LeakageStatus>,
    outcomes: Vec<Vec<Outcome>>,
    cumulative: Vec<Vec<f64>>,
}

impl LeakyPauliChannel {
    /// Create an empty channel acting on `num_qubits` qubits.
    ///
    /// # Panics
    ///
    /// Panics unless `num_qubits` is 1 or 2.
    #[must_use]
    pub fn new(num_qubits: usize) -> Self {
        assert!(
            num_qubits == 1 || num_qubits == 2,
            "leaky Pauli channels support 1 or 2 qubits, got {num_qubits}"
        );
        LeakyPauliChannel {
            num_qubits,
            initial_statuses: Vec::new(),
            outcomes: Vec::new(),
            cumulative: Vec::new(),
        }
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Total number of registered transitions across all initial statuses.
    #[must_use]
    pub fn num_transitions(&self) -> usize {
        self.outcomes.iter().map(Vec::len).sum()
    }

    /// Initial statuses in insertion order.
    pub fn initial_statuses(&self) -> impl Iterator<Item = &LeakageStatus> {
        self.initial_statuses.iter()
    }

    /// Register a transition `from → (to, pauli)` with the given probability.
    ///
    /// Adding the same `(from, to, pauli)` triple again accumulates its
    /// probability instead of creating a duplicate entry.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvalidArgument`] if any of `from`, `to`, `pauli` does
    /// not have length `num_qubits`, or the probability is not a finite
    /// non-negative number; [`LeakyError::ProbabilityOverflow`] if the
    /// cumulative probability for `from` would exceed 1 beyond the
    /// [`NORMALISATION_TOLERANCE`].
    pub fn add_transition(
        &mut self,
        from: LeakageStatus,
        to: LeakageStatus,
        pauli: PauliString,
        probability: f64,
    ) -> Result<(), LeakyError> {
        if from.len() != self.num_qubits || to.len() != self.num_qubits || pauli.len() != self.num_qubits {
            return Err(LeakyError::invalid_argument(format!(
                "transition {from} --{pauli}--> {to} does not match channel arity {}",
                self.num_qubits
            )));
        }
        if !probability.is_finite() || probability < 0.0 {
            return Err(LeakyError::invalid_argument(format!(
                "transition probability {probability} is not a finite non-negative number"
            )));
        }

        let Some(index) = self.initial_statuses.iter().position(|status| *status == from) else {
            self.initial_statuses.push(from);
            self.outcomes.push(vec![Outcome { to, pauli }]);
            self.cumulative.push(vec![probability]);
            return Ok(());
        };

        let cumulative = &mut self.cumulative[index];
        let new_total = cumulative.last().copied().unwrap_or(0.0) + probability;
        if new_total > 1.0 + NORMALISATION_TOLERANCE {
            return Err(LeakyError::ProbabilityOverflow {
                initial_status: from.to_string(),
                probability,
                cumulative: new_total,
            });
        }

        let outcomes = &mut self.outcomes[index];
        let existing = outcomes
            .iter()
            .position(|outcome| outcome.to == to && outcome.pauli == pauli);
        match existing {
            Some(slot) => {
                for prefix in &mut cumulative[slot..] {
                    *prefix += probability;
                }
            }
            None => {
                outcomes.push(Outcome { to, pauli });
                cumulative.push(new_total);
            }
        }
        Ok(())
    }

    /// The probability registered for an exact `(from, to, pauli)` triple, or
    /// 0 when the triple is absent.
    #[must_use]
    pub fn get_prob_from_to(&self, from: &LeakageStatus, to: &LeakageStatus, pauli: &PauliString) -> f64 {
        let Some(index) = self.initial_statuses.iter().position(|status| status == from) else {
            return 0.0;
        };
        let Some(slot) = self.outcomes[index]
            .iter()
            .position(|outcome| outcome.to == *to && outcome.pauli == *pauli)
        else {
            return 0.0;
        };
        let cumulative = &self.cumulative[index];
        if slot == 0 {
            cumulative[0]
        } else {
            cumulative[slot] - cumulative[slot - 1]
        }
    }

    /// Sample an outcome for the given initial status, or `None` when the
    /// status is not registered.
    ///
    /// The draw is uniform over `[0, prefix.back)` rather than `[0, 1)`, so
    /// sampling works on partially built tables; production callers are
    /// expected to have run [`safety_check`](Self::safety_check) first.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        status: &LeakageStatus,
        rng: &mut R,
    ) -> Option<(&LeakageStatus, &PauliString)> {
        let index = self.initial_statuses.iter().position(|s| s == status)?;
        let cumulative = &self.cumulative[index];
        let total = *cumulative.last()?;
        let draw = rng.gen::<f64>() * total;
        let slot = cumulative
            .partition_point(|&prefix| prefix <= draw)
            .min(cumulative.len() - 1);
        let outcome = &self.outcomes[index][slot];
        Some((&outcome.to, &outcome.pauli))
    }

    /// Verify the channel invariants.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvariantViolation`] if any initial status's cumulative
    /// probability differs from 1 by more than [`NORMALISATION_TOLERANCE`],
    /// or any outcome attaches a non-identity Pauli to a qubit slot whose
    /// transition does not stay in the computational subspace.
    pub fn safety_check(&self) -> Result<(), LeakyError> {
        for (index, from) in self.initial_statuses.iter().enumerate() {
            let total = self.cumulative[index].last().copied().unwrap_or(0.0);
            if (total - 1.0).abs() > NORMALISATION_TOLERANCE {
                return Err(LeakyError::invariant_violation(format!(
                    "cumulative probability for initial status {from} is {total}, expected 1"
                )));
            }
            for outcome in &self.outcomes[index] {
                for qubit in 0..self.num_qubits {
                    let kind = TransitionType::classify(from.get(qubit), outcome.to.get(qubit));
                    if kind != TransitionType::R && outcome.pauli.get(qubit) != Pauli::I {
                        return Err(LeakyError::invariant_violation(format!(
                            "transition {from} --{}--> {} attaches Pauli {} to qubit {qubit}, \
                             which does not stay in the computational subspace",
                            outcome.pauli,
                            outcome.to,
                            outcome.pauli.get(qubit)
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for LeakyPauliChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LeakyPauliChannel(num_qubits={})", self.num_qubits)?;
        for (index, from) in self.initial_statuses.iter().enumerate() {
            let mut previous = 0.0;
            for (outcome, &prefix) in self.outcomes[index].iter().zip(&self.cumulative[index]) {
                writeln!(
                    f,
                    "    {from} --{}--> {}: {}",
                    outcome.pauli,
                    outcome.to,
                    prefix - previous
                )?;
                previous = prefix;
            }
        }
        Ok(())
    }
}
