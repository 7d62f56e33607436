//! Building leaky Pauli channels from Kraus operators.
//!
//! A physical error process on a `num_level`-level qudit system is described
//! by a set of Kraus operators. [`decompose_kraus_operators`] projects each
//! operator onto the leakage-status sectors of the level space and twirls the
//! in-subspace blocks against the Pauli basis (generalized Pauli twirling),
//! yielding the incoherent [`LeakyPauliChannel`] approximation of the
//! process.
//!
//! Level convention: basis states `|0⟩, |1⟩` form the computational subspace
//! of each qudit, and basis state `l + 1` (for internal level label `l ≥ 1`)
//! is the leaked level displayed as `|l+1⟩`.

use itertools::Itertools;
use nalgebra::DMatrix;
use num_complex::Complex64;
use smallvec::{smallvec, SmallVec};

use paulitab::{Pauli, PauliString};

use crate::channel::LeakyPauliChannel;
use crate::error::LeakyError;
use crate::status::{LeakageLevel, LeakageStatus, TransitionType};

/// Contributions below this weight are dropped from the channel.
const PROBABILITY_CUTOFF: f64 = 1e-9;

/// Basis states of one qudit selected by a per-qubit projector.
type Projector = SmallVec<[usize; 2]>;

fn pauli_matrix(pauli: Pauli) -> DMatrix<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    let entries = match pauli {
        Pauli::I => [one, zero, zero, one],
        Pauli::X => [zero, one, one, zero],
        Pauli::Y => [zero, -i, i, zero],
        Pauli::Z => [one, zero, zero, -one],
    };
    DMatrix::from_row_slice(2, 2, &entries)
}

/// Decompose a Kraus-operator error process into a leaky Pauli channel.
///
/// Each operator must be a square `num_level.pow(num_qubits)` complex matrix
/// over the qudit product space. The resulting channel is validated with
/// [`LeakyPauliChannel::safety_check`] before being returned, so a
/// trace-preserving process yields a normalised channel.
///
/// # Errors
///
/// [`LeakyError::InvalidArgument`] on unsupported arity, too few levels or
/// mis-shaped operators; [`LeakyError::InvariantViolation`] if the
/// accumulated channel fails its safety check (e.g. the operators do not
/// form a trace-preserving set).
pub fn decompose_kraus_operators(
    kraus_operators: &[DMatrix<Complex64>],
    num_qubits: usize,
    num_level: usize,
) -> Result<LeakyPauliChannel, LeakyError> {
    if num_qubits != 1 && num_qubits != 2 {
        return Err(LeakyError::invalid_argument(format!(
            "Kraus decomposition supports 1 or 2 qubits, got {num_qubits}"
        )));
    }
    if num_level < 2 {
        return Err(LeakyError::invalid_argument(format!(
            "need at least 2 levels per qudit, got {num_level}"
        )));
    }
    let dimension = num_level.pow(num_qubits as u32);
    for kraus in kraus_operators {
        if kraus.nrows() != dimension || kraus.ncols() != dimension {
            return Err(LeakyError::invalid_argument(format!(
                "Kraus operator is {}×{}, expected {dimension}×{dimension}",
                kraus.nrows(),
                kraus.ncols()
            )));
        }
    }

    let mut channel = LeakyPauliChannel::new(num_qubits);
    let all_status: Vec<LeakageStatus> = (0..num_qubits)
        .map(|_| 0..num_level - 1)
        .multi_cartesian_product()
        .map(|levels| levels.into_iter().map(|level| level as LeakageLevel).collect())
        .collect();

    for kraus in kraus_operators {
        for initial_status in &all_status {
            for final_status in &all_status {
                accumulate_transitions(&mut channel, kraus, num_level, initial_status, final_status)?;
            }
        }
    }

    channel.safety_check()?;
    Ok(channel)
}

fn accumulate_transitions(
    channel: &mut LeakyPauliChannel,
    kraus: &DMatrix<Complex64>,
    num_level: usize,
    initial_status: &LeakageStatus,
    final_status: &LeakageStatus,
) -> Result<(), LeakyError> {
    let num_qubits = initial_status.len();
    let transition_types: Vec<TransitionType> = initial_status
        .iter()
        .zip(final_status.iter())
        .map(|(from, to)| TransitionType::classify(from, to))
        .collect();
    let qubits_in_r: Vec<usize> = (0..num_qubits)
        .filter(|&qubit| transition_types[qubit] == TransitionType::R)
        .collect();
    let num_up = transition_types
        .iter()
        .filter(|&&kind| kind == TransitionType::U)
        .count();
    let prefactor = 0.5f64.powi(num_up as i32);

    // An up (down) transition leaves from (arrives into) an unknown basis
    // state of the subspace, so those projectors scatter over |0⟩ and |1⟩.
    let initial_combos = scattered_projectors(initial_status, &transition_types, TransitionType::U);
    let final_combos = scattered_projectors(final_status, &transition_types, TransitionType::D);

    for initial_projector in &initial_combos {
        for final_projector in &final_combos {
            let projected = project_kraus(kraus, num_level, initial_projector, final_projector);
            let mut pauli_channel: Vec<(PauliString, f64)> = Vec::new();
            if qubits_in_r.is_empty() {
                let probability = prefactor * projected[(0, 0)].norm_sqr();
                pauli_channel.push((PauliString::identity(num_qubits), probability));
            } else {
                let dim = (1usize << qubits_in_r.len()) as f64;
                for paulis in (0..qubits_in_r.len())
                    .map(|_| [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z])
                    .multi_cartesian_product()
                {
                    let mut twirl = pauli_matrix(paulis[0]);
                    for &pauli in &paulis[1..] {
                        twirl = twirl.kronecker(&pauli_matrix(pauli));
                    }
                    let overlap = (&projected * twirl).trace() / Complex64::new(dim, 0.0);
                    let probability = prefactor * overlap.norm_sqr();
                    let mut full: Vec<Pauli> = vec![Pauli::I; num_qubits];
                    for (&qubit, &pauli) in qubits_in_r.iter().zip(&paulis) {
                        full[qubit] = pauli;
                    }
                    pauli_channel.push((full.into_iter().collect(), probability));
                }
            }

            let total: f64 = pauli_channel.iter().map(|(_, p)| p).sum();
            if total < PROBABILITY_CUTOFF {
                continue;
            }
            for (pauli, probability) in pauli_channel {
                if probability < PROBABILITY_CUTOFF {
                    continue;
                }
                channel.add_transition(initial_status.clone(), final_status.clone(), pauli, probability)?;
            }
        }
    }
    Ok(())
}

// Per-qubit basis projectors with the slots of `scatter_kind` expanded into
// the separate |0⟩ and |1⟩ branches.
fn scattered_projectors(
    status: &LeakageStatus,
    transition_types: &[TransitionType],
    scatter_kind: TransitionType,
) -> Vec<Vec<Projector>> {
    status
        .iter()
        .enumerate()
        .map(|(qubit, level)| -> Vec<Projector> {
            if transition_types[qubit] == scatter_kind {
                vec![smallvec![0], smallvec![1]]
            } else if level == 0 {
                vec![smallvec![0, 1]]
            } else {
                vec![smallvec![level as usize + 1]]
            }
        })
        .multi_cartesian_product()
        .collect()
}

// Basis indices of the product space selected by per-qubit projectors.
fn projector_slice(num_level: usize, projectors: &[Projector]) -> Vec<usize> {
    let head = &projectors[0];
    if projectors.len() == 1 {
        return head.to_vec();
    }
    let tail = projector_slice(num_level, &projectors[1..]);
    let stride = num_level.pow((projectors.len() - 1) as u32);
    head.iter()
        .flat_map(|&state| tail.iter().map(move |&index| index + state * stride))
        .collect()
}

fn project_kraus(
    kraus: &DMatrix<Complex64>,
    num_level: usize,
    initial_projector: &[Projector],
    final_projector: &[Projector],
) -> DMatrix<Complex64> {
    let columns = projector_slice(num_level, initial_projector);
    let rows = projector_slice(num_level, final_projector);
    DMatrix::from_fn(rows.len(), columns.len(), |row, column| {
        kraus[(rows[row], columns[column])]
    })
}
