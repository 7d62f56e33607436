//! The leakage-aware circuit interpreter.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use paulitab::{GateKind, TableauSimulator};

use crate::channel::LeakyPauliChannel;
use crate::circuit::{Circuit, CircuitEntry, Instruction, QubitId};
use crate::error::LeakyError;
use crate::readout::{self, ReadoutStrategy};
use crate::status::{LeakageLevel, LeakageStatus, TransitionType};
use crate::CliffordBackend;

/// A Monte-Carlo simulator for Clifford circuits with incoherent leakage.
///
/// The simulator owns a Clifford backend, a per-qubit [`LeakageStatus`]
/// vector, an append-only record of leakage masks (one per measurement, in
/// program order), and an indexed list of bound [`LeakyPauliChannel`]s that
/// circuits invoke through `I[leaky<N>]` tags.
///
/// Gates are forwarded to the backend only while every target of the group is
/// in the computational subspace; leaked qubits freeze their share of the
/// stabilizer state until a channel brings them back down, at which point the
/// backend's view is re-randomised.
pub struct Simulator<B: CliffordBackend = TableauSimulator> {
    num_qubits: usize,
    status: LeakageStatus,
    leakage_masks: Vec<LeakageLevel>,
    channels: Vec<LeakyPauliChannel>,
    backend: B,
    rng: SmallRng,
}

impl Simulator<TableauSimulator> {
    /// Create a simulator over the tableau backend, seeded from entropy.
    #[must_use]
    pub fn new(num_qubits: usize, channels: Vec<LeakyPauliChannel>) -> Self {
        let mut rng = SmallRng::from_entropy();
        let backend = TableauSimulator::with_seed(num_qubits, rng.gen());
        Self::from_parts(num_qubits, channels, backend, rng)
    }

    /// Create a simulator with a reproducible seed covering both the leakage
    /// sampling and the backend's measurement randomness.
    #[must_use]
    pub fn with_seed(num_qubits: usize, channels: Vec<LeakyPauliChannel>, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let backend = TableauSimulator::with_seed(num_qubits, rng.gen());
        Self::from_parts(num_qubits, channels, backend, rng)
    }
}

impl<B: CliffordBackend> Simulator<B> {
    /// Create a simulator over a caller-provided backend.
    #[must_use]
    pub fn with_backend(num_qubits: usize, channels: Vec<LeakyPauliChannel>, backend: B) -> Self {
        Self::from_parts(num_qubits, channels, backend, SmallRng::from_entropy())
    }

    /// Like [`with_backend`](Self::with_backend), but with a seeded leakage
    /// sampler.
    #[must_use]
    pub fn with_backend_seeded(
        num_qubits: usize,
        channels: Vec<LeakyPauliChannel>,
        backend: B,
        seed: u64,
    ) -> Self {
        Self::from_parts(num_qubits, channels, backend, SmallRng::seed_from_u64(seed))
    }

    fn from_parts(num_qubits: usize, channels: Vec<LeakyPauliChannel>, mut backend: B, rng: SmallRng) -> Self {
        backend.reinit(num_qubits);
        Simulator {
            num_qubits,
            status: LeakageStatus::new(num_qubits),
            leakage_masks: Vec::new(),
            channels,
            backend,
            rng,
        }
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The channels bound to this simulator, addressed by `I[leaky<N>]` tags.
    #[must_use]
    pub fn channels(&self) -> &[LeakyPauliChannel] {
        &self.channels
    }

    /// The full leakage status vector.
    #[must_use]
    pub fn status(&self) -> &LeakageStatus {
        &self.status
    }

    /// The joint leakage status of the given targets.
    ///
    /// # Panics
    ///
    /// Panics if any target is out of range.
    #[must_use]
    pub fn current_status(&self, targets: &[QubitId]) -> LeakageStatus {
        targets.iter().map(|&target| self.status.get(target)).collect()
    }

    /// One leakage mask per measurement so far, in program order; entry *i*
    /// pairs with entry *i* of the backend's measurement record.
    #[must_use]
    pub fn leakage_masks_record(&self) -> &[LeakageLevel] {
        &self.leakage_masks
    }

    /// Reset the leakage status, the mask record, and the backend (state and
    /// measurement record). Bound channels are preserved.
    pub fn clear(&mut self) {
        self.status.clear();
        self.leakage_masks.clear();
        self.backend.reinit(self.num_qubits);
    }

    /// The measurement record so far, projected under the given strategy.
    #[must_use]
    pub fn measurement_record(&mut self, strategy: ReadoutStrategy) -> Vec<u8> {
        readout::project_record(
            self.backend.measurement_record(),
            &self.leakage_masks,
            strategy,
            &mut self.rng,
        )
    }

    /// Project the measurement record into a caller-provided buffer of
    /// exactly `measurement count` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` differs from the current record length.
    pub fn project_record_into(&mut self, strategy: ReadoutStrategy, out: &mut [u8]) {
        readout::project_record_into(
            self.backend.measurement_record(),
            &self.leakage_masks,
            strategy,
            &mut self.rng,
            out,
        );
    }

    /// Parse `name` and dispatch the resulting instruction.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvalidArgument`] on unknown names, plus everything
    /// [`do_gate`](Self::do_gate) can raise.
    pub fn do_named(&mut self, name: &str, targets: &[QubitId]) -> Result<(), LeakyError> {
        let gate = GateKind::from_name(name)
            .ok_or_else(|| LeakyError::invalid_argument(format!("unknown instruction name {name:?}")))?;
        self.do_gate(&Instruction::new(gate, targets.to_vec()))
    }

    /// Execute a whole circuit, recursing through REPEAT blocks.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvalidArgument`] if the circuit touches more qubits
    /// than the simulator holds, plus everything [`do_gate`](Self::do_gate)
    /// can raise.
    pub fn do_circuit(&mut self, circuit: &Circuit) -> Result<(), LeakyError> {
        let required = circuit.num_qubits();
        if required > self.num_qubits {
            return Err(LeakyError::invalid_argument(format!(
                "circuit uses {required} qubits but the simulator holds {}",
                self.num_qubits
            )));
        }
        self.run_entries(circuit)
    }

    fn run_entries(&mut self, circuit: &Circuit) -> Result<(), LeakyError> {
        for entry in circuit.iter() {
            match entry {
                CircuitEntry::Instruction(instruction) => self.do_gate(instruction)?,
                CircuitEntry::Repeat { repetitions, body } => {
                    for _ in 0..*repetitions {
                        self.run_entries(body)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Execute one instruction.
    ///
    /// Dispatch order: tagged-identity channel injection, measurement mask
    /// accounting, reset accounting, backend delegation for collapsing
    /// instructions, noise passthrough, and finally unitaries gated per
    /// target group on the leakage status.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvalidArgument`] on malformed `leaky<...>` tags,
    /// channel indices out of range, measurement or reset bases outside Z,
    /// out-of-range targets, and malformed noise or two-qubit target lists.
    pub fn do_gate(&mut self, instruction: &Instruction) -> Result<(), LeakyError> {
        let gate = instruction.gate;

        // Tagged identities invoke a bound channel instead of the backend.
        if gate == GateKind::I {
            if let Some(tag) = &instruction.tag {
                if tag.contains("leaky<") {
                    let index = parse_leaky_tag(tag).ok_or_else(|| {
                        LeakyError::invalid_argument(format!("malformed leaky tag in {instruction}"))
                    })?;
                    let channel = self.channels.get(index).ok_or_else(|| {
                        LeakyError::invalid_argument(format!(
                            "channel index {index} out of range for {} bound channels in {instruction}",
                            self.channels.len()
                        ))
                    })?;
                    return apply_channel_groups(
                        &mut self.status,
                        &mut self.backend,
                        &mut self.rng,
                        &instruction.targets,
                        channel,
                    );
                }
            }
        }

        if gate.is_unsupported_basis() {
            return Err(LeakyError::invalid_argument(format!(
                "only Z basis measurements and resets are supported, not {gate}"
            )));
        }

        if let Some(out_of_range) = instruction.targets.iter().find(|&&t| t >= self.num_qubits) {
            return Err(LeakyError::invalid_argument(format!(
                "target {out_of_range} out of range in {instruction}"
            )));
        }

        let measures = gate.produces_measurements();
        let resets = gate.is_reset();
        if measures {
            // Masks are recorded before any reset touches the status, so an
            // MR on a leaked qubit still reports the leak.
            for &target in &instruction.targets {
                self.leakage_masks.push(self.status.get(target));
            }
        }
        if resets {
            for &target in &instruction.targets {
                self.status.reset(target);
            }
        }
        if measures || resets {
            for &target in &instruction.targets {
                if measures {
                    self.backend.measure_z(target);
                }
                if resets {
                    self.backend.reset_z(target);
                }
            }
            return Ok(());
        }

        if gate.is_noise() {
            let probability = match instruction.args[..] {
                [p] if (0.0..=1.0).contains(&p) => p,
                _ => {
                    return Err(LeakyError::invalid_argument(format!(
                        "noise channel needs a single probability argument in [0, 1]: {instruction}"
                    )))
                }
            };
            if gate == GateKind::Depolarize2 && instruction.targets.len() % 2 != 0 {
                return Err(LeakyError::invalid_argument(format!(
                    "{gate} needs an even number of targets: {instruction}"
                )));
            }
            self.backend.noise(gate, probability, &instruction.targets);
            return Ok(());
        }

        // Unitary: split into target groups and suppress any group holding a
        // leaked qubit.
        let group_size = if gate.is_two_qubit() { 2 } else { 1 };
        if instruction.targets.len() % group_size != 0 {
            return Err(LeakyError::invalid_argument(format!(
                "{gate} needs target groups of {group_size}: {instruction}"
            )));
        }
        for group in instruction.targets.chunks(group_size) {
            if group_size == 2 && group[0] == group[1] {
                return Err(LeakyError::invalid_argument(format!(
                    "duplicate target {} in {instruction}",
                    group[0]
                )));
            }
            if group.iter().any(|&target| self.status.is_leaked(target)) {
                continue;
            }
            self.backend.unitary(gate, group);
        }
        Ok(())
    }

    /// Apply a leaky Pauli channel directly to `targets`, in consecutive
    /// groups of `channel.num_qubits()`.
    ///
    /// # Errors
    ///
    /// [`LeakyError::InvalidArgument`] if the target count is not a multiple
    /// of the channel arity or a target is out of range.
    pub fn apply_leaky_channel(
        &mut self,
        targets: &[QubitId],
        channel: &LeakyPauliChannel,
    ) -> Result<(), LeakyError> {
        apply_channel_groups(&mut self.status, &mut self.backend, &mut self.rng, targets, channel)
    }
}

// Free-standing so `do_gate` can call it while borrowing a channel out of
// `self.channels`.
fn apply_channel_groups<B: CliffordBackend>(
    status: &mut LeakageStatus,
    backend: &mut B,
    rng: &mut SmallRng,
    targets: &[QubitId],
    channel: &LeakyPauliChannel,
) -> Result<(), LeakyError> {
    let arity = channel.num_qubits();
    if targets.len() % arity != 0 {
        return Err(LeakyError::invalid_argument(format!(
            "{} targets cannot be split into groups of {arity}",
            targets.len()
        )));
    }
    if let Some(out_of_range) = targets.iter().find(|&&t| t >= status.len()) {
        return Err(LeakyError::invalid_argument(format!(
            "target {out_of_range} out of range for {} qubits",
            status.len()
        )));
    }
    for group in targets.chunks(arity) {
        let current: LeakageStatus = group.iter().map(|&target| status.get(target)).collect();
        let Some((to, pauli)) = channel.sample(&current, rng) else {
            // No transition registered for this joint status.
            continue;
        };
        let (to, pauli) = (to.clone(), pauli.clone());
        for (slot, &target) in group.iter().enumerate() {
            handle_transition(status, backend, target, current.get(slot), to.get(slot), pauli.get(slot));
        }
    }
    Ok(())
}

// The per-qubit arm of a sampled channel outcome. The status is updated
// before the backend sees anything, so later groups of the same instruction
// observe the new levels.
fn handle_transition<B: CliffordBackend>(
    status: &mut LeakageStatus,
    backend: &mut B,
    target: QubitId,
    from: LeakageLevel,
    to: LeakageLevel,
    pauli: paulitab::Pauli,
) {
    status.set(target, to);
    match TransitionType::classify(from, to) {
        TransitionType::R => backend.pauli(pauli, target),
        TransitionType::L => {}
        // The stabilizer state is decoupling from reality: scramble its
        // marginal on this qubit so later measurements show no phantom
        // coherence.
        TransitionType::U => backend.x_error(target, 0.5),
        // A returning qubit carries no usable phase: it re-enters the
        // stabilizer state as a fresh, uniformly random classical bit.
        TransitionType::D => {
            backend.reset_z(target);
            backend.x_error(target, 0.5);
        }
    }
}

/// Extract `N` from a tag containing `leaky<N>`; `None` when the digits or
/// the closing bracket are missing.
fn parse_leaky_tag(tag: &str) -> Option<usize> {
    let start = tag.find("leaky<")? + "leaky<".len();
    let rest = &tag[start..];
    let end = rest.find('>')?;
    let digits = &rest[..end];
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paulitab::Pauli;

    #[test]
    fn leaky_tag_parsing() {
        assert_eq!(parse_leaky_tag("leaky<0>"), Some(0));
        assert_eq!(parse_leaky_tag("leaky<17>"), Some(17));
        assert_eq!(parse_leaky_tag("noise:leaky<3>:x"), Some(3));
        assert_eq!(parse_leaky_tag("leaky<>"), None);
        assert_eq!(parse_leaky_tag("leaky<x>"), None);
        assert_eq!(parse_leaky_tag("leaky<1"), None);
    }

    /// A backend that only records what reaches it.
    #[derive(Default)]
    struct RecordingBackend {
        num_qubits: usize,
        calls: Vec<String>,
        record: Vec<bool>,
    }

    impl CliffordBackend for RecordingBackend {
        fn reinit(&mut self, num_qubits: usize) {
            self.num_qubits = num_qubits;
            self.record.clear();
            self.calls.push(format!("reinit {num_qubits}"));
        }

        fn num_qubits(&self) -> usize {
            self.num_qubits
        }

        fn unitary(&mut self, gate: GateKind, targets: &[QubitId]) {
            self.calls.push(format!("unitary {gate} {targets:?}"));
        }

        fn pauli(&mut self, pauli: Pauli, target: QubitId) {
            self.calls.push(format!("pauli {pauli} {target}"));
        }

        fn measure_z(&mut self, target: QubitId) -> bool {
            self.calls.push(format!("measure {target}"));
            self.record.push(false);
            false
        }

        fn reset_z(&mut self, target: QubitId) {
            self.calls.push(format!("reset {target}"));
        }

        fn x_error(&mut self, target: QubitId, probability: f64) {
            self.calls.push(format!("x_error {target} {probability}"));
        }

        fn noise(&mut self, gate: GateKind, probability: f64, targets: &[QubitId]) {
            self.calls.push(format!("noise {gate} {probability} {targets:?}"));
        }

        fn measurement_record(&self) -> &[bool] {
            &self.record
        }
    }

    fn leak_channel() -> LeakyPauliChannel {
        let mut channel = LeakyPauliChannel::new(1);
        channel
            .add_transition(
                LeakageStatus::from_levels(&[0]),
                LeakageStatus::from_levels(&[1]),
                "I".parse().unwrap(),
                1.0,
            )
            .unwrap();
        channel.safety_check().unwrap();
        channel
    }

    fn recording_simulator(num_qubits: usize, channels: Vec<LeakyPauliChannel>) -> Simulator<RecordingBackend> {
        Simulator::with_backend_seeded(num_qubits, channels, RecordingBackend::default(), 7)
    }

    #[test]
    fn gates_on_leaked_qubits_never_reach_the_backend() {
        let mut sim = recording_simulator(2, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        assert!(sim.status().is_leaked(0));

        sim.do_gate(&Instruction::new(GateKind::X, vec![0])).unwrap();
        sim.do_gate(&Instruction::new(GateKind::X, vec![1])).unwrap();
        let unitaries: Vec<_> = sim
            .backend()
            .calls
            .iter()
            .filter(|call| call.starts_with("unitary"))
            .collect();
        assert_eq!(unitaries, vec!["unitary X [1]"]);
    }

    #[test]
    fn two_qubit_gate_is_suppressed_when_either_target_is_leaked() {
        let mut sim = recording_simulator(2, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![1]).with_tag("leaky<0>"))
            .unwrap();
        sim.do_gate(&Instruction::new(GateKind::Cx, vec![0, 1])).unwrap();
        assert!(!sim.backend().calls.iter().any(|call| call.starts_with("unitary CX")));
    }

    #[test]
    fn upward_transition_injects_entropy_without_reset() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        assert_eq!(sim.backend().calls, vec!["reinit 1", "x_error 0 0.5"]);
    }

    #[test]
    fn downward_transition_resets_then_randomises() {
        let mut down = LeakyPauliChannel::new(1);
        down.add_transition(
            LeakageStatus::from_levels(&[1]),
            LeakageStatus::from_levels(&[0]),
            "I".parse().unwrap(),
            1.0,
        )
        .unwrap();
        let mut sim = recording_simulator(1, vec![leak_channel(), down]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<1>"))
            .unwrap();
        assert!(!sim.status().is_leaked(0));
        assert_eq!(
            sim.backend().calls,
            vec!["reinit 1", "x_error 0 0.5", "reset 0", "x_error 0 0.5"]
        );
    }

    #[test]
    fn remain_transition_applies_the_pauli_correction() {
        let mut stay = LeakyPauliChannel::new(1);
        stay.add_transition(
            LeakageStatus::from_levels(&[0]),
            LeakageStatus::from_levels(&[0]),
            "X".parse().unwrap(),
            1.0,
        )
        .unwrap();
        let mut sim = recording_simulator(1, vec![stay]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        assert_eq!(sim.backend().calls, vec!["reinit 1", "pauli X 0"]);
    }

    #[test]
    fn leaked_to_leaked_transition_touches_nothing() {
        let mut hop = LeakyPauliChannel::new(1);
        hop.add_transition(
            LeakageStatus::from_levels(&[1]),
            LeakageStatus::from_levels(&[2]),
            "I".parse().unwrap(),
            1.0,
        )
        .unwrap();
        let mut sim = recording_simulator(1, vec![leak_channel(), hop]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        let calls_before = sim.backend().calls.len();
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<1>"))
            .unwrap();
        assert_eq!(sim.backend().calls.len(), calls_before);
        assert_eq!(sim.status().get(0), 2);
    }

    #[test]
    fn unregistered_status_leaves_state_unchanged() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        // Leak, then hit the same channel again: status |2⟩ has no entry.
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        let calls_before = sim.backend().calls.len();
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        assert_eq!(sim.backend().calls.len(), calls_before);
        assert_eq!(sim.status().get(0), 1);
    }

    #[test]
    fn masks_and_record_stay_aligned() {
        let mut sim = recording_simulator(2, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::M, vec![0, 1])).unwrap();
        sim.do_gate(&Instruction::new(GateKind::I, vec![1]).with_tag("leaky<0>"))
            .unwrap();
        sim.do_gate(&Instruction::new(GateKind::M, vec![0, 1])).unwrap();
        assert_eq!(sim.leakage_masks_record().len(), sim.backend().measurement_record().len());
        assert_eq!(sim.leakage_masks_record(), &[0, 0, 0, 1]);
    }

    #[test]
    fn reset_clears_leakage_before_delegation() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        assert!(sim.status().is_leaked(0));
        sim.do_gate(&Instruction::new(GateKind::R, vec![0])).unwrap();
        assert!(!sim.status().is_leaked(0));
        assert!(sim.backend().calls.iter().any(|call| call == "reset 0"));
    }

    #[test]
    fn measure_reset_records_the_pre_reset_mask() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        sim.do_gate(&Instruction::new(GateKind::Mr, vec![0])).unwrap();
        assert_eq!(sim.leakage_masks_record(), &[1]);
        assert!(!sim.status().is_leaked(0));
        // Backend saw the measurement and then the reset.
        let tail: Vec<_> = sim.backend().calls.iter().rev().take(2).rev().collect();
        assert_eq!(tail, vec!["measure 0", "reset 0"]);
    }

    #[test]
    fn non_z_bases_are_rejected() {
        let mut sim = recording_simulator(1, vec![]);
        for name in ["MX", "MY", "RX", "RY", "MRX", "MRY", "MPP"] {
            let result = sim.do_named(name, &[0]);
            assert!(
                matches!(result, Err(LeakyError::InvalidArgument(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_tags_are_rejected() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        for tag in ["leaky<>", "leaky<abc>", "leaky<1"] {
            let result = sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag(tag));
            assert!(matches!(result, Err(LeakyError::InvalidArgument(_))), "tag {tag:?}");
        }
    }

    #[test]
    fn non_leaky_tags_are_ordinary_identities() {
        let mut sim = recording_simulator(1, vec![]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("annotation"))
            .unwrap();
        assert!(sim.backend().calls.iter().any(|call| call == "unitary I [0]"));
    }

    #[test]
    fn channel_index_out_of_range_is_rejected() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        let result = sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<1>"));
        assert!(matches!(result, Err(LeakyError::InvalidArgument(_))));
    }

    #[test]
    fn channel_arity_must_divide_target_count() {
        let mut channel = LeakyPauliChannel::new(2);
        channel
            .add_transition(
                LeakageStatus::from_levels(&[0, 0]),
                LeakageStatus::from_levels(&[0, 1]),
                "II".parse().unwrap(),
                1.0,
            )
            .unwrap();
        let mut sim = recording_simulator(3, vec![]);
        let result = sim.apply_leaky_channel(&[0, 1, 2], &channel);
        assert!(matches!(result, Err(LeakyError::InvalidArgument(_))));
    }

    #[test]
    fn oversized_circuits_are_rejected() {
        let mut sim = recording_simulator(1, vec![]);
        let circuit: Circuit = "H 0 1\n".parse().unwrap();
        assert!(matches!(sim.do_circuit(&circuit), Err(LeakyError::InvalidArgument(_))));
    }

    #[test]
    fn noise_passes_through_verbatim() {
        let mut sim = recording_simulator(2, vec![]);
        sim.do_gate(&Instruction::new(GateKind::XError, vec![0, 1]).with_args(vec![0.25]))
            .unwrap();
        assert!(sim
            .backend()
            .calls
            .iter()
            .any(|call| call == "noise X_ERROR 0.25 [0, 1]"));
    }

    #[test]
    fn noise_needs_a_single_probability_argument() {
        let mut sim = recording_simulator(1, vec![]);
        let missing = sim.do_gate(&Instruction::new(GateKind::XError, vec![0]));
        assert!(matches!(missing, Err(LeakyError::InvalidArgument(_))));
        let out_of_range = sim.do_gate(&Instruction::new(GateKind::XError, vec![0]).with_args(vec![1.5]));
        assert!(matches!(out_of_range, Err(LeakyError::InvalidArgument(_))));
    }

    #[test]
    fn clear_preserves_channels() {
        let mut sim = recording_simulator(1, vec![leak_channel()]);
        sim.do_gate(&Instruction::new(GateKind::I, vec![0]).with_tag("leaky<0>"))
            .unwrap();
        sim.do_gate(&Instruction::new(GateKind::M, vec![0])).unwrap();
        sim.clear();
        assert!(!sim.status().any_leaked());
        assert!(sim.leakage_masks_record().is_empty());
        assert!(sim.backend().measurement_record().is_empty());
        assert_eq!(sim.channels().len(), 1);
    }
}
