//! Batch Monte-Carlo sampling of a reference circuit.

use crate::channel::LeakyPauliChannel;
use crate::circuit::Circuit;
use crate::error::LeakyError;
use crate::readout::ReadoutStrategy;
use crate::simulator::Simulator;

/// A row-major `shots × num_measurements` byte matrix of projected
/// measurement records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBatch {
    shots: usize,
    num_measurements: usize,
    data: Vec<u8>,
}

impl SampleBatch {
    #[must_use]
    pub fn shots(&self) -> usize {
        self.shots
    }

    #[must_use]
    pub fn num_measurements(&self) -> usize {
        self.num_measurements
    }

    /// The record of shot `shot`.
    ///
    /// # Panics
    ///
    /// Panics if `shot >= self.shots()`.
    #[must_use]
    pub fn row(&self, shot: usize) -> &[u8] {
        let start = shot * self.num_measurements;
        &self.data[start..start + self.num_measurements]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(self.num_measurements.max(1)).take(self.shots)
    }

    /// The backing row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Samples a fixed reference circuit over and over, reusing one simulator
/// across shots.
#[derive(Clone, Debug)]
pub struct Sampler {
    circuit: Circuit,
    channels: Vec<LeakyPauliChannel>,
    seed: Option<u64>,
}

impl Sampler {
    /// Create a sampler for the given circuit and bound channels.
    ///
    /// The circuit is flattened up front so repeat blocks cost nothing per
    /// shot.
    #[must_use]
    pub fn new(circuit: &Circuit, channels: Vec<LeakyPauliChannel>) -> Self {
        Sampler {
            circuit: circuit.flattened(),
            channels,
            seed: None,
        }
    }

    /// Builder: make every [`sample`](Self::sample) call reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run `shots` independent executions and project each record.
    ///
    /// # Errors
    ///
    /// Anything [`Simulator::do_circuit`] can raise, on the first failing
    /// shot.
    pub fn sample(&self, shots: usize, strategy: ReadoutStrategy) -> Result<SampleBatch, LeakyError> {
        let num_qubits = self.circuit.num_qubits();
        let num_measurements = self.circuit.num_measurements();
        let mut simulator = match self.seed {
            Some(seed) => Simulator::with_seed(num_qubits, self.channels.clone(), seed),
            None => Simulator::new(num_qubits, self.channels.clone()),
        };

        let mut data = vec![0u8; shots * num_measurements];
        for shot in 0..shots {
            simulator.clear();
            simulator.do_circuit(&self.circuit)?;
            let row = &mut data[shot * num_measurements..(shot + 1) * num_measurements];
            simulator.project_record_into(strategy, row);
        }
        Ok(SampleBatch {
            shots,
            num_measurements,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_testing::{assert_rate_within_tolerance, TOLERANCE_HIGH_SAMPLES};
    use crate::status::LeakageStatus;

    #[test]
    fn batch_has_the_requested_shape() {
        let circuit: Circuit = "H 0\nCX 0 1\nM 0 1\n".parse().unwrap();
        let batch = Sampler::new(&circuit, vec![])
            .with_seed(5)
            .sample(16, ReadoutStrategy::RawLabel)
            .unwrap();
        assert_eq!(batch.shots(), 16);
        assert_eq!(batch.num_measurements(), 2);
        assert_eq!(batch.data().len(), 32);
        assert_eq!(batch.rows().count(), 16);
    }

    #[test]
    fn bell_rows_are_internally_correlated() {
        let circuit: Circuit = "H 0\nCX 0 1\nM 0 1\n".parse().unwrap();
        let batch = Sampler::new(&circuit, vec![])
            .with_seed(6)
            .sample(100, ReadoutStrategy::RawLabel)
            .unwrap();
        for row in batch.rows() {
            assert_eq!(row[0], row[1]);
        }
    }

    #[test]
    fn repeat_blocks_multiply_the_record_width() {
        let circuit: Circuit = "REPEAT 4 {\n    M 0\n}\n".parse().unwrap();
        let batch = Sampler::new(&circuit, vec![])
            .with_seed(7)
            .sample(3, ReadoutStrategy::RawLabel)
            .unwrap();
        assert_eq!(batch.num_measurements(), 4);
        for row in batch.rows() {
            assert_eq!(row, &[0, 0, 0, 0]);
        }
    }

    #[test]
    fn plus_state_marginals_are_even() {
        let circuit: Circuit = "H 0\nM 0\n".parse().unwrap();
        let shots = 100_000;
        let batch = Sampler::new(&circuit, vec![])
            .with_seed(10)
            .sample(shots, ReadoutStrategy::RawLabel)
            .unwrap();
        let ones = batch.rows().filter(|row| row[0] == 1).count();
        assert_rate_within_tolerance(ones, shots, 0.5, TOLERANCE_HIGH_SAMPLES, "plus-state marginal");
    }

    #[test]
    fn seeded_samplers_reproduce_their_batches() {
        let circuit: Circuit = "H 0\nM 0\nH 0\nM 0\n".parse().unwrap();
        let sampler = Sampler::new(&circuit, vec![]).with_seed(8);
        let first = sampler.sample(64, ReadoutStrategy::RawLabel).unwrap();
        let second = sampler.sample(64, ReadoutStrategy::RawLabel).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn leaked_measurements_follow_the_strategy() {
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
        let circuit: Circuit = "I[leaky<0>] 0\nM 0\n".parse().unwrap();

        let raw = Sampler::new(&circuit, vec![channel.clone()])
            .with_seed(9)
            .sample(10, ReadoutStrategy::RawLabel)
            .unwrap();
        assert!(raw.rows().all(|row| row == [2]));

        let deterministic = Sampler::new(&circuit, vec![channel.clone()])
            .with_seed(9)
            .sample(10, ReadoutStrategy::DeterministicLeakageProjection)
            .unwrap();
        assert!(deterministic.rows().all(|row| row == [1]));

        let random = Sampler::new(&circuit, vec![channel])
            .with_seed(9)
            .sample(10, ReadoutStrategy::RandomLeakageProjection)
            .unwrap();
        assert!(random.rows().all(|row| row[0] <= 1));
    }
}
