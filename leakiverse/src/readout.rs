//! Projection of the dual (classical bit, leakage mask) measurement record.

use derive_more::Display;
use rand::Rng;

use crate::status::LeakageLevel;

/// How leaked measurement outcomes are encoded in the user-visible record.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Default)]
pub enum ReadoutStrategy {
    /// Keep the raw labels: 0/1 for subspace outcomes, `level + 1` (≥ 2) for
    /// leaked outcomes.
    #[default]
    RawLabel,
    /// Project each leaked outcome to 0 or 1 with equal probability.
    RandomLeakageProjection,
    /// Project every leaked outcome to 1.
    DeterministicLeakageProjection,
}

/// Resolve a measurement record against its leakage masks, writing one byte
/// per measurement into `out`.
///
/// Index *i* of `bits` and `masks` must refer to the same measurement event;
/// wherever `masks[i] == 0` the output is the classical bit, and otherwise
/// the strategy decides.
///
/// # Panics
///
/// Panics if `bits`, `masks` and `out` do not all have the same length.
pub fn project_record_into<R: Rng + ?Sized>(
    bits: &[bool],
    masks: &[LeakageLevel],
    strategy: ReadoutStrategy,
    rng: &mut R,
    out: &mut [u8],
) {
    assert_eq!(bits.len(), masks.len(), "record/mask length mismatch");
    assert_eq!(bits.len(), out.len(), "record/output length mismatch");
    for ((&bit, &mask), slot) in bits.iter().zip(masks).zip(out) {
        *slot = if mask == 0 {
            u8::from(bit)
        } else {
            match strategy {
                ReadoutStrategy::RawLabel => mask + 1,
                ReadoutStrategy::RandomLeakageProjection => u8::from(rng.gen::<bool>()),
                ReadoutStrategy::DeterministicLeakageProjection => 1,
            }
        };
    }
}

/// Allocating variant of [`project_record_into`].
#[must_use]
pub fn project_record<R: Rng + ?Sized>(
    bits: &[bool],
    masks: &[LeakageLevel],
    strategy: ReadoutStrategy,
    rng: &mut R,
) -> Vec<u8> {
    let mut out = vec![0u8; bits.len()];
    project_record_into(bits, masks, strategy, rng, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn unleaked_records_pass_through_under_every_strategy() {
        let bits = [true, false, true];
        let masks = [0, 0, 0];
        let mut rng = SmallRng::seed_from_u64(5);
        for strategy in [
            ReadoutStrategy::RawLabel,
            ReadoutStrategy::RandomLeakageProjection,
            ReadoutStrategy::DeterministicLeakageProjection,
        ] {
            assert_eq!(project_record(&bits, &masks, strategy, &mut rng), vec![1, 0, 1]);
        }
    }

    #[test]
    fn raw_labels_shift_leaked_levels_past_the_bit_alphabet() {
        let bits = [false, true, false];
        let masks = [1, 0, 2];
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(
            project_record(&bits, &masks, ReadoutStrategy::RawLabel, &mut rng),
            vec![2, 1, 3]
        );
    }

    #[test]
    fn deterministic_projection_maps_leaked_to_one() {
        let bits = [false, false];
        let masks = [3, 0];
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(
            project_record(&bits, &masks, ReadoutStrategy::DeterministicLeakageProjection, &mut rng),
            vec![1, 0]
        );
    }

    #[test]
    fn random_projection_emits_bits_with_even_rates() {
        let bits = [false];
        let masks = [1];
        let mut rng = SmallRng::seed_from_u64(5);
        let trials = 1000;
        let mut ones = 0;
        for _ in 0..trials {
            let row = project_record(&bits, &masks, ReadoutStrategy::RandomLeakageProjection, &mut rng);
            assert!(row[0] <= 1);
            ones += usize::from(row[0]);
        }
        assert!((400..600).contains(&ones), "got {ones} ones out of {trials}");
    }
}
