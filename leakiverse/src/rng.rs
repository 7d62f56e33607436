//! The process-wide convenience random number generator.
//!
//! Each [`Simulator`](crate::Simulator) owns its own generator; this module
//! only provides the seedable global used by embedding shells. The global is
//! mutex-guarded, so concurrent use is safe albeit serialised.

use std::sync::{Mutex, OnceLock};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

static GLOBAL_RNG: OnceLock<Mutex<SmallRng>> = OnceLock::new();

fn global() -> &'static Mutex<SmallRng> {
    GLOBAL_RNG.get_or_init(|| Mutex::new(SmallRng::from_entropy()))
}

fn with_global<T>(f: impl FnOnce(&mut SmallRng) -> T) -> T {
    let mut rng = global().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut rng)
}

/// Reseed the global generator for reproducible runs.
pub fn set_seed(seed: u64) {
    with_global(|rng| *rng = SmallRng::seed_from_u64(seed));
}

/// Reseed the global generator from a nondeterministic entropy source.
pub fn randomize() {
    with_global(|rng| *rng = SmallRng::from_entropy());
}

/// Draw a uniform float from `[lower, upper)`.
///
/// # Panics
///
/// Panics if `lower >= upper`.
#[must_use]
pub fn rand_float(lower: f64, upper: f64) -> f64 {
    with_global(|rng| rng.gen_range(lower..upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global generator is shared process-wide, so tests touching it must
    // not run concurrently.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn seeded_draws_are_reproducible() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        set_seed(1234);
        let first: Vec<f64> = (0..8).map(|_| rand_float(0.0, 1.0)).collect();
        set_seed(1234);
        let second: Vec<f64> = (0..8).map(|_| rand_float(0.0, 1.0)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn draws_stay_in_the_half_open_interval() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        set_seed(99);
        for _ in 0..1000 {
            let value = rand_float(2.0, 3.0);
            assert!((2.0..3.0).contains(&value));
        }
    }
}
