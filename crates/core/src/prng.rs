//! Deterministic Xorshift64 PRNG.
//!
//! Stars only need cheap uniform noise, but a seedable generator keeps
//! headless renders and tests reproducible. Browser hosts seed it from
//! `Math.random()`, so the animation still differs per page load.

/// Xorshift64 generator with the standard (13, 7, 17) shifts.
///
/// A seed of 0 is a fixed point of the algorithm and is replaced with a
/// non-zero fallback.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1), built from the upper
    /// 53 bits of `next_u64()`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns `(next_f64() - 0.5) * spread`, i.e. a value in
    /// [-spread / 2, spread / 2).
    pub fn next_centered(&mut self, spread: f64) -> f64 {
        (self.next_f64() - 0.5) * spread
    }

    /// Splits off an independent generator seeded from this one's stream.
    pub fn fork(&mut self) -> Xorshift64 {
        Xorshift64::new(self.next_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        for _ in 0..3 {
            assert_ne!(rng.next_u64(), 0, "seed=0 guard failed");
        }
    }

    #[test]
    fn two_instances_with_same_seed_produce_identical_sequences() {
        let mut rng_a = Xorshift64::new(42);
        let mut rng_b = Xorshift64::new(42);
        for i in 0..1000 {
            assert_eq!(
                rng_a.next_u64(),
                rng_b.next_u64(),
                "sequences diverged at index {i}"
            );
        }
    }

    #[test]
    fn next_centered_stays_within_half_spread() {
        let mut rng = Xorshift64::new(31337);
        for i in 0..10_000 {
            let v = rng.next_centered(0.3);
            assert!(
                (-0.15..0.15).contains(&v),
                "next_centered(0.3) = {v} out of bounds at iteration {i}"
            );
        }
    }

    #[test]
    fn next_centered_produces_both_signs() {
        let mut rng = Xorshift64::new(5);
        let values: Vec<f64> = (0..100).map(|_| rng.next_centered(1.0)).collect();
        assert!(values.iter().any(|&v| v < 0.0));
        assert!(values.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn fork_diverges_from_parent() {
        let mut parent = Xorshift64::new(42);
        let mut child = parent.fork();
        let a: Vec<u64> = (0..8).map(|_| parent.next_u64()).collect();
        let b: Vec<u64> = (0..8).map(|_| child.next_u64()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn fork_is_deterministic() {
        let mut a = Xorshift64::new(9).fork();
        let mut b = Xorshift64::new(9).fork();
        assert_eq!(a.next_u64(), b.next_u64());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_range_in_bounds_for_any_seed_and_range(
                seed: u64,
                min in -1e6_f64..1e6,
                max in -1e6_f64..1e6,
            ) {
                prop_assume!(min < max);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }
        }
    }
}
