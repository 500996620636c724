// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// This is a hand-rolled implementation with zero external dependencies, chosen
// for portability and to guarantee identical output across all platforms.
//
// This crate is the single source of randomness for the whole Digital Forest
// project: the ecology engine draws every roll — initial spawn, survival,
// reproduction, crossover, mutation, default-gene jitter — from one
// `ForestRng` owned by the `Forest`. By not depending on external RNG crates
// (like `rand`) we guarantee that a run is exactly reproducible given its
// seed, and that a serialized RNG state resumes the identical sequence.
//
// **Critical constraint: determinism.** Every method on `ForestRng` must
// produce identical output given the same prior state, regardless of
// platform, compiler version, or optimization level. No floating-point
// arithmetic in the core generator, no stdlib PRNG, no OS entropy.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG — the project's sole source of randomness.
///
/// The `Forest` owns exactly one instance and threads it by `&mut` through
/// every pass in a fixed row-major traversal order, so the draw sequence of a
/// simulation step is fully determined by the seed and the prior state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestRng {
    s: [u64; 4],
}

impl ForestRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `ForestRng` instances created with the same seed produce identical
    /// output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa of an f64.
    /// 53 bits gives full f64 precision (IEEE 754 double has a 52-bit
    /// mantissa + 1 implicit bit).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low < high, "range_f64: low must be less than high");
        low + self.next_f64() * (high - low)
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // Rejection sampling to avoid modulo bias.
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Delegates to `range_u64` for the actual sampling.
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick two distinct indices uniformly from `[0, len)`.
    ///
    /// Used by the genetic algorithm to sample breeding parents from a gene
    /// pool. Panics if `len < 2`.
    pub fn two_distinct(&mut self, len: usize) -> (usize, usize) {
        assert!(len >= 2, "two_distinct: need at least two candidates");
        let first = self.range_usize(0, len);
        // Sample from the remaining len-1 slots and skip over `first`.
        let mut second = self.range_usize(0, len - 1);
        if second >= first {
            second += 1;
        }
        (first, second)
    }

    /// Return `true` with probability `p`, `false` otherwise.
    ///
    /// `p` should be in [0.0, 1.0]. Values outside this range are clamped:
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64 — used only for seeding xoshiro256++ from a single `u64`.
///
/// This is the standard recommendation from the xoshiro authors for
/// expanding a small seed into a larger state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = ForestRng::new(42);
        let mut b = ForestRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = ForestRng::new(42);
        let mut b = ForestRng::new(43);
        // Extremely unlikely to collide on the first value.
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = ForestRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_u64_within_bounds() {
        let mut rng = ForestRng::new(999);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 20);
            assert!((10..20).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn range_f64_within_bounds() {
        let mut rng = ForestRng::new(777);
        for _ in 0..10_000 {
            let v = rng.range_f64(1.5, 3.5);
            assert!((1.5..3.5).contains(&v), "range_f64 out of range: {v}");
        }
    }

    #[test]
    fn two_distinct_never_collides() {
        let mut rng = ForestRng::new(555);
        for len in 2..8 {
            for _ in 0..1_000 {
                let (a, b) = rng.two_distinct(len);
                assert_ne!(a, b);
                assert!(a < len && b < len);
            }
        }
    }

    #[test]
    fn two_distinct_covers_all_pairs() {
        // With three candidates every ordered pair should eventually appear.
        let mut rng = ForestRng::new(3);
        let mut seen = [[false; 3]; 3];
        for _ in 0..10_000 {
            let (a, b) = rng.two_distinct(3);
            seen[a][b] = true;
        }
        for a in 0..3 {
            for b in 0..3 {
                if a != b {
                    assert!(seen[a][b], "pair ({a}, {b}) never sampled");
                }
            }
        }
    }

    #[test]
    fn random_bool_distribution() {
        let mut rng = ForestRng::new(42);
        let mut true_count = 0;
        let n = 10_000;
        for _ in 0..n {
            if rng.random_bool(0.5) {
                true_count += 1;
            }
        }
        // Should be roughly 50% ± 5%
        let pct = true_count as f64 / n as f64;
        assert!(
            (0.45..0.55).contains(&pct),
            "random_bool(0.5) should be ~50%, got {:.1}%",
            pct * 100.0
        );
    }

    #[test]
    fn random_bool_extremes() {
        let mut rng = ForestRng::new(42);
        // p=0.0 should always return false
        for _ in 0..100 {
            assert!(!rng.random_bool(0.0));
        }
        // p=1.0 should always return true
        for _ in 0..100 {
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = ForestRng::new(42);
        // Advance state
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: ForestRng = serde_json::from_str(&json).unwrap();
        // Continued sequences should match.
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
