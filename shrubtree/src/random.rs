//! Seeded, value-semantics random source.
//!
//! A `Random` is cheap to copy and copies are independent from that point
//! forward: the runner snapshots one before drawing a property's arguments so
//! it can regenerate the identical `Shrinkable` tree during shrinking.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone)]
pub struct Random {
    rng: StdRng,
}

impl Random {
    pub fn from_seed(seed: u64) -> Self {
        Random { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Random { rng: StdRng::from_entropy() }
    }

    pub fn bool_with_probability(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.rng.gen_bool(p)
        }
    }

    pub fn u64_in(&mut self, lo: u64, hi: u64) -> u64 {
        if lo >= hi { lo } else { self.rng.gen_range(lo..=hi) }
    }

    pub fn i64_in(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi { lo } else { self.rng.gen_range(lo..=hi) }
    }

    pub fn u32_in(&mut self, lo: u32, hi: u32) -> u32 {
        self.u64_in(lo as u64, hi as u64) as u32
    }

    pub fn i32_in(&mut self, lo: i32, hi: i32) -> i32 {
        self.i64_in(lo as i64, hi as i64) as i32
    }

    pub fn u16_in(&mut self, lo: u16, hi: u16) -> u16 {
        self.u64_in(lo as u64, hi as u64) as u16
    }

    pub fn i16_in(&mut self, lo: i16, hi: i16) -> i16 {
        self.i64_in(lo as i64, hi as i64) as i16
    }

    pub fn u8_in(&mut self, lo: u8, hi: u8) -> u8 {
        self.u64_in(lo as u64, hi as u64) as u8
    }

    pub fn i8_in(&mut self, lo: i8, hi: i8) -> i8 {
        self.i64_in(lo as i64, hi as i64) as i8
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    pub fn f64_in(&mut self, lo: f64, hi: f64) -> f64 {
        if lo >= hi { lo } else { lo + self.unit_f64() * (hi - lo) }
    }

    /// `[lo, hi)` draw used for lengths and indices ("size" in the source).
    pub fn size(&mut self, lo: usize, hi: usize) -> usize {
        if lo >= hi { lo } else { self.rng.gen_range(lo..hi) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Random::from_seed(7);
        let mut b = Random::from_seed(7);
        let seq_a: Vec<u32> = (0..20).map(|_| a.u32_in(0, 1_000_000)).collect();
        let seq_b: Vec<u32> = (0..20).map(|_| b.u32_in(0, 1_000_000)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn clone_continues_identically() {
        let mut original = Random::from_seed(99);
        original.u32_in(0, 100); // advance state
        let mut copy = original.clone();
        let next_original: Vec<u32> = (0..10).map(|_| original.u32_in(0, 100)).collect();
        let next_copy: Vec<u32> = (0..10).map(|_| copy.u32_in(0, 100)).collect();
        assert_eq!(next_original, next_copy);
    }

    #[test]
    fn probability_zero_and_one_are_exact() {
        let mut r = Random::from_seed(1);
        for _ in 0..50 {
            assert!(!r.bool_with_probability(0.0));
            assert!(r.bool_with_probability(1.0));
        }
    }

    #[test]
    fn bounded_draws_stay_in_range() {
        let mut r = Random::from_seed(123);
        for _ in 0..200 {
            let v = r.i32_in(-10, 10);
            assert!((-10..=10).contains(&v));
            let s = r.size(0, 5);
            assert!(s < 5);
        }
    }
}
