//! Keyed pseudo-random stream used to permute carrier slots.
//!
//! The reference tool uses SHISHUA, a SIMD-specific vendored stream
//! generator; this crate substitutes `ChaCha20Rng` as the underlying
//! stream. The substitution is invisible above this module: callers only
//! see `fill`, `next_u64_bounded` and `shuffle`, and determinism for a
//! fixed seed is all that's contractually required of them.

use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;

const REFILL_SIZE: usize = 128;

pub struct Prng {
    rng: ChaCha20Rng,
    buffer: [u8; REFILL_SIZE],
    pos: usize,
}

impl Prng {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { rng: ChaCha20Rng::from_seed(seed), buffer: [0u8; REFILL_SIZE], pos: REFILL_SIZE }
    }

    /// Fill `out` with pseudo-random bytes, draining (and refilling a
    /// block at a time) the internal buffer.
    pub fn fill(&mut self, out: &mut [u8]) {
        let mut written = 0;
        while written < out.len() {
            if self.pos == self.buffer.len() {
                self.rng.fill_bytes(&mut self.buffer);
                self.pos = 0;
            }
            let available = self.buffer.len() - self.pos;
            let need = out.len() - written;
            let take = available.min(need);
            out[written..written + take].copy_from_slice(&self.buffer[self.pos..self.pos + take]);
            self.pos += take;
            written += take;
        }
    }

    /// Rejection-sampled uniform integer in `[0, max_inclusive]`.
    ///
    /// Uses the minimum number of bytes needed to represent `max_inclusive`,
    /// rejecting draws above the largest multiple of the range so the
    /// result is exactly uniform (no modulo bias).
    pub fn next_u64_bounded(&mut self, max_inclusive: u64) -> u64 {
        if max_inclusive == 0 {
            return 0;
        }
        if max_inclusive == u64::MAX {
            let mut buf = [0u8; 8];
            self.fill(&mut buf);
            return u64::from_le_bytes(buf);
        }

        let range = max_inclusive + 1;
        let bytes_needed = ((64 - range.leading_zeros()) as usize).div_ceil(8).max(1);
        let limit = u64::MAX >> (64 - bytes_needed * 8);
        let zone = limit - (limit % range + 1) % range;

        loop {
            let mut buf = [0u8; 8];
            self.fill(&mut buf[..bytes_needed]);
            let value = u64::from_le_bytes(buf);
            if value <= zone {
                return value % range;
            }
        }
    }

    /// Fisher-Yates shuffle, draining entropy from this PRNG so the result
    /// is deterministic for a fixed seed.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        if slice.len() < 2 {
            return;
        }
        for i in (1..slice.len()).rev() {
            let j = self.next_u64_bounded(i as u64) as usize;
            slice.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_stream() {
        let mut a = Prng::from_seed([7u8; 32]);
        let mut b = Prng::from_seed([7u8; 32]);
        let mut out_a = [0u8; 300];
        let mut out_b = [0u8; 300];
        a.fill(&mut out_a);
        b.fill(&mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Prng::from_seed([1u8; 32]);
        let mut b = Prng::from_seed([2u8; 32]);
        let mut out_a = [0u8; 64];
        let mut out_b = [0u8; 64];
        a.fill(&mut out_a);
        b.fill(&mut out_b);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn bounded_draw_never_exceeds_max() {
        let mut rng = Prng::from_seed([3u8; 32]);
        for _ in 0..2000 {
            let v = rng.next_u64_bounded(5);
            assert!(v <= 5);
        }
    }

    #[test]
    fn bounded_draw_zero_is_always_zero() {
        let mut rng = Prng::from_seed([4u8; 32]);
        assert_eq!(rng.next_u64_bounded(0), 0);
    }

    #[test]
    fn shuffle_is_deterministic_for_seed() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b: Vec<u32> = (0..50).collect();
        Prng::from_seed([9u8; 32]).shuffle(&mut a);
        Prng::from_seed([9u8; 32]).shuffle(&mut b);
        assert_eq!(a, b);
        assert_ne!(a, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut v: Vec<u32> = (0..200).collect();
        let original = v.clone();
        Prng::from_seed([11u8; 32]).shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }
}
