//! RNG module - deterministic shuffling for level layout
//!
//! Level generation needs a uniform permutation of the pair ids, a shuffle of
//! the category's front sprites, and one random back sprite. A small LCG keeps
//! that reproducible per seed (tests, replays) without pulling in a full RNG
//! stack.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    seed: u32,
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    ///
    /// The seed is scrambled first so neighbouring seeds start far apart.
    pub fn new(seed: u32) -> Self {
        let mixed = mix_seed(seed);
        // Avoid 0 state which would produce all zeros
        let state = if mixed == 0 { 1 } else { mixed };
        Self { seed, state }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Pick an index in `0..len`
    pub fn pick(&mut self, len: usize) -> usize {
        self.next_range(len as u32) as usize
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

// Murmur3 32-bit finalizer.
fn mix_seed(seed: u32) -> u32 {
    let mut h = seed;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = SimpleRng::new(12345);
        let mut b = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
        assert_eq!(rng.seed(), 0);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for max in 1..50 {
            for _ in 0..20 {
                assert!(rng.next_range(max) < max);
            }
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimpleRng::new(99);
        let mut ids: Vec<u32> = (0..8).flat_map(|i| [i, i]).collect();
        rng.shuffle(&mut ids);

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        let expected: Vec<u32> = (0..8).flat_map(|i| [i, i]).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_shuffle_changes_order_for_some_seed() {
        let original: Vec<u32> = (0..16).collect();
        let moved = (1..20).any(|seed| {
            let mut v = original.clone();
            SimpleRng::new(seed).shuffle(&mut v);
            v != original
        });
        assert!(moved);
    }

    #[test]
    fn test_first_draw_spreads_across_small_seeds() {
        let mut buckets = [0u32; 4];
        for seed in 1..500 {
            buckets[SimpleRng::new(seed).next_range(4) as usize] += 1;
        }
        // ~125 expected per bucket
        assert!(buckets.iter().all(|&n| n > 60), "{:?}", buckets);
    }

    #[test]
    fn test_neighbouring_seeds_diverge() {
        let a = SimpleRng::new(1).next_u32();
        let b = SimpleRng::new(2).next_u32();
        assert!((a ^ b).count_ones() > 4);
    }

    #[test]
    fn test_shuffle_covers_every_position() {
        // Each element should be able to land in each slot over many seeds.
        let mut seen = [[false; 4]; 4];
        for seed in 1..500 {
            let mut v = [0usize, 1, 2, 3];
            SimpleRng::new(seed).shuffle(&mut v);
            for (slot, &value) in v.iter().enumerate() {
                seen[value][slot] = true;
            }
        }
        assert!(seen.iter().all(|row| row.iter().all(|&b| b)));
    }
}
