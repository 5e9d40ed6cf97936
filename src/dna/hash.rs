//! Seeded hash stream
//!
//! Every structural decision the generator makes comes from hashing a text
//! key built from a DNA segment and a few integers. The hash is a two-lane
//! 32-bit multiply/xor mix (the cyrb53 construction) folded into a 53-bit
//! value. It only uses wrapping `u32` arithmetic over Unicode scalar values,
//! so the output is identical on every platform and pointer width.

use std::fmt;

/// Largest value (exclusive) `hash` can return
pub const HASH_RANGE: u64 = 1 << 53;

/// Resolution of `float_at`: values are multiples of `1 / FLOAT_STEPS`
pub const FLOAT_STEPS: u64 = 1000;

/// Incremental form of [`hash`]. Implements `fmt::Write`, so a key can be
/// hashed straight from `write!` without building a `String`.
#[derive(Debug, Clone, Copy)]
pub struct StreamHasher {
    h1: u32,
    h2: u32,
}

impl StreamHasher {
    pub fn new() -> Self {
        Self { h1: 0xdead_beef, h2: 0x41c6_ce57 }
    }

    pub fn push_char(&mut self, ch: char) {
        let c = ch as u32;
        self.h1 = (self.h1 ^ c).wrapping_mul(2_654_435_761);
        self.h2 = (self.h2 ^ c).wrapping_mul(1_597_334_677);
    }

    /// Final avalanche; h1 is updated before it feeds h2
    pub fn finish(self) -> u64 {
        let mut h1 = self.h1;
        let mut h2 = self.h2;
        h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507);
        h1 ^= (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
        h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507);
        h2 ^= (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);

        (u64::from(h2 & 0x1F_FFFF) << 32) | u64::from(h1)
    }
}

impl Default for StreamHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for StreamHasher {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.chars().for_each(|ch| self.push_char(ch));
        Ok(())
    }
}

/// Hash a text key into the range `[0, 2^53)`.
pub fn hash(text: &str) -> u64 {
    let mut hasher = StreamHasher::new();
    text.chars().for_each(|ch| hasher.push_char(ch));
    hasher.finish()
}

/// Reduce a hash to a float in `[0, 1)` with 1/1000 resolution.
#[inline]
pub fn unit_float(hash: u64) -> f32 {
    (hash % FLOAT_STEPS) as f32 / FLOAT_STEPS as f32
}

/// Map a text key to a float in `[0, 1)` with 1/1000 resolution.
#[inline]
pub fn float_at(text: &str) -> f32 {
    unit_float(hash(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_reference_values() {
        // Pinned so any change to the mixing shows up as a test failure:
        // saved trees must look the same forever.
        assert_eq!(hash(""), 3_338_908_027_751_811);
        assert_eq!(hash("a"), 7_929_297_801_672_961);
        assert_eq!(hash("PIN-AB12"), 1_841_865_549_364_269);
    }

    #[test]
    fn test_hash_in_53_bit_range() {
        for key in ["", "x", "EVO-645A32-K9", "a much longer key with spaces 0:17:300"] {
            assert!(hash(key) < HASH_RANGE);
        }
    }

    #[test]
    fn test_float_at_range_and_resolution() {
        assert!((float_at("PIN-AB12") - 0.269).abs() < 1e-6);
        for i in 0..200 {
            let f = float_at(&format!("k{i}"));
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_small_change_avalanches() {
        let a = hash("OAK-0000");
        let b = hash("OAK-0001");
        // Expect roughly half the bits to flip; require a healthy minimum
        assert!((a ^ b).count_ones() > 10);
    }

    #[test]
    fn test_stream_hasher_matches_hash() {
        use std::fmt::Write;
        let mut hasher = StreamHasher::new();
        write!(hasher, "{}{}:{}:{}", "PIN-AB12", 0, 0, 100).unwrap();
        assert_eq!(hasher.finish(), hash("PIN-AB120:0:100"));
        assert_eq!(hasher.finish(), 5_535_432_580_976_669);
    }

    #[test]
    fn test_non_ascii_keys_are_stable() {
        assert_eq!(hash("盆栽"), hash("盆栽"));
        assert_ne!(hash("盆栽"), hash("盆"));
    }
}
