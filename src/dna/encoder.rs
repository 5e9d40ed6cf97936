//! Genetic history encoder
//!
//! Produces the DNA segments appended to a record's history. This is the
//! only place in the crate that uses non-seeded randomness: the random
//! suffixes make two trees with identical vitals diverge. Everything
//! downstream of an appended segment is deterministic.

use rand::Rng;

use crate::care::Vitals;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random token in a seed segment
pub const SEED_TOKEN_LEN: usize = 4;
/// Length of the random suffix in an evolution segment
pub const EVOLUTION_SUFFIX_LEN: usize = 2;

/// Uppercase base36 token of `len` random characters
fn base36_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Vital truncated to an integer and clamped to 0..=100
fn vital_byte(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().clamp(0.0, 100.0) as u8
}

/// Seed segment: `PREFIX-XXXX`
pub fn seed_segment_with<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{}-{}", prefix, base36_token(rng, SEED_TOKEN_LEN))
}

/// Stage-transition segment: `EVO-{health}{water}{fertilizer}-XX`, vitals in
/// two-digit uppercase hex
pub fn evolution_segment_with<R: Rng + ?Sized>(vitals: &Vitals, rng: &mut R) -> String {
    format!(
        "EVO-{:02X}{:02X}{:02X}-{}",
        vital_byte(vitals.health),
        vital_byte(vitals.water),
        vital_byte(vitals.fertilizer),
        base36_token(rng, EVOLUTION_SUFFIX_LEN),
    )
}

/// New segment from thread-local randomness: a seed segment when `vitals`
/// is `None`, otherwise an evolution segment.
pub fn new_segment(prefix: &str, vitals: Option<&Vitals>) -> String {
    let mut rng = rand::thread_rng();
    match vitals {
        Some(v) => evolution_segment_with(v, &mut rng),
        None => seed_segment_with(prefix, &mut rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_base36_upper(s: &str) -> bool {
        s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    }

    #[test]
    fn test_seed_segment_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let seg = seed_segment_with("PIN", &mut rng);
        let (prefix, token) = seg.split_once('-').unwrap();
        assert_eq!(prefix, "PIN");
        assert_eq!(token.len(), SEED_TOKEN_LEN);
        assert!(is_base36_upper(token));
    }

    #[test]
    fn test_evolution_segment_encodes_vitals() {
        let mut rng = StdRng::seed_from_u64(1);
        let vitals = Vitals { health: 100.0, water: 90.7, fertilizer: 10.2 };
        let seg = evolution_segment_with(&vitals, &mut rng);
        assert!(seg.starts_with("EVO-645A0A-"), "got {seg}");
        let suffix = &seg["EVO-645A0A-".len()..];
        assert_eq!(suffix.len(), EVOLUTION_SUFFIX_LEN);
        assert!(is_base36_upper(suffix));
    }

    #[test]
    fn test_evolution_segment_clamps_out_of_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let vitals = Vitals { health: 250.0, water: -4.0, fertilizer: f32::NAN };
        let seg = evolution_segment_with(&vitals, &mut rng);
        assert!(seg.starts_with("EVO-640000-"), "got {seg}");
    }

    #[test]
    fn test_new_segment_dispatch() {
        assert!(new_segment("OAK", None).starts_with("OAK-"));
        let vitals = Vitals::default();
        assert!(new_segment("OAK", Some(&vitals)).starts_with("EVO-"));
    }

    #[test]
    fn test_suffix_diverges_for_identical_vitals() {
        let mut rng = StdRng::seed_from_u64(99);
        let vitals = Vitals::default();
        let segments: Vec<String> = (0..16).map(|_| evolution_segment_with(&vitals, &mut rng)).collect();
        let first = &segments[0];
        assert!(segments.iter().any(|s| s != first));
    }
}
