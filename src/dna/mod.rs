//! Genetic model: records, the seeded hash stream, and DNA segments.
//!
//! - `hash`: stable string hash and `[0, 1)` float stream
//! - `accessor`: depth/branch-keyed reads of a DNA history
//! - `record`: `GeneticRecord`, `Species`, `Stage`
//! - `encoder`: new DNA segments for planting and stage transitions

pub mod hash;
pub mod accessor;
pub mod record;
pub mod encoder;

pub use accessor::{DnaAccessor, Locus, offsets, segment_for, DEFAULT_SEGMENT};
pub use record::{GeneticRecord, Species, Stage, WIRING_MODULUS};
pub use encoder::{new_segment, seed_segment_with, evolution_segment_with};
