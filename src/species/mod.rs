//! Static per-species and per-stage parameters consumed by the generator
//! and the render adapters.

pub mod color;
pub mod profile;

pub use color::Color;
pub use profile::{LeafShape, SpeciesProfile, SpeciesTable, StageProfile, StageTable};
