//! Bonsai - deterministic, DNA-driven bonsai tree generation

pub mod core;
pub mod math;
pub mod dna;
pub mod species;
pub mod generation;
pub mod render;
pub mod care;
