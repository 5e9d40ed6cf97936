//! Tree generation: genetic record -> branch structure.
//!
//! The generator is a pure function of the record, the species table and
//! the configuration. Nothing here does I/O or keeps state between calls,
//! so evaluations can run on any thread, including several at once.

pub mod config;
pub mod node;
pub mod generator;

pub use config::{GeneratorConfig, GrowthStyle, MAX_COMPLEXITY};
pub use node::{Appearance, BranchNode, Foliage, LeafBlob, SeedSprout, TreeBody, TreeShape};
pub use generator::StructuralGenerator;

use rayon::prelude::*;

use crate::dna::GeneticRecord;
use crate::species::SpeciesTable;

/// Evaluate a record with a one-off generator
pub fn generate(record: &GeneticRecord, species: &SpeciesTable, config: &GeneratorConfig) -> TreeShape {
    StructuralGenerator::new(config, species).generate(record)
}

/// Speculatively evaluate the tree for several pruning counts in parallel,
/// e.g. to preview what the next few prunes would leave standing.
///
/// Results are returned in the order of `pruning_counts`.
pub fn preview_pruning(
    record: &GeneticRecord,
    species: &SpeciesTable,
    config: &GeneratorConfig,
    pruning_counts: &[u32],
) -> Vec<TreeShape> {
    let generator = StructuralGenerator::new(config, species);
    pruning_counts
        .par_iter()
        .map(|&count| {
            let mut variant = record.clone();
            variant.pruning_count = count;
            generator.generate(&variant)
        })
        .collect()
}
