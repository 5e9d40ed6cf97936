//! Genetic record: the persisted identity of one tree
//!
//! The record is owned by the care loop. The generator only ever borrows it
//! for the duration of one evaluation.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Number of wiring positions; the wire action cycles through them
pub const WIRING_MODULUS: u8 = 4;

/// Tree species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Pine,
    Oak,
    Maple,
    Juniper,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::Pine, Species::Oak, Species::Maple, Species::Juniper];

    /// Parse a case-insensitive species name
    pub fn from_name(name: &str) -> Option<Species> {
        match name.to_ascii_lowercase().as_str() {
            "pine" => Some(Species::Pine),
            "oak" => Some(Species::Oak),
            "maple" => Some(Species::Maple),
            "juniper" => Some(Species::Juniper),
            _ => None,
        }
    }

    /// Three-letter prefix used for the seed DNA segment
    pub fn dna_prefix(self) -> &'static str {
        match self {
            Species::Pine => "PIN",
            Species::Oak => "OAK",
            Species::Maple => "MAP",
            Species::Juniper => "JUN",
        }
    }
}

/// Growth stage, monotonically non-decreasing over a record's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Seed,
    Sapling,
    Adult,
    Master,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Seed, Stage::Sapling, Stage::Adult, Stage::Master];

    /// Position in the stage order (Seed = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage after this one, or `None` at Master
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Seed => Some(Stage::Sapling),
            Stage::Sapling => Some(Stage::Adult),
            Stage::Adult => Some(Stage::Master),
            Stage::Master => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Stage> {
        match name.to_ascii_lowercase().as_str() {
            "seed" => Some(Stage::Seed),
            "sapling" => Some(Stage::Sapling),
            "adult" => Some(Stage::Adult),
            "master" => Some(Stage::Master),
            _ => None,
        }
    }
}

/// Everything the generator needs to rebuild a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticRecord {
    pub species: Species,
    pub stage: Stage,
    /// One segment per stage reached; append-only
    dna_history: Vec<String>,
    pub pruning_count: u32,
    /// Always `< WIRING_MODULUS` for a valid record
    pub wiring_state: u8,
    /// Advanced by the care loop tick; not read by the generator
    pub age: f64,
}

impl GeneticRecord {
    /// New seed-stage record carrying its first DNA segment
    pub fn new(species: Species, seed_segment: impl Into<String>) -> Self {
        Self {
            species,
            stage: Stage::Seed,
            dna_history: vec![seed_segment.into()],
            pruning_count: 0,
            wiring_state: 0,
            age: 0.0,
        }
    }

    /// Record at an arbitrary stage with a given history (previews, tests)
    pub fn with_history(species: Species, stage: Stage, history: Vec<String>) -> Self {
        Self {
            species,
            stage,
            dna_history: history,
            pruning_count: 0,
            wiring_state: 0,
            age: 0.0,
        }
    }

    pub fn with_pruning(mut self, pruning_count: u32) -> Self {
        self.pruning_count = pruning_count;
        self
    }

    pub fn with_wiring(mut self, wiring_state: u8) -> Self {
        self.wiring_state = wiring_state;
        self
    }

    /// Read-only view of the DNA history
    pub fn dna_history(&self) -> &[String] {
        &self.dna_history
    }

    /// Append a segment. The only way the history can change.
    pub fn push_segment(&mut self, segment: String) {
        self.dna_history.push(segment);
    }

    /// Reject records the generator should never see
    pub fn validate(&self) -> Result<()> {
        if self.dna_history.is_empty() {
            return Err(Error::InvalidRecord("DNA history is empty".to_string()));
        }
        if self.dna_history.iter().any(|s| s.is_empty()) {
            return Err(Error::InvalidRecord("DNA history contains an empty segment".to_string()));
        }
        if self.wiring_state >= WIRING_MODULUS {
            return Err(Error::InvalidRecord(format!(
                "wiring state {} out of range 0..{}",
                self.wiring_state, WIRING_MODULUS
            )));
        }
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(Error::InvalidRecord(format!("age {} is not a valid age", self.age)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_seed() {
        let record = GeneticRecord::new(Species::Oak, "OAK-1A2B");
        assert_eq!(record.stage, Stage::Seed);
        assert_eq!(record.dna_history(), &["OAK-1A2B".to_string()]);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Seed < Stage::Sapling);
        assert!(Stage::Adult < Stage::Master);
        assert_eq!(Stage::Adult.next(), Some(Stage::Master));
        assert_eq!(Stage::Master.next(), None);
        assert_eq!(Stage::Master.index(), 3);
    }

    #[test]
    fn test_push_segment_appends() {
        let mut record = GeneticRecord::new(Species::Pine, "PIN-0000");
        record.push_segment("EVO-646464-AA".to_string());
        assert_eq!(record.dna_history().len(), 2);
        assert_eq!(record.dna_history()[0], "PIN-0000");
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let empty = GeneticRecord::with_history(Species::Pine, Stage::Adult, vec![]);
        assert!(matches!(empty.validate(), Err(Error::InvalidRecord(_))));

        let wired = GeneticRecord::new(Species::Pine, "PIN-0000").with_wiring(WIRING_MODULUS);
        assert!(matches!(wired.validate(), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_names_parse() {
        assert_eq!(Species::from_name("JUNIPER"), Some(Species::Juniper));
        assert_eq!(Species::from_name("birch"), None);
        assert_eq!(Stage::from_name("sapling"), Some(Stage::Sapling));
    }

    #[test]
    fn test_json_roundtrip_keeps_history_order() {
        let mut record = GeneticRecord::new(Species::Maple, "MAP-ZZ01");
        record.push_segment("EVO-0A0B0C-1X".to_string());
        let json = serde_json::to_string(&record).unwrap();
        let back: GeneticRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
