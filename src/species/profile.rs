//! Species and stage parameter tables.
//!
//! Both tables are total over their enum: the default tables are built
//! with exhaustive matches, and JSON overrides are rejected at load time
//! unless every species/stage has an entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::dna::{Species, Stage};
use super::color::Color;

/// Leaf silhouette category, drives foliage glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafShape {
    Needle,
    Scale,
    Lobed,
    Palmate,
}

impl LeafShape {
    /// Needle and scale foliage belong to conifers
    pub fn is_needle_leaved(self) -> bool {
        matches!(self, LeafShape::Needle | LeafShape::Scale)
    }
}

/// Per-species appearance and growth coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub name: String,
    pub leaf_color: Color,
    pub bark_color: Color,
    pub leaf_shape: LeafShape,
    /// Scales trunk length and aging speed (1.0 = reference)
    pub growth_speed: f32,
    /// Multiplier on branch fan angles; conifers stay narrow
    pub branch_spread: f32,
    pub description: String,
}

impl SpeciesProfile {
    /// Japanese black pine: narrow needle spread, slow grower
    pub fn pine() -> Self {
        Self {
            name: "Pine".to_string(),
            leaf_color: Color::rgb(45, 95, 60),
            bark_color: Color::rgb(95, 70, 50),
            leaf_shape: LeafShape::Needle,
            growth_speed: 0.9,
            branch_spread: 0.6,
            description: "Japanese black pine. Tight needle pads, rugged bark, rewards patient pruning.".to_string(),
        }
    }

    /// English oak: wide crown, lobed leaves
    pub fn oak() -> Self {
        Self {
            name: "Oak".to_string(),
            leaf_color: Color::rgb(70, 130, 45),
            bark_color: Color::rgb(90, 60, 30),
            leaf_shape: LeafShape::Lobed,
            growth_speed: 1.0,
            branch_spread: 1.2,
            description: "English oak. Broad spreading crown and a thick trunk in old age.".to_string(),
        }
    }

    /// Japanese maple: red palmate leaves, fast grower
    pub fn maple() -> Self {
        Self {
            name: "Maple".to_string(),
            leaf_color: Color::rgb(170, 50, 40),
            bark_color: Color::rgb(110, 85, 70),
            leaf_shape: LeafShape::Palmate,
            growth_speed: 1.1,
            branch_spread: 1.1,
            description: "Japanese maple. Delicate red leaves and fine ramification.".to_string(),
        }
    }

    /// Juniper: scale foliage, slowest grower
    pub fn juniper() -> Self {
        Self {
            name: "Juniper".to_string(),
            leaf_color: Color::rgb(60, 110, 80),
            bark_color: Color::rgb(120, 80, 60),
            leaf_shape: LeafShape::Scale,
            growth_speed: 0.8,
            branch_spread: 0.7,
            description: "Shimpaku juniper. Twisting deadwood and dense scale foliage, loves wiring.".to_string(),
        }
    }

    pub fn for_species(species: Species) -> Self {
        match species {
            Species::Pine => Self::pine(),
            Species::Oak => Self::oak(),
            Species::Maple => Self::maple(),
            Species::Juniper => Self::juniper(),
        }
    }
}

/// Per-stage container geometry and label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProfile {
    pub label: String,
    pub container_depth: f32,
    pub container_width: f32,
    pub container_color: Color,
}

impl StageProfile {
    pub fn for_stage(stage: Stage) -> Self {
        let (label, depth, width, color) = match stage {
            Stage::Seed => ("Seed", 0.3, 0.8, Color::rgb(160, 82, 45)),
            Stage::Sapling => ("Sapling", 0.4, 1.2, Color::rgb(140, 70, 40)),
            Stage::Adult => ("Adult", 0.35, 1.8, Color::rgb(90, 90, 100)),
            Stage::Master => ("Master", 0.3, 2.6, Color::rgb(50, 55, 70)),
        };
        Self {
            label: label.to_string(),
            container_depth: depth,
            container_width: width,
            container_color: color,
        }
    }
}

/// Total lookup table `Species -> SpeciesProfile`
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTable {
    profiles: Vec<SpeciesProfile>,
}

impl SpeciesTable {
    /// Build from a map that must cover every species
    pub fn from_map(mut map: BTreeMap<Species, SpeciesProfile>) -> Result<Self> {
        let mut profiles = Vec::with_capacity(Species::ALL.len());
        for species in Species::ALL {
            let profile = map.remove(&species).ok_or(Error::MissingSpecies(species))?;
            profiles.push(profile);
        }
        Ok(Self { profiles })
    }

    /// Parse a JSON object keyed by species name
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: BTreeMap<Species, SpeciesProfile> = serde_json::from_str(json)?;
        Self::from_map(map)
    }

    pub fn get(&self, species: Species) -> &SpeciesProfile {
        &self.profiles[species as usize]
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            profiles: Species::ALL.iter().map(|&s| SpeciesProfile::for_species(s)).collect(),
        }
    }
}

/// Total lookup table `Stage -> StageProfile`
#[derive(Debug, Clone, PartialEq)]
pub struct StageTable {
    profiles: Vec<StageProfile>,
}

impl StageTable {
    pub fn from_map(mut map: BTreeMap<Stage, StageProfile>) -> Result<Self> {
        let mut profiles = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            let profile = map.remove(&stage).ok_or(Error::MissingStage(stage))?;
            profiles.push(profile);
        }
        Ok(Self { profiles })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: BTreeMap<Stage, StageProfile> = serde_json::from_str(json)?;
        Self::from_map(map)
    }

    pub fn get(&self, stage: Stage) -> &StageProfile {
        &self.profiles[stage.index()]
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            profiles: Stage::ALL.iter().map(|&s| StageProfile::for_stage(s)).collect(),
        }
    }
}
