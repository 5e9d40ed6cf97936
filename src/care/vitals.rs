//! Tree vitals and the care loop's tuning knobs

use serde::{Deserialize, Serialize};

/// Upper bound of every vital
pub const VITAL_MAX: f32 = 100.0;

/// Health, water and fertilizer, each in `0..=VITAL_MAX`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub water: f32,
    pub fertilizer: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            health: VITAL_MAX,
            water: 70.0,
            fertilizer: 50.0,
        }
    }
}

impl Vitals {
    /// Clamp every vital into range, mapping non-finite values to 0
    pub fn clamped(self) -> Self {
        let c = |v: f32| if v.is_finite() { v.clamp(0.0, VITAL_MAX) } else { 0.0 };
        Self {
            health: c(self.health),
            water: c(self.water),
            fertilizer: c(self.fertilizer),
        }
    }
}

/// Rates and thresholds for the care loop. Rates are per second of age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    pub water_decay: f32,
    pub fertilizer_decay: f32,
    /// Health regained per second while watered and fed
    pub heal_rate: f32,
    /// Health lost per second while thirsty or starving
    pub damage_rate: f32,
    /// Water below this hurts the tree
    pub thirst_threshold: f32,
    /// Fertilizer below this hurts the tree
    pub hunger_threshold: f32,
    pub water_amount: f32,
    pub fertilizer_amount: f32,
    /// Feeding above this level burns the roots
    pub overfeed_threshold: f32,
    pub overfeed_penalty: f32,
    /// Health cost of one prune
    pub prune_stress: f32,
    /// Minimum age to leave Seed, Sapling and Adult
    pub stage_age: [f64; 3],
    /// Minimum health to advance a stage
    pub advance_health: f32,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            water_decay: 0.2,
            fertilizer_decay: 0.05,
            heal_rate: 0.1,
            damage_rate: 0.5,
            thirst_threshold: 20.0,
            hunger_threshold: 10.0,
            water_amount: 25.0,
            fertilizer_amount: 20.0,
            overfeed_threshold: 80.0,
            overfeed_penalty: 10.0,
            prune_stress: 3.0,
            stage_age: [60.0, 300.0, 900.0],
            advance_health: 50.0,
        }
    }
}
