//! The care loop: a genetic record plus vitals, mutated by care actions and
//! a timed tick.

use rand::Rng;
use thiserror::Error;

use crate::dna::{self, GeneticRecord, Species, Stage, WIRING_MODULUS};
use crate::species::SpeciesTable;
use super::vitals::{CareConfig, Vitals, VITAL_MAX};

/// Why a care action was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CareError {
    #[error("the tree has died")]
    Dead,

    #[error("a {0:?} is too young to prune or wire")]
    TooYoung(Stage),

    #[error("needs age {required:.0} to advance, has {current:.0}")]
    NotOldEnough { required: f64, current: f64 },

    #[error("needs health {required:.0} to advance, has {current:.0}")]
    TooWeak { required: f32, current: f32 },

    #[error("already at the final stage")]
    FinalStage,
}

/// A tended tree
#[derive(Debug, Clone, PartialEq)]
pub struct Bonsai {
    record: GeneticRecord,
    vitals: Vitals,
    config: CareConfig,
}

impl Bonsai {
    /// Plant a new seed with a freshly drawn seed segment
    pub fn plant(species: Species, config: CareConfig) -> Self {
        Self::plant_with(species, config, &mut rand::thread_rng())
    }

    pub fn plant_with<R: Rng + ?Sized>(species: Species, config: CareConfig, rng: &mut R) -> Self {
        let segment = dna::seed_segment_with(species.dna_prefix(), rng);
        log::info!("Planted {:?} seed {}", species, segment);
        Self {
            record: GeneticRecord::new(species, segment),
            vitals: Vitals::default(),
            config,
        }
    }

    /// Reassemble from persisted parts
    pub fn from_parts(record: GeneticRecord, vitals: Vitals, config: CareConfig) -> Self {
        Self { record, vitals: vitals.clamped(), config }
    }

    pub fn record(&self) -> &GeneticRecord {
        &self.record
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn config(&self) -> &CareConfig {
        &self.config
    }

    pub fn is_alive(&self) -> bool {
        self.vitals.health > 0.0
    }

    /// Advance time by `dt` seconds: vitals decay or heal, age grows at the
    /// species' growth speed. Dead trees stop aging.
    pub fn tick(&mut self, dt: f64, species: &SpeciesTable) {
        if !self.is_alive() || !(dt > 0.0) {
            return;
        }
        let dt32 = dt as f32;
        let c = &self.config;
        let v = &mut self.vitals;

        v.water -= c.water_decay * dt32;
        v.fertilizer -= c.fertilizer_decay * dt32;

        if v.water < c.thirst_threshold || v.fertilizer < c.hunger_threshold {
            v.health -= c.damage_rate * dt32;
        } else {
            v.health += c.heal_rate * dt32;
        }
        *v = v.clamped();

        let age = self.record.age + dt * f64::from(species.get(self.record.species).growth_speed);
        if age.is_finite() {
            self.record.age = age;
        } else {
            log::warn!("Ignoring a tick of {dt}s: age would overflow");
        }

        if !self.is_alive() {
            log::warn!("{:?} at stage {:?} has died", self.record.species, self.record.stage);
        }
    }

    pub fn water(&mut self) -> Result<(), CareError> {
        self.ensure_alive()?;
        self.vitals.water = (self.vitals.water + self.config.water_amount).min(VITAL_MAX);
        log::info!("Watered: water {:.0}", self.vitals.water);
        Ok(())
    }

    /// Feed the tree; feeding an already well-fed tree costs health
    pub fn fertilize(&mut self) -> Result<(), CareError> {
        self.ensure_alive()?;
        if self.vitals.fertilizer > self.config.overfeed_threshold {
            self.vitals.health = (self.vitals.health - self.config.overfeed_penalty).max(0.0);
            log::warn!("Overfed: health {:.0}", self.vitals.health);
        }
        self.vitals.fertilizer = (self.vitals.fertilizer + self.config.fertilizer_amount).min(VITAL_MAX);
        log::info!("Fertilized: fertilizer {:.0}", self.vitals.fertilizer);
        Ok(())
    }

    /// Increment the pruning count, which re-rolls which deep branches survive
    pub fn prune(&mut self) -> Result<u32, CareError> {
        self.ensure_shapeable()?;
        self.record.pruning_count = self.record.pruning_count.saturating_add(1);
        self.vitals.health = (self.vitals.health - self.config.prune_stress).max(0.0);
        log::info!("Pruned: pruning count {}", self.record.pruning_count);
        Ok(self.record.pruning_count)
    }

    /// Cycle the wiring state
    pub fn wire(&mut self) -> Result<u8, CareError> {
        self.ensure_shapeable()?;
        self.record.wiring_state = (self.record.wiring_state + 1) % WIRING_MODULUS;
        log::info!("Wired: wiring state {}", self.record.wiring_state);
        Ok(self.record.wiring_state)
    }

    /// Advance to the next stage, appending an evolution segment that
    /// encodes the current vitals
    pub fn advance_stage(&mut self) -> Result<Stage, CareError> {
        self.advance_stage_with(&mut rand::thread_rng())
    }

    pub fn advance_stage_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Stage, CareError> {
        self.ensure_alive()?;
        let current = self.record.stage;
        let next = current.next().ok_or_else(|| self.reject(CareError::FinalStage))?;

        let required = self.config.stage_age[current.index()];
        if self.record.age < required {
            return Err(self.reject(CareError::NotOldEnough { required, current: self.record.age }));
        }
        if self.vitals.health < self.config.advance_health {
            return Err(self.reject(CareError::TooWeak {
                required: self.config.advance_health,
                current: self.vitals.health,
            }));
        }

        let segment = dna::evolution_segment_with(&self.vitals, rng);
        log::info!("{:?} advanced {:?} -> {:?} with segment {}", self.record.species, current, next, segment);
        self.record.push_segment(segment);
        self.record.stage = next;
        Ok(next)
    }

    fn ensure_alive(&self) -> Result<(), CareError> {
        if self.is_alive() { Ok(()) } else { Err(self.reject(CareError::Dead)) }
    }

    fn ensure_shapeable(&self) -> Result<(), CareError> {
        self.ensure_alive()?;
        if self.record.stage == Stage::Seed {
            return Err(self.reject(CareError::TooYoung(Stage::Seed)));
        }
        Ok(())
    }

    fn reject(&self, err: CareError) -> CareError {
        log::warn!("Rejected care action on {:?}: {}", self.record.species, err);
        err
    }
}
