//! Structural generator: a seeded, depth-bounded branching grammar.
//!
//! Every decision about a node is read from the DNA hash stream at that
//! node's locus, so the same record always yields the same tree:
//!
//! 1. nodes deeper than 1 survive only if their prune roll (offset by the
//!    record's pruning count) stays under the threshold;
//! 2. children shrink: length by 0.75-0.85 (DNA), radius by a fixed 0.7;
//! 3. child angle = index offset scaled by species spread, plus DNA jitter,
//!    plus a uniform wiring shear applied to every branch;
//! 4. branching is a 2-way split (Mesh) or a DNA-chosen 2-3 way fan (Canvas);
//! 5. nodes at the stage complexity are terminal and carry foliage.

use std::f32::consts::TAU;

use crate::dna::{offsets, DnaAccessor, GeneticRecord, Locus};
use crate::species::{Color, LeafShape, SpeciesTable};
use super::config::{GeneratorConfig, GrowthStyle};
use super::node::{Appearance, BranchNode, Foliage, LeafBlob, SeedSprout, TreeBody, TreeShape};

/// Fixed per-level radius decay
pub const RADIUS_DECAY: f32 = 0.7;
/// Per-level length decay is `LENGTH_DECAY_MIN + LENGTH_DECAY_RANGE * roll`
pub const LENGTH_DECAY_MIN: f32 = 0.75;
pub const LENGTH_DECAY_RANGE: f32 = 0.1;

/// Largest foliage cluster in Mesh style
pub const MAX_FOLIAGE_BLOBS: usize = 5;
const MIN_FOLIAGE_BLOBS: usize = 3;

/// Max hue rotation (degrees) and lightness shift of the per-tree tint
const TINT_HUE_RANGE: f32 = 24.0;
const TINT_LIGHTNESS_RANGE: f32 = 0.12;

/// Golden angle, spreads successive child planes around the parent axis
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Builds `TreeShape`s from genetic records
pub struct StructuralGenerator<'a> {
    config: &'a GeneratorConfig,
    species: &'a SpeciesTable,
}

/// Per-evaluation state shared by every node
struct Growth<'r> {
    dna: DnaAccessor<'r>,
    config: &'r GeneratorConfig,
    max_depth: u32,
    pruning_count: u32,
    wiring_state: u8,
    branch_spread: f32,
    leaf_shape: LeafShape,
}

impl<'a> StructuralGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, species: &'a SpeciesTable) -> Self {
        Self { config, species }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    /// Evaluate a record. Pure: the record is only read.
    pub fn generate(&self, record: &GeneticRecord) -> TreeShape {
        let profile = self.species.get(record.species);
        let max_depth = self.config.complexity(record.stage);
        let dna = DnaAccessor::new(record.dna_history(), self.config.stride());

        let tint_roll = dna.float_at(Locus { depth: max_depth, branch: 0 }, offsets::TINT);
        let leaf_tint = leaf_tint(profile.leaf_color, tint_roll);

        let body = if max_depth == 0 {
            TreeBody::Seed(self.seed_sprout(&dna))
        } else {
            let growth = Growth {
                dna,
                config: self.config,
                max_depth,
                pruning_count: record.pruning_count,
                wiring_state: record.wiring_state,
                branch_spread: profile.branch_spread,
                leaf_shape: profile.leaf_shape,
            };
            let length = self.config.trunk_length * profile.growth_speed;
            let radius = self.config.trunk_radius * trunk_thickness(record.stage.index());
            let angle = growth.wiring_shear();
            // The trunk is never pruned, so this always yields a node
            match growth.grow(Locus::ROOT, length, radius, angle, 0.0) {
                Some(root) => TreeBody::Branches(root),
                None => TreeBody::Seed(self.seed_sprout(&dna)),
            }
        };

        let shape = TreeShape {
            species: record.species,
            stage: record.stage,
            style: self.config.style,
            max_depth,
            leaf_tint,
            bark_color: profile.bark_color,
            body,
        };

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "Generated {:?} {:?} ({:?}): {} nodes, {} leaves, complexity {}",
                shape.species,
                shape.stage,
                shape.style,
                shape.node_count(),
                shape.leaf_count(),
                max_depth
            );
        }

        shape
    }

    /// Fixed sprout for the Seed stage, scaled by one DNA roll
    fn seed_sprout(&self, dna: &DnaAccessor<'_>) -> SeedSprout {
        let scale = 0.8 + 0.4 * dna.float_at(Locus::ROOT, offsets::SEED_SCALE);
        SeedSprout {
            height: self.config.trunk_length * 0.3 * scale,
            radius: self.config.trunk_radius * 0.5 * scale,
            scale,
        }
    }
}

/// Trunk radius multiplier by stage index; older trees are stouter
fn trunk_thickness(stage_index: usize) -> f32 {
    0.6 + 0.2 * stage_index as f32
}

/// Species leaf color with one hue/lightness offset for the whole tree
fn leaf_tint(base: Color, roll: f32) -> Color {
    let centered = roll - 0.5;
    base.shifted(centered * TINT_HUE_RANGE, centered * TINT_LIGHTNESS_RANGE)
}

impl Growth<'_> {
    fn wiring_shear(&self) -> f32 {
        self.config.wiring_shear * self.wiring_state as f32
    }

    /// Build the node at `locus` and its subtree, or `None` if pruned
    fn grow(&self, locus: Locus, length: f32, radius: f32, angle: f32, roll: f32) -> Option<BranchNode> {
        if locus.depth > 1 {
            let prune_roll = self
                .dna
                .float_at(locus, offsets::PRUNE + u64::from(self.pruning_count));
            if prune_roll > self.config.prune_threshold {
                return None;
            }
        }

        let appearance = self.appearance(locus);
        let end_radius = radius * RADIUS_DECAY;

        let (children, foliage) = if locus.depth >= self.max_depth {
            (Vec::new(), self.foliage(locus))
        } else {
            (self.branch(locus, length, end_radius), None)
        };

        Some(BranchNode {
            depth: locus.depth,
            branch_id: locus.branch,
            length,
            start_radius: radius,
            end_radius,
            angle,
            roll,
            appearance,
            foliage,
            children,
        })
    }

    /// Spawn the surviving children of the node at `locus`
    fn branch(&self, locus: Locus, length: f32, child_radius: f32) -> Vec<BranchNode> {
        let count = self.branch_count(locus);
        let mut children = Vec::with_capacity(count);

        for index in 0..count {
            let child = locus.child(index);
            let decay = LENGTH_DECAY_MIN + LENGTH_DECAY_RANGE * self.dna.float_at(child, offsets::LENGTH);
            let jitter = (self.dna.float_at(child, offsets::ANGLE) - 0.5) * self.config.angle_jitter;
            let angle = self.index_offset(index, count) * self.branch_spread + jitter + self.wiring_shear();
            let roll = index as f32 * TAU / count as f32 + locus.depth as f32 * GOLDEN_ANGLE;

            if let Some(node) = self.grow(child, length * decay, child_radius, angle, roll) {
                children.push(node);
            }
        }

        children
    }

    fn branch_count(&self, locus: Locus) -> usize {
        match self.config.style {
            GrowthStyle::Mesh => 2,
            GrowthStyle::Canvas => {
                let roll = self.dna.float_at(locus, offsets::FAN);
                ((roll * 2.0).floor() as usize + 2).min(3)
            }
        }
    }

    /// Angular position of child `index` of `count`, before species spread
    fn index_offset(&self, index: usize, count: usize) -> f32 {
        match self.config.style {
            GrowthStyle::Mesh => {
                if index % 2 == 0 { -self.config.split_angle } else { self.config.split_angle }
            }
            GrowthStyle::Canvas => {
                if count < 2 {
                    return 0.0;
                }
                let fan = self.config.fan_angle;
                -fan * 0.5 + fan * index as f32 / (count - 1) as f32
            }
        }
    }

    fn appearance(&self, locus: Locus) -> Appearance {
        let tip_weight = (locus.depth + 1) as f32 / (self.max_depth + 1) as f32;
        Appearance {
            bark_shade: (self.dna.float_at(locus, offsets::BARK) - 0.5) * 0.2,
            sway_phase: self.dna.float_at(locus, offsets::SWAY_PHASE) * TAU,
            sway_amplitude: self.config.sway_amplitude
                * (0.5 + 0.5 * self.dna.float_at(locus, offsets::SWAY_AMPLITUDE))
                * tip_weight,
        }
    }

    /// Foliage for a terminal node, per the style's leaf policy
    fn foliage(&self, locus: Locus) -> Option<Foliage> {
        match self.config.style {
            GrowthStyle::Mesh => Some(Foliage::Cluster(self.foliage_cluster(locus))),
            GrowthStyle::Canvas => {
                let roll = self.dna.float_at(locus, offsets::LEAF_ROLL);
                (roll > self.config.leaf_threshold).then_some(Foliage::Glyph(self.leaf_shape))
            }
        }
    }

    fn foliage_cluster(&self, locus: Locus) -> Vec<LeafBlob> {
        let extra = (self.dna.float_at(locus, offsets::FOLIAGE) * 3.0) as usize;
        let count = (MIN_FOLIAGE_BLOBS + extra).min(MAX_FOLIAGE_BLOBS);
        let radius = self.config.leaf_size * self.config.trunk_length;

        (0..count)
            .map(|k| {
                let base = offsets::FOLIAGE + 1 + 3 * k as u64;
                let axis = |i: u64| (self.dna.float_at(locus, base + i) - 0.5) * 2.0 * radius;
                LeafBlob {
                    // Clusters sit on and slightly past the tip
                    offset: [axis(0), axis(1).abs() * 0.5, axis(2)],
                    radius,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::{Species, Stage};

    fn record(species: Species, stage: Stage, history: &[&str]) -> GeneticRecord {
        GeneticRecord::with_history(species, stage, history.iter().map(|s| s.to_string()).collect())
    }

    fn generate(config: &GeneratorConfig, record: &GeneticRecord) -> TreeShape {
        let table = SpeciesTable::default();
        StructuralGenerator::new(config, &table).generate(record)
    }

    /// (depth, branch_id, length, start_radius, angle) of every node
    fn node_attributes(shape: &TreeShape) -> Vec<(u32, u64, f32, f32, f32)> {
        let mut out = Vec::new();
        shape.walk(&mut |n| out.push((n.depth, n.branch_id, n.length, n.start_radius, n.angle)));
        out
    }

    #[test]
    fn test_deterministic() {
        for style in [GrowthStyle::Mesh, GrowthStyle::Canvas] {
            let config = GeneratorConfig::for_style(style);
            let rec = record(Species::Maple, Stage::Master, &["MAP-4KQ1", "EVO-645A32-7Z", "EVO-5F3C28-Q0"])
                .with_pruning(3)
                .with_wiring(2);
            let a = generate(&config, &rec);
            let b = generate(&config, &rec);
            assert_eq!(a, b, "{style:?} evaluation not reproducible");
            assert!(a.node_count() > 1);
        }
    }

    #[test]
    fn test_seed_stage_has_no_branches() {
        for style in [GrowthStyle::Mesh, GrowthStyle::Canvas] {
            let config = GeneratorConfig::for_style(style);
            let shape = generate(&config, &record(Species::Oak, Stage::Seed, &["OAK-0001"]));
            assert_eq!(shape.node_count(), 0);
            assert_eq!(shape.max_node_depth(), None);
            let sprout = shape.sprout().expect("seed stage draws a sprout");
            assert!((0.8..1.2).contains(&sprout.scale));
            assert!(sprout.height > 0.0);
        }
    }

    #[test]
    fn test_depth_bounded_by_complexity() {
        for style in [GrowthStyle::Mesh, GrowthStyle::Canvas] {
            let config = GeneratorConfig::for_style(style);
            for stage in [Stage::Sapling, Stage::Adult, Stage::Master] {
                let shape = generate(&config, &record(Species::Juniper, stage, &["JUN-AAAA", "EVO-010203-XY"]));
                let limit = config.complexity(stage);
                shape.walk(&mut |n| assert!(n.depth <= limit));
                shape.walk(&mut |n| {
                    if n.depth == limit {
                        assert!(n.is_terminal());
                    }
                });
            }
        }
    }

    #[test]
    fn test_children_strictly_shrink() {
        for style in [GrowthStyle::Mesh, GrowthStyle::Canvas] {
            let config = GeneratorConfig::for_style(style);
            let shape = generate(&config, &record(Species::Oak, Stage::Master, &["OAK-ZZ99", "EVO-2A2A2A-00"]));
            let root = shape.root().unwrap();
            root.walk_with_parent(&mut |parent, child| {
                if let Some(parent) = parent {
                    assert!(child.length < parent.length);
                    assert!(child.start_radius < parent.start_radius);
                    assert!((child.start_radius - parent.end_radius).abs() < 1e-6);
                    assert_eq!(child.depth, parent.depth + 1);
                }
            });
        }
    }

    #[test]
    fn test_pruning_never_touches_shallow_nodes() {
        let config = GeneratorConfig::default();
        let base = record(Species::Pine, Stage::Master, &["PIN-7F2K", "EVO-645A32-7Z"]);

        let shallow = |shape: &TreeShape| {
            node_attributes(shape).into_iter().filter(|a| a.0 <= 1).collect::<Vec<_>>()
        };

        let mut changed_somewhere = false;
        for n in 0..6 {
            let a = generate(&config, &base.clone().with_pruning(n));
            let b = generate(&config, &base.clone().with_pruning(n + 1));
            // Trunk and both first-level branches always survive unchanged
            assert_eq!(shallow(&a), shallow(&b));
            assert_eq!(shallow(&a).len(), 3);
            changed_somewhere |= a != b;
        }
        assert!(changed_somewhere, "pruning count should re-roll deeper survival");
    }

    #[test]
    fn test_pruning_drops_subtrees() {
        let config = GeneratorConfig::default();
        let unpruned = GeneratorConfig { prune_threshold: 1.0, ..Default::default() };
        let rec = record(Species::Oak, Stage::Master, &["OAK-Q1W2", "EVO-404040-AB", "EVO-505050-CD"]);

        let full = generate(&unpruned, &rec);
        let pruned = generate(&config, &rec);
        // A complete binary tree of depth 7 has 2^8 - 1 nodes
        assert_eq!(full.node_count(), 255);
        assert!(pruned.node_count() < full.node_count());
    }

    #[test]
    fn test_later_segments_only_affect_deeper_levels() {
        let config = GeneratorConfig::for_style(GrowthStyle::Mesh);
        let one = generate(&config, &record(Species::Oak, Stage::Adult, &["X"]));
        let two = generate(&config, &record(Species::Oak, Stage::Adult, &["X", "Y"]));

        let attrs_one = node_attributes(&one);
        let attrs_two = node_attributes(&two);
        let before = |attrs: &[(u32, u64, f32, f32, f32)]| {
            attrs.iter().copied().filter(|a| a.0 < config.stride()).collect::<Vec<_>>()
        };

        assert_eq!(before(&attrs_one), before(&attrs_two));
        assert_ne!(attrs_one, attrs_two, "second segment should change depth >= 2");
    }

    #[test]
    fn test_pine_fans_narrower_than_oak() {
        let config = GeneratorConfig::default();
        let pine = generate(&config, &record(Species::Pine, Stage::Sapling, &["PIN-AB12"]));
        let oak = generate(&config, &record(Species::Oak, Stage::Sapling, &["PIN-AB12"]));

        let fan = |shape: &TreeShape| {
            let root = shape.root().unwrap();
            assert_eq!(root.children.len(), 2);
            (root.children[1].angle - root.children[0].angle).abs()
        };

        assert!(fan(&pine) < fan(&oak));
        assert_eq!(pine.max_depth, config.complexity(Stage::Sapling));
        assert_eq!(pine.max_node_depth(), Some(3));
    }

    #[test]
    fn test_wiring_shears_every_branch() {
        let config = GeneratorConfig { prune_threshold: 1.0, ..Default::default() };
        let rec = record(Species::Juniper, Stage::Adult, &["JUN-W1R3"]);
        let straight = node_attributes(&generate(&config, &rec));
        let wired = node_attributes(&generate(&config, &rec.clone().with_wiring(3)));

        assert_eq!(straight.len(), wired.len());
        for (s, w) in straight.iter().zip(&wired) {
            assert_eq!(s.1, w.1);
            assert!((w.4 - s.4 - 3.0 * config.wiring_shear).abs() < 1e-5);
            assert_eq!(s.2, w.2, "wiring must not change lengths");
        }
    }

    #[test]
    fn test_mesh_terminals_always_have_clusters() {
        let config = GeneratorConfig::for_style(GrowthStyle::Mesh);
        let shape = generate(&config, &record(Species::Maple, Stage::Adult, &["MAP-1111"]));
        shape.walk(&mut |n| {
            if n.depth == shape.max_depth {
                match &n.foliage {
                    Some(Foliage::Cluster(blobs)) => {
                        assert!((MIN_FOLIAGE_BLOBS..=MAX_FOLIAGE_BLOBS).contains(&blobs.len()));
                    }
                    other => panic!("expected a cluster, got {other:?}"),
                }
            } else {
                assert!(n.foliage.is_none());
            }
        });
    }

    #[test]
    fn test_canvas_leaves_follow_roll() {
        let config = GeneratorConfig::for_style(GrowthStyle::Canvas);
        let rec = record(Species::Pine, Stage::Adult, &["PIN-C4NV"]);
        let shape = generate(&config, &rec);
        let dna = DnaAccessor::new(rec.dna_history(), config.stride());

        let mut terminals = 0;
        shape.walk(&mut |n| {
            if n.depth == shape.max_depth {
                terminals += 1;
                let locus = Locus { depth: n.depth, branch: n.branch_id };
                let expected = dna.float_at(locus, offsets::LEAF_ROLL) > config.leaf_threshold;
                assert_eq!(n.foliage.is_some(), expected);
                if let Some(foliage) = &n.foliage {
                    assert_eq!(foliage, &Foliage::Glyph(LeafShape::Needle));
                }
            }
            assert!(n.children.len() <= 3);
            if n.depth == 0 {
                assert!(n.children.len() >= 2, "first-level branches are never pruned");
            }
        });
        assert!(terminals > 0);
    }

    #[test]
    fn test_single_tint_per_tree() {
        let config = GeneratorConfig::default();
        let rec = record(Species::Oak, Stage::Adult, &["OAK-T1NT"]);
        let shape = generate(&config, &rec);
        let dna = DnaAccessor::new(rec.dna_history(), config.stride());
        let roll = dna.float_at(Locus { depth: shape.max_depth, branch: 0 }, offsets::TINT);
        assert_eq!(shape.leaf_tint, leaf_tint(SpeciesTable::default().get(Species::Oak).leaf_color, roll));
    }

    #[test]
    fn test_empty_history_degrades_gracefully() {
        let config = GeneratorConfig::default();
        let shape = generate(&config, &record(Species::Pine, Stage::Adult, &[]));
        assert!(shape.node_count() >= 3);
    }

    #[test]
    fn test_generate_does_not_mutate_record() {
        let config = GeneratorConfig::default();
        let rec = record(Species::Maple, Stage::Master, &["MAP-0000", "EVO-111111-11"]);
        let before = rec.clone();
        let _ = generate(&config, &rec);
        assert_eq!(rec, before);
    }
}
