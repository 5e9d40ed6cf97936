//! Generator output: an owned tree of branch nodes.
//!
//! A `TreeShape` is rebuilt from the genetic record on every evaluation and
//! never persisted. Each node is owned by its parent, so the structure is a
//! strict tree with no back-references.

use serde::{Deserialize, Serialize};

use crate::dna::{Species, Stage};
use crate::species::{Color, LeafShape};
use super::config::GrowthStyle;

/// Per-node appearance, precomputed so render-time animation never
/// touches structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Bark brightness offset, roughly -0.1..0.1
    pub bark_shade: f32,
    /// Wind sway phase in radians
    pub sway_phase: f32,
    /// Wind sway amplitude in radians; grows toward the tips
    pub sway_amplitude: f32,
}

/// One sphere of a foliage cluster, relative to the branch tip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafBlob {
    /// Offset in branch-local space (y along the branch)
    pub offset: [f32; 3],
    pub radius: f32,
}

/// Foliage attached to a terminal branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Foliage {
    /// Mesh style: a small cluster of rounded shapes
    Cluster(Vec<LeafBlob>),
    /// Canvas style: one leaf glyph of the species' shape
    Glyph(LeafShape),
}

/// A branch segment and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    /// 0 for the trunk
    pub depth: u32,
    /// Lineage id, unique within one tree
    pub branch_id: u64,
    pub length: f32,
    pub start_radius: f32,
    pub end_radius: f32,
    /// Bend away from the parent's direction, radians
    pub angle: f32,
    /// Rotation of the bending plane around the parent's axis, radians
    pub roll: f32,
    pub appearance: Appearance,
    pub foliage: Option<Foliage>,
    pub children: Vec<BranchNode>,
}

impl BranchNode {
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BranchNode::node_count).sum::<usize>()
    }

    /// Deepest node depth in this subtree
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(BranchNode::max_depth)
            .max()
            .unwrap_or(self.depth)
    }

    /// Pre-order traversal
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a BranchNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Pre-order traversal with the parent of each node
    pub fn walk_with_parent<'a>(&'a self, visit: &mut impl FnMut(Option<&'a BranchNode>, &'a BranchNode)) {
        fn go<'a>(
            parent: Option<&'a BranchNode>,
            node: &'a BranchNode,
            visit: &mut impl FnMut(Option<&'a BranchNode>, &'a BranchNode),
        ) {
            visit(parent, node);
            for child in &node.children {
                go(Some(node), child, visit);
            }
        }
        go(None, self, visit);
    }
}

/// Fixed sprout drawn at the Seed stage instead of a branch tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedSprout {
    pub height: f32,
    pub radius: f32,
    /// DNA-derived scale already folded into height and radius
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeBody {
    Seed(SeedSprout),
    Branches(BranchNode),
}

/// Result of one generator evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeShape {
    pub species: Species,
    pub stage: Stage,
    pub style: GrowthStyle,
    /// Complexity the tree was grown with
    pub max_depth: u32,
    /// Species leaf color with the per-tree hue/lightness offset applied
    pub leaf_tint: Color,
    pub bark_color: Color,
    pub body: TreeBody,
}

impl TreeShape {
    pub fn root(&self) -> Option<&BranchNode> {
        match &self.body {
            TreeBody::Branches(root) => Some(root),
            TreeBody::Seed(_) => None,
        }
    }

    pub fn sprout(&self) -> Option<&SeedSprout> {
        match &self.body {
            TreeBody::Seed(sprout) => Some(sprout),
            TreeBody::Branches(_) => None,
        }
    }

    /// Number of branch nodes; zero for a seed
    pub fn node_count(&self) -> usize {
        self.root().map_or(0, BranchNode::node_count)
    }

    /// Deepest branch depth actually grown; `None` for a seed
    pub fn max_node_depth(&self) -> Option<u32> {
        self.root().map(BranchNode::max_depth)
    }

    /// Terminal nodes that carry foliage
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node| {
            if node.foliage.is_some() {
                count += 1;
            }
        });
        count
    }

    /// Pre-order traversal of every branch node (none for a seed)
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a BranchNode)) {
        if let Some(root) = self.root() {
            root.walk(visit);
        }
    }
}
