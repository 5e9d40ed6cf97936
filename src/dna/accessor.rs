//! DNA accessor: maps a position in the branch tree to a hash-derived float
//!
//! Deeper recursion levels read from later DNA segments: depth `d` uses
//! `history[(d / stride) % len]`. Each decision at a node is keyed by
//! `(segment, depth, branch, offset)`, where `branch` is the node's lineage
//! id and `offset` a per-decision constant from [`offsets`].

use std::fmt::Write;

use super::hash::{self, StreamHasher};

/// Segment used if a history is ever empty
pub const DEFAULT_SEGMENT: &str = "SEED";

/// Maximum children per node that lineage ids can encode
pub const LINEAGE_FAN: u64 = 4;

/// Per-decision hash offsets. Kept apart so two decisions at the same node
/// never read the same value.
pub mod offsets {
    /// Canvas-style branch count
    pub const FAN: u64 = 2;
    /// Seed sprout scale
    pub const SEED_SCALE: u64 = 7;
    /// Foliage cluster blobs use `FOLIAGE..FOLIAGE + 3 * MAX_BLOBS`
    pub const FOLIAGE: u64 = 10;
    pub const SWAY_PHASE: u64 = 50;
    pub const SWAY_AMPLITUDE: u64 = 51;
    pub const BARK: u64 = 60;
    /// Canvas-style leaf presence roll
    pub const LEAF_ROLL: u64 = 99;
    pub const LENGTH: u64 = 100;
    pub const ANGLE: u64 = 200;
    /// Pruning survival; the record's pruning count is added to it
    pub const PRUNE: u64 = 300;
    /// Per-tree leaf tint, read at the root lineage
    pub const TINT: u64 = 999;
}

/// Position of a node in the branch tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locus {
    pub depth: u32,
    /// Lineage id: 0 for the trunk, `parent * LINEAGE_FAN + index + 1` below
    pub branch: u64,
}

impl Locus {
    pub const ROOT: Locus = Locus { depth: 0, branch: 0 };

    /// Locus of this node's `index`-th child
    pub fn child(self, index: usize) -> Locus {
        Locus {
            depth: self.depth + 1,
            branch: self.branch * LINEAGE_FAN + index as u64 + 1,
        }
    }
}

/// Select the DNA segment for a recursion depth
pub fn segment_for(history: &[String], depth: u32, stride: u32) -> &str {
    if history.is_empty() {
        return DEFAULT_SEGMENT;
    }
    let index = (depth / stride.max(1)) as usize % history.len();
    &history[index]
}

/// Borrowed view of a DNA history with a fixed depth stride
#[derive(Debug, Clone, Copy)]
pub struct DnaAccessor<'a> {
    history: &'a [String],
    stride: u32,
}

impl<'a> DnaAccessor<'a> {
    pub fn new(history: &'a [String], stride: u32) -> Self {
        Self { history, stride: stride.max(1) }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn segment_for(&self, depth: u32) -> &'a str {
        segment_for(self.history, depth, self.stride)
    }

    /// Text key hashed for a decision at `locus`
    pub fn key(&self, locus: Locus, offset: u64) -> String {
        format!("{}{}:{}:{}", self.segment_for(locus.depth), locus.depth, locus.branch, offset)
    }

    /// Hash of `key(locus, offset)`, streamed without allocating
    pub fn hash_at(&self, locus: Locus, offset: u64) -> u64 {
        let mut hasher = StreamHasher::new();
        // StreamHasher::write_str never fails
        let _ = write!(
            hasher,
            "{}{}:{}:{}",
            self.segment_for(locus.depth),
            locus.depth,
            locus.branch,
            offset
        );
        hasher.finish()
    }

    /// Float in `[0, 1)` for a decision at `locus`
    pub fn float_at(&self, locus: Locus, offset: u64) -> f32 {
        hash::unit_float(self.hash_at(locus, offset))
    }
}
