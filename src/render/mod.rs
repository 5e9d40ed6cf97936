//! Render adapters: translate a generated `TreeShape` into something a
//! 2D canvas or a 3D scene can draw.
//!
//! Adapters never decide structure. Both walk the same nodes in the same
//! pre-order and emit exactly one segment or part per branch node.

pub mod sway;
pub mod canvas;
pub mod mesh;

pub use sway::{sway_offset, Wind};
pub use canvas::{CanvasAdapter, CanvasSkeleton, LeafGlyph2d, Segment2d};
pub use mesh::{BranchInstance, FoliageInstance, MeshAdapter, MeshHierarchy, MeshPart};

use crate::generation::TreeShape;

/// Consumes a tree shape and produces a drawable representation
pub trait RenderAdapter {
    type Output;

    fn adapt(&self, shape: &TreeShape) -> Self::Output;
}
