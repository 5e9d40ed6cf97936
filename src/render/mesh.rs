//! 3D adapter: branch nodes -> a transform hierarchy of tapered cylinders.
//!
//! Each branch lives in its own local frame with +Y along the branch. A
//! child frame sits at the parent's tip, rolled around the parent's axis
//! and then bent away from it.

use bytemuck::{Pod, Zeroable};

use crate::core::types::{Mat4, Quat, Vec3};
use crate::generation::{BranchNode, Foliage, SeedSprout, TreeShape};
use crate::math::Aabb;
use crate::species::Color;
use super::sway::{sway_offset, Wind};
use super::RenderAdapter;

/// Glyph foliage is drawn as a sphere this fraction of the branch length
const GLYPH_RADIUS_SCALE: f32 = 0.5;

/// One branch cylinder in the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    /// Index of the parent part; `None` for the trunk
    pub parent: Option<usize>,
    pub branch_id: u64,
    pub depth: u32,
    /// Transform relative to the parent's frame
    pub local: Mat4,
    /// Accumulated transform from the pot rim
    pub world: Mat4,
    pub length: f32,
    pub start_radius: f32,
    pub end_radius: f32,
    pub color: Color,
}

impl MeshPart {
    /// World-space base of the branch
    pub fn start(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }

    /// World-space tip of the branch
    pub fn end(&self) -> Vec3 {
        self.world.transform_point3(Vec3::new(0.0, self.length, 0.0))
    }
}

/// A foliage sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageInstance {
    /// Index of the part it hangs from
    pub part: usize,
    pub center: Vec3,
    pub radius: f32,
    pub color: Color,
}

/// Output of the mesh adapter
#[derive(Debug, Clone, PartialEq)]
pub struct MeshHierarchy {
    /// Parts in pre-order; a parent always precedes its children
    pub parts: Vec<MeshPart>,
    pub foliage: Vec<FoliageInstance>,
    /// Set instead of `parts` at the Seed stage
    pub sprout: Option<SeedSprout>,
    pub bounds: Aabb,
}

/// Per-branch instance data for GPU upload
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BranchInstance {
    /// World transform, column-major (64 bytes, offset 0)
    pub model: [[f32; 4]; 4],
    /// Linear RGBA bark color (16 bytes, offset 64)
    pub color: [f32; 4],
    /// Base and tip radius (8 bytes, offset 80)
    pub radii: [f32; 2],
    /// Branch length along local +Y (4 bytes, offset 88)
    pub length: f32,
    /// Recursion depth as float for shader LOD (4 bytes, offset 92)
    pub depth: f32,
}

impl MeshHierarchy {
    /// Flatten the parts into an instance buffer
    pub fn instances(&self) -> Vec<BranchInstance> {
        self.parts
            .iter()
            .map(|part| {
                let [r, g, b] = part.color.to_f32();
                BranchInstance {
                    model: part.world.to_cols_array_2d(),
                    color: [r, g, b, 1.0],
                    radii: [part.start_radius, part.end_radius],
                    length: part.length,
                    depth: part.depth as f32,
                }
            })
            .collect()
    }

    /// Raw bytes of [`instances`](Self::instances), ready for a vertex buffer
    pub fn instance_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.instances()).to_vec()
    }
}

/// Builds a [`MeshHierarchy`] from a tree shape
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshAdapter {
    wind: Option<Wind>,
}

impl MeshAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer wind sway on top of the static structure
    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = Some(wind);
        self
    }

    fn bend(&self, node: &BranchNode) -> f32 {
        node.angle + self.wind.map_or(0.0, |wind| sway_offset(&node.appearance, &wind))
    }

    fn add_part(
        &self,
        shape: &TreeShape,
        node: &BranchNode,
        parent: Option<(usize, Mat4, f32)>,
        out: &mut MeshHierarchy,
    ) {
        let (parent_index, parent_world, parent_length) = match parent {
            Some((index, world, length)) => (Some(index), world, length),
            None => (None, Mat4::IDENTITY, 0.0),
        };

        let rotation = Quat::from_rotation_y(node.roll) * Quat::from_rotation_z(-self.bend(node));
        let local = Mat4::from_rotation_translation(rotation, Vec3::new(0.0, parent_length, 0.0));
        let world = parent_world * local;

        let index = out.parts.len();
        let part = MeshPart {
            parent: parent_index,
            branch_id: node.branch_id,
            depth: node.depth,
            local,
            world,
            length: node.length,
            start_radius: node.start_radius,
            end_radius: node.end_radius,
            color: shape.bark_color.scaled(1.0 + node.appearance.bark_shade),
        };
        out.bounds.expand_sphere(part.start(), part.start_radius);
        out.bounds.expand_sphere(part.end(), part.end_radius);
        out.parts.push(part);

        match &node.foliage {
            Some(Foliage::Cluster(blobs)) => {
                for blob in blobs {
                    let [x, y, z] = blob.offset;
                    let center = world.transform_point3(Vec3::new(x, node.length + y, z));
                    out.bounds.expand_sphere(center, blob.radius);
                    out.foliage.push(FoliageInstance {
                        part: index,
                        center,
                        radius: blob.radius,
                        color: shape.leaf_tint,
                    });
                }
            }
            Some(Foliage::Glyph(_)) => {
                let center = world.transform_point3(Vec3::new(0.0, node.length, 0.0));
                let radius = node.length * GLYPH_RADIUS_SCALE;
                out.bounds.expand_sphere(center, radius);
                out.foliage.push(FoliageInstance { part: index, center, radius, color: shape.leaf_tint });
            }
            None => {}
        }

        for child in &node.children {
            self.add_part(shape, child, Some((index, world, node.length)), out);
        }
    }
}

impl RenderAdapter for MeshAdapter {
    type Output = MeshHierarchy;

    fn adapt(&self, shape: &TreeShape) -> MeshHierarchy {
        let mut out = MeshHierarchy {
            parts: Vec::with_capacity(shape.node_count()),
            foliage: Vec::new(),
            sprout: shape.sprout().copied(),
            bounds: Aabb::EMPTY,
        };

        if let Some(sprout) = &out.sprout {
            out.bounds.expand_sphere(Vec3::ZERO, sprout.radius);
            out.bounds.expand_sphere(Vec3::new(0.0, sprout.height, 0.0), sprout.radius);
        }
        if let Some(root) = shape.root() {
            self.add_part(shape, root, None, &mut out);
        }

        log::trace!(
            "Mesh hierarchy: {} parts, {} foliage instances",
            out.parts.len(),
            out.foliage.len()
        );
        out
    }
}
