//! 2D adapter: flattens the tree into line segments and leaf marks, and a
//! small software rasterizer for previews.
//!
//! Canvas space has y up with the origin at the centre of the pot rim. The
//! roll of each branch is dropped; only the bend angle survives, measured
//! clockwise from the parent's heading.

use image::{Rgba, RgbaImage};

use crate::core::types::Vec2;
use crate::dna::Stage;
use crate::generation::{BranchNode, Foliage, SeedSprout, TreeShape};
use crate::species::{Color, LeafShape, StageTable};
use super::sway::{sway_offset, Wind};
use super::RenderAdapter;

/// Glyph leaves are this fraction of their branch length in radius
const GLYPH_RADIUS_SCALE: f32 = 0.5;
/// Fraction of the image left empty around the tree
const MARGIN: f32 = 0.08;
const BACKGROUND: Rgba<u8> = Rgba([245, 240, 230, 255]);
const SOIL: Rgba<u8> = Rgba([70, 50, 35, 255]);

/// One flattened branch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2d {
    pub start: Vec2,
    pub end: Vec2,
    /// Stroke width at `start`
    pub width: f32,
    /// Stroke width at `end`
    pub end_width: f32,
    pub depth: u32,
    pub branch_id: u64,
    pub color: Color,
}

/// A leaf mark at a branch tip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafGlyph2d {
    pub center: Vec2,
    pub radius: f32,
    /// Heading of the branch it grows from, radians clockwise from +y
    pub heading: f32,
    /// `None` for a rounded cluster blob
    pub shape: Option<LeafShape>,
}

/// Output of the canvas adapter
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSkeleton {
    pub stage: Stage,
    /// Segments in pre-order, one per branch node
    pub segments: Vec<Segment2d>,
    pub leaves: Vec<LeafGlyph2d>,
    pub leaf_color: Color,
    pub bark_color: Color,
    pub sprout: Option<SeedSprout>,
}

/// Unit direction for a heading, clockwise from +y
fn direction(heading: f32) -> Vec2 {
    let (sin, cos) = heading.sin_cos();
    Vec2::new(sin, cos)
}

/// Flattens shapes to [`CanvasSkeleton`]s and rasterizes them
#[derive(Debug, Clone)]
pub struct CanvasAdapter<'a> {
    stages: &'a StageTable,
    wind: Option<Wind>,
}

impl<'a> CanvasAdapter<'a> {
    pub fn new(stages: &'a StageTable) -> Self {
        Self { stages, wind: None }
    }

    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = Some(wind);
        self
    }

    fn flatten(&self, shape: &TreeShape, node: &BranchNode, start: Vec2, parent_heading: f32, out: &mut CanvasSkeleton) {
        let sway = self.wind.map_or(0.0, |wind| sway_offset(&node.appearance, &wind));
        let heading = parent_heading + node.angle + sway;
        let dir = direction(heading);
        let end = start + dir * node.length;

        out.segments.push(Segment2d {
            start,
            end,
            width: node.start_radius * 2.0,
            end_width: node.end_radius * 2.0,
            depth: node.depth,
            branch_id: node.branch_id,
            color: shape.bark_color.scaled(1.0 + node.appearance.bark_shade),
        });

        match &node.foliage {
            Some(Foliage::Glyph(leaf)) => out.leaves.push(LeafGlyph2d {
                center: end,
                radius: node.length * GLYPH_RADIUS_SCALE,
                heading,
                shape: Some(*leaf),
            }),
            Some(Foliage::Cluster(blobs)) => {
                // Project each blob onto the branch plane: x across, y along
                let across = Vec2::new(dir.y, -dir.x);
                for blob in blobs {
                    out.leaves.push(LeafGlyph2d {
                        center: end + across * blob.offset[0] + dir * blob.offset[1],
                        radius: blob.radius,
                        heading,
                        shape: None,
                    });
                }
            }
            None => {}
        }

        for child in &node.children {
            self.flatten(shape, child, end, heading, out);
        }
    }

    /// Draw a skeleton into a `width` x `height` image, fitted to the frame
    pub fn rasterize(&self, skeleton: &CanvasSkeleton, width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
        let pot = self.stages.get(skeleton.stage);
        let viewport = Viewport::fit(skeleton, pot.container_width, pot.container_depth, width, height);

        // Pot, then a band of soil along the rim
        let half = pot.container_width * 0.5;
        let pot_color = to_rgba(pot.container_color);
        viewport.fill_rect(&mut image, Vec2::new(-half, -pot.container_depth), Vec2::new(half, 0.0), pot_color);
        let soil = pot.container_depth * 0.12;
        viewport.fill_rect(&mut image, Vec2::new(-half * 0.92, -soil), Vec2::new(half * 0.92, 0.0), SOIL);

        if let Some(sprout) = &skeleton.sprout {
            let tip = Vec2::new(0.0, sprout.height);
            let stem = to_rgba(skeleton.leaf_color.scaled(0.8));
            viewport.stroke(&mut image, Vec2::ZERO, tip, sprout.radius, sprout.radius * 0.6, stem);
            let leaf = to_rgba(skeleton.leaf_color);
            for side in [-1.0, 1.0] {
                let center = tip + Vec2::new(side * sprout.height * 0.15, -sprout.height * 0.05);
                viewport.fill_disc(&mut image, center, sprout.height * 0.12, leaf);
            }
        }

        for segment in &skeleton.segments {
            let color = to_rgba(segment.color);
            viewport.stroke(&mut image, segment.start, segment.end, segment.width * 0.5, segment.end_width * 0.5, color);
        }

        let leaf = to_rgba(skeleton.leaf_color);
        for glyph in &skeleton.leaves {
            match glyph.shape {
                Some(LeafShape::Needle) => {
                    // A short fan of needles around the heading
                    for spread in [-0.5, 0.0, 0.5] {
                        let tip = glyph.center + direction(glyph.heading + spread) * glyph.radius;
                        viewport.stroke(&mut image, glyph.center, tip, glyph.radius * 0.06, glyph.radius * 0.03, leaf);
                    }
                }
                Some(LeafShape::Scale) => {
                    let dir = direction(glyph.heading);
                    for step in 0..3 {
                        let center = glyph.center + dir * (glyph.radius * 0.4 * step as f32);
                        viewport.fill_disc(&mut image, center, glyph.radius * (0.5 - 0.1 * step as f32), leaf);
                    }
                }
                Some(LeafShape::Palmate) => {
                    for spread in [-0.7, 0.0, 0.7] {
                        let center = glyph.center + direction(glyph.heading + spread) * glyph.radius * 0.5;
                        viewport.fill_disc(&mut image, center, glyph.radius * 0.45, leaf);
                    }
                }
                Some(LeafShape::Lobed) | None => viewport.fill_disc(&mut image, glyph.center, glyph.radius, leaf),
            }
        }

        image
    }
}

impl RenderAdapter for CanvasAdapter<'_> {
    type Output = CanvasSkeleton;

    fn adapt(&self, shape: &TreeShape) -> CanvasSkeleton {
        let mut out = CanvasSkeleton {
            stage: shape.stage,
            segments: Vec::with_capacity(shape.node_count()),
            leaves: Vec::new(),
            leaf_color: shape.leaf_tint,
            bark_color: shape.bark_color,
            sprout: shape.sprout().copied(),
        };
        if let Some(root) = shape.root() {
            self.flatten(shape, root, Vec2::ZERO, 0.0, &mut out);
        }
        out
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Canvas space -> pixel space mapping
#[derive(Debug, Clone, Copy)]
struct Viewport {
    /// Canvas-space point mapped to the bottom-left of the drawing area
    origin: Vec2,
    /// Pixels per canvas unit
    scale: f32,
    /// Pixel offset that centres the drawing
    offset: Vec2,
    height: u32,
}

impl Viewport {
    fn fit(skeleton: &CanvasSkeleton, pot_width: f32, pot_depth: f32, width: u32, height: u32) -> Self {
        let mut min = Vec2::new(-pot_width * 0.5, -pot_depth);
        let mut max = Vec2::new(pot_width * 0.5, 0.0);
        let mut include = |p: Vec2, r: f32| {
            min = min.min(p - Vec2::splat(r));
            max = max.max(p + Vec2::splat(r));
        };
        for s in &skeleton.segments {
            include(s.start, s.width * 0.5);
            include(s.end, s.end_width * 0.5);
        }
        for leaf in &skeleton.leaves {
            include(leaf.center, leaf.radius);
        }
        if let Some(sprout) = &skeleton.sprout {
            include(Vec2::new(0.0, sprout.height), sprout.height * 0.3);
        }

        let area = Vec2::new(width as f32, height as f32) * (1.0 - 2.0 * MARGIN);
        let extent = (max - min).max(Vec2::splat(f32::EPSILON));
        let scale = (area.x / extent.x).min(area.y / extent.y);
        let used = extent * scale;
        let offset = Vec2::new(width as f32, height as f32) * MARGIN + (area - used) * 0.5;

        Self { origin: min, scale, offset, height }
    }

    fn to_pixel(&self, p: Vec2) -> Vec2 {
        let local = (p - self.origin) * self.scale + self.offset;
        Vec2::new(local.x, self.height as f32 - local.y)
    }

    fn fill_disc(&self, image: &mut RgbaImage, center: Vec2, radius: f32, color: Rgba<u8>) {
        let c = self.to_pixel(center);
        let r = (radius * self.scale).max(0.5);
        let (w, h) = image.dimensions();

        let x0 = (c.x - r).floor().max(0.0) as u32;
        let y0 = (c.y - r).floor().max(0.0) as u32;
        let x1 = ((c.x + r).ceil().max(0.0) as u32).min(w);
        let y1 = ((c.y + r).ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - c;
                if d.length_squared() <= r * r {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }

    fn fill_rect(&self, image: &mut RgbaImage, min: Vec2, max: Vec2, color: Rgba<u8>) {
        let a = self.to_pixel(min);
        let b = self.to_pixel(max);
        let (w, h) = image.dimensions();

        let x0 = a.x.min(b.x).round().max(0.0) as u32;
        let x1 = (a.x.max(b.x).round().max(0.0) as u32).min(w);
        let y0 = a.y.min(b.y).round().max(0.0) as u32;
        let y1 = (a.y.max(b.y).round().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, color);
            }
        }
    }

    /// Tapered stroke, stamped as discs half a pixel apart
    fn stroke(&self, image: &mut RgbaImage, start: Vec2, end: Vec2, start_radius: f32, end_radius: f32, color: Rgba<u8>) {
        let pixels = (end - start).length() * self.scale;
        let steps = (pixels * 2.0).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let radius = start_radius + (end_radius - start_radius) * t;
            self.fill_disc(image, start.lerp(end, t), radius, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::{GeneticRecord, Species};
    use crate::generation::{generate, GeneratorConfig, GrowthStyle};
    use crate::species::SpeciesTable;

    fn shape(style: GrowthStyle, species: Species, stage: Stage, dna: &str) -> TreeShape {
        let record = GeneticRecord::with_history(species, stage, vec![dna.to_string()]);
        generate(&record, &SpeciesTable::default(), &GeneratorConfig::for_style(style))
    }

    #[test]
    fn test_one_segment_per_node() {
        let stages = StageTable::default();
        let shape = shape(GrowthStyle::Canvas, Species::Maple, Stage::Adult, "MAP-C4NV");
        let skeleton = CanvasAdapter::new(&stages).adapt(&shape);
        assert_eq!(skeleton.segments.len(), shape.node_count());
        assert_eq!(skeleton.leaves.len(), shape.leaf_count());
    }

    #[test]
    fn test_segments_are_connected() {
        let stages = StageTable::default();
        let shape = shape(GrowthStyle::Canvas, Species::Oak, Stage::Adult, "OAK-R4ST");
        let skeleton = CanvasAdapter::new(&stages).adapt(&shape);

        assert_eq!(skeleton.segments[0].start, Vec2::ZERO);
        for seg in &skeleton.segments[1..] {
            let attached = skeleton
                .segments
                .iter()
                .any(|p| p.branch_id != seg.branch_id && p.end.distance(seg.start) < 1e-5);
            assert!(attached, "segment {} floats free", seg.branch_id);
        }
    }

    #[test]
    fn test_mesh_clusters_flatten_to_blobs() {
        let stages = StageTable::default();
        let shape = shape(GrowthStyle::Mesh, Species::Oak, Stage::Adult, "OAK-R4ST");
        let skeleton = CanvasAdapter::new(&stages).adapt(&shape);
        assert!(!skeleton.leaves.is_empty());
        assert!(skeleton.leaves.iter().all(|l| l.shape.is_none()));
    }

    #[test]
    fn test_sway_keeps_topology() {
        let stages = StageTable::default();
        let shape = shape(GrowthStyle::Canvas, Species::Maple, Stage::Adult, "MAP-C4NV");
        let calm = CanvasAdapter::new(&stages).adapt(&shape);
        let windy = CanvasAdapter::new(&stages).with_wind(Wind::new(1.0, 2.0)).adapt(&shape);

        let ids = |s: &CanvasSkeleton| s.segments.iter().map(|seg| seg.branch_id).collect::<Vec<_>>();
        assert_eq!(ids(&calm), ids(&windy));
        assert_eq!(calm.leaves.len(), windy.leaves.len());
        assert_ne!(calm.segments, windy.segments);
    }

    #[test]
    fn test_rasterize_draws_pot_and_tree() {
        let stages = StageTable::default();
        let adapter = CanvasAdapter::new(&stages);
        let skeleton = adapter.adapt(&shape(GrowthStyle::Canvas, Species::Maple, Stage::Adult, "MAP-C4NV"));
        let image = adapter.rasterize(&skeleton, 160, 200);
        assert_eq!(image.dimensions(), (160, 200));

        let pot = stages.get(Stage::Adult);
        let viewport = Viewport::fit(&skeleton, pot.container_width, pot.container_depth, 160, 200);
        let rim = viewport.to_pixel(Vec2::ZERO).y as u32;
        let drawn_above_rim = (0..rim)
            .flat_map(|y| (0..160).map(move |x| (x, y)))
            .filter(|&(x, y)| *image.get_pixel(x, y) != BACKGROUND)
            .count();
        assert!(drawn_above_rim > 100);
    }

    #[test]
    fn test_rasterize_seed() {
        let stages = StageTable::default();
        let adapter = CanvasAdapter::new(&stages);
        let skeleton = adapter.adapt(&shape(GrowthStyle::Canvas, Species::Pine, Stage::Seed, "PIN-533D"));
        assert!(skeleton.segments.is_empty());
        assert!(skeleton.sprout.is_some());

        let image = adapter.rasterize(&skeleton, 64, 64);
        let leaf = to_rgba(skeleton.leaf_color);
        assert!(image.pixels().any(|p| *p == leaf));

        let pot = stages.get(Stage::Seed);
        let viewport = Viewport::fit(&skeleton, pot.container_width, pot.container_depth, 64, 64);
        let inside_pot = viewport.to_pixel(Vec2::new(0.0, -pot.container_depth * 0.5));
        let pixel = image.get_pixel(inside_pot.x as u32, inside_pot.y as u32);
        assert_eq!(*pixel, to_rgba(pot.container_color));
    }

    #[test]
    fn test_viewport_keeps_everything_in_frame() {
        let stages = StageTable::default();
        let skeleton = CanvasAdapter::new(&stages)
            .adapt(&shape(GrowthStyle::Mesh, Species::Pine, Stage::Master, "PIN-B0ND"));
        let pot = stages.get(Stage::Master);
        let viewport = Viewport::fit(&skeleton, pot.container_width, pot.container_depth, 100, 120);
        for seg in &skeleton.segments {
            for p in [seg.start, seg.end] {
                let px = viewport.to_pixel(p);
                assert!((0.0..=100.0).contains(&px.x) && (0.0..=120.0).contains(&px.y), "{p:?} -> {px:?}");
            }
        }
    }
}
