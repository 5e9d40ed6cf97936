//! Generator configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::dna::Stage;

/// Hard cap on recursion depth regardless of configuration. Canvas
/// fans can triple per level, so 9 levels already allows ~30k nodes.
pub const MAX_COMPLEXITY: u32 = 9;

/// Structural variant and leaf policy.
///
/// The two styles are independent, internally consistent rule sets. They
/// are not meant to agree with each other node-for-node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GrowthStyle {
    /// Full 3D hierarchy: 2-way splits, depth stride 2, a foliage cluster on
    /// every terminal branch.
    #[default]
    Mesh,
    /// Flattened 2D skeleton: DNA-derived 2-3 way fans, depth stride 10,
    /// terminal leaves only when the leaf roll passes.
    Canvas,
}

impl GrowthStyle {
    pub fn from_name(name: &str) -> Option<GrowthStyle> {
        match name.to_ascii_lowercase().as_str() {
            "mesh" | "3d" => Some(GrowthStyle::Mesh),
            "canvas" | "2d" => Some(GrowthStyle::Canvas),
            _ => None,
        }
    }

    /// Depth-to-segment divisor
    pub fn stride(self) -> u32 {
        match self {
            GrowthStyle::Mesh => 2,
            GrowthStyle::Canvas => 10,
        }
    }

    /// Maximum recursion depth per stage, indexed by `Stage::index()`
    pub fn depth_table(self) -> [u32; 4] {
        match self {
            GrowthStyle::Mesh => [0, 3, 5, 7],
            GrowthStyle::Canvas => [0, 4, 7, 9],
        }
    }
}

/// Configuration for the structural generator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub style: GrowthStyle,
    /// Trunk length before the species growth coefficient is applied
    pub trunk_length: f32,
    /// Trunk base radius at the Adult stage
    pub trunk_radius: f32,
    /// Nodes deeper than 1 are dropped when their prune roll exceeds this
    pub prune_threshold: f32,
    /// Radians of shear added to every branch per wiring step
    pub wiring_shear: f32,
    /// Half-angle of a Mesh 2-way split before species spread
    pub split_angle: f32,
    /// Full width of a Canvas fan before species spread
    pub fan_angle: f32,
    /// Total range of the per-branch angle jitter
    pub angle_jitter: f32,
    /// Canvas leaf roll must exceed this to place a leaf
    pub leaf_threshold: f32,
    /// Mesh foliage blob radius as a fraction of trunk length
    pub leaf_size: f32,
    /// Maximum sway amplitude (radians) at the branch tips
    pub sway_amplitude: f32,
    /// Overrides the style's depth stride
    pub stride: Option<u32>,
    /// Overrides the style's per-stage depth table
    pub depth_table: Option<[u32; 4]>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            style: GrowthStyle::Mesh,
            trunk_length: 1.0,
            trunk_radius: 0.12,
            prune_threshold: 0.85,
            wiring_shear: 0.2,
            split_angle: 0.6,
            fan_angle: 1.2,
            angle_jitter: 0.3,
            leaf_threshold: 0.4,
            leaf_size: 0.18,
            sway_amplitude: 0.06,
            stride: None,
            depth_table: None,
        }
    }
}

impl GeneratorConfig {
    /// Default configuration for a style
    pub fn for_style(style: GrowthStyle) -> Self {
        Self { style, ..Default::default() }
    }

    pub fn stride(&self) -> u32 {
        self.stride.unwrap_or_else(|| self.style.stride()).max(1)
    }

    /// Maximum recursion depth for a stage ("complexity")
    pub fn complexity(&self, stage: Stage) -> u32 {
        let table = self.depth_table.unwrap_or_else(|| self.style.depth_table());
        table[stage.index()].min(MAX_COMPLEXITY)
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded generator config from {} ({:?} style)", path.display(), config.style);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.trunk_length > 0.0) || !(self.trunk_radius > 0.0) {
            return Err(Error::Config("trunk length and radius must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.prune_threshold) {
            return Err(Error::Config(format!(
                "prune_threshold {} outside 0..=1",
                self.prune_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.leaf_threshold) {
            return Err(Error::Config(format!(
                "leaf_threshold {} outside 0..=1",
                self.leaf_threshold
            )));
        }
        if self.stride == Some(0) {
            return Err(Error::Config("stride must be at least 1".to_string()));
        }
        if let Some(table) = self.depth_table {
            if table[0] != 0 {
                return Err(Error::Config("the Seed stage must have depth 0".to_string()));
            }
            if table.windows(2).any(|w| w[0] > w[1]) {
                return Err(Error::Config(format!("depth table {table:?} decreases with stage")));
            }
            if table.iter().any(|&d| d > MAX_COMPLEXITY) {
                return Err(Error::Config(format!(
                    "depth table {table:?} exceeds the maximum depth {MAX_COMPLEXITY}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
        assert!(GeneratorConfig::for_style(GrowthStyle::Canvas).validate().is_ok());
    }

    #[test]
    fn test_complexity_tables() {
        let mesh = GeneratorConfig::for_style(GrowthStyle::Mesh);
        let canvas = GeneratorConfig::for_style(GrowthStyle::Canvas);
        assert_eq!(mesh.complexity(Stage::Seed), 0);
        assert_eq!(mesh.complexity(Stage::Sapling), 3);
        assert_eq!(mesh.complexity(Stage::Master), 7);
        assert_eq!(canvas.complexity(Stage::Sapling), 4);
        assert_eq!(canvas.complexity(Stage::Master), 9);
        assert_eq!(mesh.stride(), 2);
        assert_eq!(canvas.stride(), 10);
    }

    #[test]
    fn test_overrides() {
        let config = GeneratorConfig {
            stride: Some(3),
            depth_table: Some([0, 2, 4, 6]),
            ..Default::default()
        };
        assert_eq!(config.stride(), 3);
        assert_eq!(config.complexity(Stage::Adult), 4);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = GeneratorConfig::from_json_str(r#"{ "style": "Canvas", "trunk_length": 2.0 }"#).unwrap();
        assert_eq!(config.style, GrowthStyle::Canvas);
        assert_eq!(config.trunk_length, 2.0);
        assert_eq!(config.prune_threshold, 0.85);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(GeneratorConfig::from_json_str(r#"{ "trunk_length": 0.0 }"#).is_err());
        assert!(GeneratorConfig::from_json_str(r#"{ "stride": 0 }"#).is_err());
        assert!(GeneratorConfig::from_json_str(r#"{ "depth_table": [1, 3, 5, 7] }"#).is_err());
        assert!(GeneratorConfig::from_json_str(r#"{ "depth_table": [0, 5, 3, 7] }"#).is_err());
        assert!(GeneratorConfig::from_json_str(r#"{ "depth_table": [0, 5, 9, 40] }"#).is_err());
        assert!(GeneratorConfig::from_json_str(r#"{ "prune_threshold": 1.5 }"#).is_err());
    }

    #[test]
    fn test_depth_capped_at_nine() {
        assert!(GeneratorConfig::from_json_str(r#"{ "depth_table": [0, 4, 7, 9] }"#).is_ok());
        assert!(GeneratorConfig::from_json_str(r#"{ "depth_table": [0, 4, 7, 10] }"#).is_err());
        assert!(GrowthStyle::Canvas.depth_table().iter().all(|&d| d <= MAX_COMPLEXITY));

        // Unvalidated overrides are still clamped
        let config = GeneratorConfig { depth_table: Some([0, 5, 9, 12]), ..Default::default() };
        assert_eq!(config.complexity(Stage::Master), 9);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        std::fs::write(&path, r#"{ "style": "Mesh", "wiring_shear": 0.25 }"#).unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.wiring_shear, 0.25);
    }
}
