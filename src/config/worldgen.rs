use serde::{Deserialize, Serialize};

/// Knobs for world construction and procedural population. One seed drives
/// terrain noise and every placement draw, so equal configs always produce
/// equal worlds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGenConfig {
    pub seed: u64,
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,

    // Terrain layering
    pub base_height: i32,
    pub height_span: i32,
    /// Thickness of the dirt band between deep stone and the grass surface.
    pub soil_depth: i32,
    pub noise_frequency: f64,

    // Tree placement
    pub tree_spawn_chance: f64,
    pub tree_min_distance: i32,
    pub tree_margin: i32,
    pub trunk_height_min: i32,
    pub trunk_height_max: i32,

    // Flower placement
    pub flower_spawn_chance: f64,
    pub flower_min_distance: i32,
    pub flower_margin: i32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            size_x: 128,
            size_y: 32,
            size_z: 128,
            base_height: 8,
            height_span: 12,
            soil_depth: 3,
            noise_frequency: 0.015,
            tree_spawn_chance: 0.05,
            tree_min_distance: 5,
            tree_margin: 5,
            trunk_height_min: 4,
            trunk_height_max: 6,
            flower_spawn_chance: 0.10,
            flower_min_distance: 3,
            flower_margin: 4,
        }
    }
}
