use crate::config::WorldGenConfig;
use crate::world::core::VoxelWorld;
use crate::world::palette::BlockId;
use log::info;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Fills a fresh world with layered columns: deep stone, a dirt band, and a
/// single grass surface cell, with heights driven by seeded coherent noise.
/// The same seed and extents always produce the same block contents.
pub struct TerrainGenerator {
    noise: Fbm<Perlin>,
    base_height: i32,
    height_span: i32,
    soil_depth: i32,
}

impl TerrainGenerator {
    pub fn new(config: &WorldGenConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed as u32)
            .set_octaves(4)
            .set_frequency(config.noise_frequency)
            .set_persistence(0.5)
            .set_lacunarity(2.0);

        Self {
            noise,
            base_height: config.base_height,
            height_span: config.height_span,
            soil_depth: config.soil_depth,
        }
    }

    pub fn generate(&self, world: &mut VoxelWorld) {
        let size = world.size();
        for x in 0..size.x {
            for z in 0..size.z {
                let height = self.column_height(x, z, size.y);
                let soil_start = (height - self.soil_depth).max(0);
                for y in 0..soil_start {
                    world.set_block(x, y, z, BlockId::STONE);
                }
                for y in soil_start..height {
                    world.set_block(x, y, z, BlockId::DIRT);
                }
                world.set_block(x, height, z, BlockId::GRASS);
            }
        }
        info!("terrain generated over {}x{} columns", size.x, size.z);
    }

    /// Surface height for a column, mapped into `[1, size_y - 2]` so every
    /// column keeps at least one air cell above it.
    fn column_height(&self, x: i32, z: i32, size_y: i32) -> i32 {
        let sample = self.noise.get([x as f64, z as f64]);
        let normalized = (sample + 1.0) * 0.5;
        let height = self.base_height + (normalized * self.height_span as f64) as i32;
        height.clamp(1, size_y - 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(seed: u64) -> WorldGenConfig {
        WorldGenConfig {
            seed,
            size_x: 48,
            size_y: 32,
            size_z: 48,
            ..WorldGenConfig::default()
        }
    }

    fn generated_world(seed: u64) -> VoxelWorld {
        let config = test_config(seed);
        let mut world = VoxelWorld::new(config.size_x, config.size_y, config.size_z);
        TerrainGenerator::new(&config).generate(&mut world);
        world
    }

    #[test]
    fn columns_are_layered_stone_dirt_grass() {
        let world = generated_world(7);
        let size = world.size();
        for x in 0..size.x {
            for z in 0..size.z {
                let top = world.get_top_solid_y(x, z).unwrap();
                assert_eq!(world.get_block(x, top, z), BlockId::GRASS);
                if top >= 1 {
                    assert_eq!(world.get_block(x, top - 1, z), BlockId::DIRT);
                }
                if top >= 4 {
                    assert_eq!(world.get_block(x, 0, z), BlockId::STONE);
                }
                // At least one air cell above every column.
                assert_eq!(world.get_block(x, size.y - 1, z), BlockId::AIR);
            }
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generated_world(42);
        let b = generated_world(42);
        let size = a.size();
        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    assert_eq!(a.get_block(x, y, z), b.get_block(x, y, z));
                }
            }
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generated_world(1);
        let b = generated_world(2);
        let size = a.size();
        let mut differs = false;
        'outer: for x in 0..size.x {
            for z in 0..size.z {
                if a.get_top_solid_y(x, z) != b.get_top_solid_y(x, z) {
                    differs = true;
                    break 'outer;
                }
            }
        }
        assert!(differs);
    }

    #[test]
    fn heights_stay_inside_vertical_range() {
        let config = test_config(3);
        let generator = TerrainGenerator::new(&config);
        for x in 0..config.size_x {
            for z in 0..config.size_z {
                let h = generator.column_height(x, z, config.size_y);
                assert!(h >= 1 && h <= config.size_y - 2);
            }
        }
    }
}
