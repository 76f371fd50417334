use crate::config::WorldGenConfig;
use crate::world::core::VoxelWorld;
use crate::world::palette::BlockId;
use glam::IVec3;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A decorative world entity. Flowers live outside the voxel grid: they are
/// rendered and interacted with as standalone objects and never mutate
/// block storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flower {
    name: String,
    position: IVec3,
    wilted: bool,
}

impl Flower {
    pub fn new(name: &str, x: i32, y: i32, z: i32) -> Self {
        Self {
            name: name.to_string(),
            position: IVec3::new(x, y, z),
            wilted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> IVec3 {
        self.position
    }

    /// Picking a flower wilts it.
    pub fn pick(&mut self) {
        self.wilted = true;
    }

    pub fn is_wilted(&self) -> bool {
        self.wilted
    }
}

/// Same acceptance structure as tree placement (grass surface, exclusion
/// radius, probability draw, edge margin), but accepted candidates are
/// recorded as `Flower` entities instead of block writes; the world is
/// only ever read.
pub struct FlowerGenerator {
    rng: ChaCha12Rng,
    spawn_chance: f64,
    min_distance: i32,
    margin: i32,
    planted: Vec<Flower>,
}

impl FlowerGenerator {
    pub fn new(config: &WorldGenConfig) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(2)),
            spawn_chance: config.flower_spawn_chance,
            min_distance: config.flower_min_distance,
            margin: config.flower_margin,
            planted: Vec::new(),
        }
    }

    /// Scans the world and records accepted flowers. Returns the number
    /// planted.
    pub fn generate(&mut self, world: &VoxelWorld) -> usize {
        let size = world.size();

        for x in self.margin..size.x - self.margin {
            for z in self.margin..size.z - self.margin {
                let Some(ground) = ground_y(world, x, z) else {
                    continue;
                };
                if world.get_block(x, ground, z) != BlockId::GRASS {
                    continue;
                }
                if ground + 2 >= size.y {
                    continue;
                }
                if self.has_nearby_flower(x, z) {
                    continue;
                }
                if !self.rng.gen_bool(self.spawn_chance) {
                    continue;
                }

                let name = format!("rose {}", self.planted.len());
                let flower = Flower::new(&name, x, ground, z);
                debug!("flower planted at ({x}, {ground}, {z})");
                self.planted.push(flower);
            }
        }

        info!("flowers planted: {}", self.planted.len());
        self.planted.len()
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.planted
    }

    pub fn flower_count(&self) -> usize {
        self.planted.len()
    }

    pub fn into_flowers(self) -> Vec<Flower> {
        self.planted
    }

    fn has_nearby_flower(&self, x: i32, z: i32) -> bool {
        self.planted.iter().any(|flower| {
            let dx = (flower.position.x - x) as f64;
            let dz = (flower.position.z - z) as f64;
            (dx * dx + dz * dz).sqrt() < self.min_distance as f64
        })
    }
}

/// Topmost solid ground cell of a column, looking through tree canopies:
/// wood and leaves don't count as ground, so flowers can sit under trees.
fn ground_y(world: &VoxelWorld, x: i32, z: i32) -> Option<i32> {
    let size_y = world.size().y;
    (0..size_y).rev().find(|&y| {
        let id = world.get_block(x, y, z);
        world.palette().is_solid(id) && id != BlockId::WOOD && id != BlockId::LEAVES
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grassy_world(size: i32) -> VoxelWorld {
        let mut world = VoxelWorld::new(size, 32, size);
        for x in 0..size {
            for z in 0..size {
                world.set_block(x, 0, z, BlockId::STONE);
                world.set_block(x, 1, z, BlockId::GRASS);
            }
        }
        world
    }

    fn eager_config(seed: u64) -> WorldGenConfig {
        WorldGenConfig {
            seed,
            flower_spawn_chance: 1.0,
            ..WorldGenConfig::default()
        }
    }

    #[test]
    fn flowers_keep_minimum_distance() {
        let world = grassy_world(40);
        let mut generator = FlowerGenerator::new(&eager_config(31));
        let count = generator.generate(&world);
        assert!(count > 1);

        let flowers = generator.flowers();
        for (i, a) in flowers.iter().enumerate() {
            for b in &flowers[i + 1..] {
                let dx = (a.position().x - b.position().x) as f64;
                let dz = (a.position().z - b.position().z) as f64;
                assert!((dx * dx + dz * dz).sqrt() >= generator.min_distance as f64);
            }
        }
    }

    #[test]
    fn flowers_sit_on_grass_inside_the_margin() {
        let world = grassy_world(40);
        let config = eager_config(33);
        let mut generator = FlowerGenerator::new(&config);
        generator.generate(&world);

        for flower in generator.flowers() {
            let pos = flower.position();
            assert_eq!(world.get_block(pos.x, pos.y, pos.z), BlockId::GRASS);
            assert!(pos.x >= config.flower_margin && pos.x < 40 - config.flower_margin);
            assert!(pos.z >= config.flower_margin && pos.z < 40 - config.flower_margin);
        }
    }

    #[test]
    fn ground_scan_looks_through_canopies() {
        let mut world = grassy_world(16);
        // A canopy hanging over the column must not hide the grass below.
        world.set_block(8, 6, 8, BlockId::LEAVES);
        world.set_block(8, 5, 8, BlockId::WOOD);
        assert_eq!(ground_y(&world, 8, 8), Some(1));
    }

    #[test]
    fn no_flowers_on_bare_stone() {
        let mut world = VoxelWorld::new(32, 32, 32);
        for x in 0..32 {
            for z in 0..32 {
                world.set_block(x, 0, z, BlockId::STONE);
            }
        }
        let mut generator = FlowerGenerator::new(&eager_config(35));
        assert_eq!(generator.generate(&world), 0);
    }

    #[test]
    fn same_seed_plants_identical_flowers() {
        let world = grassy_world(40);
        let mut gen_a = FlowerGenerator::new(&eager_config(37));
        let mut gen_b = FlowerGenerator::new(&eager_config(37));
        gen_a.generate(&world);
        gen_b.generate(&world);
        assert_eq!(gen_a.flowers(), gen_b.flowers());
    }

    #[test]
    fn picking_wilts_a_flower() {
        let mut flower = Flower::new("rose 0", 1, 2, 3);
        assert!(!flower.is_wilted());
        flower.pick();
        assert!(flower.is_wilted());
        assert_eq!(flower.position(), IVec3::new(1, 2, 3));
        assert_eq!(flower.name(), "rose 0");
    }
}
