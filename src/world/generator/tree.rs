use crate::config::WorldGenConfig;
use crate::world::core::VoxelWorld;
use crate::world::palette::BlockId;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Canopy layers relative to the trunk top: three radius-2 layers ending at
/// the top, then a single radius-1 cap above it.
const CANOPY_LAYERS: [(i32, i32); 4] = [(-2, 2), (-1, 2), (0, 2), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tree {
    pub x: i32,
    pub base_y: i32,
    pub z: i32,
    pub trunk_height: i32,
}

/// Scans grass columns and plants trunk-plus-canopy trees, keeping a
/// minimum horizontal distance between any two trees. Placement draws come
/// from a seeded stream so generation is reproducible.
pub struct TreeGenerator {
    rng: ChaCha12Rng,
    spawn_chance: f64,
    min_distance: i32,
    margin: i32,
    trunk_height_min: i32,
    trunk_height_max: i32,
    planted: Vec<Tree>,
}

impl TreeGenerator {
    pub fn new(config: &WorldGenConfig) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(1)),
            spawn_chance: config.tree_spawn_chance,
            min_distance: config.tree_min_distance,
            margin: config.tree_margin,
            trunk_height_min: config.trunk_height_min,
            trunk_height_max: config.trunk_height_max,
            planted: Vec::new(),
        }
    }

    /// Plants trees across the world and returns how many were placed.
    pub fn generate(&mut self, world: &mut VoxelWorld) -> usize {
        let size = world.size();

        for x in self.margin..size.x - self.margin {
            for z in self.margin..size.z - self.margin {
                let Some(top) = world.get_top_solid_y(x, z) else {
                    continue;
                };
                if world.get_block(x, top, z) != BlockId::GRASS {
                    continue;
                }
                // Conservative headroom: trunk plus canopy cap must fit even
                // at the tallest trunk draw.
                if top + self.trunk_height_max + 2 > size.y {
                    continue;
                }
                if self.has_nearby_tree(x, z) {
                    continue;
                }
                if !self.rng.gen_bool(self.spawn_chance) {
                    continue;
                }

                let trunk_height = self
                    .rng
                    .gen_range(self.trunk_height_min..=self.trunk_height_max);
                self.plant(world, x, top, z, trunk_height);
                self.planted.push(Tree {
                    x,
                    base_y: top,
                    z,
                    trunk_height,
                });
                debug!("tree planted at ({x}, {top}, {z}), trunk {trunk_height}");
            }
        }

        info!("trees planted: {}", self.planted.len());
        self.planted.len()
    }

    pub fn planted(&self) -> &[Tree] {
        &self.planted
    }

    pub fn tree_count(&self) -> usize {
        self.planted.len()
    }

    fn has_nearby_tree(&self, x: i32, z: i32) -> bool {
        self.planted.iter().any(|tree| {
            let dx = (tree.x - x) as f64;
            let dz = (tree.z - z) as f64;
            (dx * dx + dz * dz).sqrt() < self.min_distance as f64
        })
    }

    fn plant(&self, world: &mut VoxelWorld, x: i32, base_y: i32, z: i32, trunk_height: i32) {
        for i in 1..=trunk_height {
            world.set_block(x, base_y + i, z, BlockId::WOOD);
        }
        let trunk_top = base_y + trunk_height;
        for (offset, radius) in CANOPY_LAYERS {
            place_leaves_layer(world, x, trunk_top + offset, z, radius);
        }
    }
}

/// One circular canopy layer: fills air cells within the radius cutoff,
/// never touching trunk cells or anything outside the world.
fn place_leaves_layer(world: &mut VoxelWorld, center_x: i32, y: i32, center_z: i32, radius: i32) {
    if y < 0 || y >= world.size().y {
        return;
    }
    for lx in center_x - radius..=center_x + radius {
        for lz in center_z - radius..=center_z + radius {
            if !world.in_bounds(lx, y, lz) {
                continue;
            }
            if world.get_block(lx, y, lz) != BlockId::AIR {
                continue;
            }
            let dx = (lx - center_x) as f64;
            let dz = (lz - center_z) as f64;
            if (dx * dx + dz * dz).sqrt() <= radius as f64 - 0.5 {
                world.set_block(lx, y, lz, BlockId::LEAVES);
            }
        }
    }
}
