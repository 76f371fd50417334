use crate::config::WorldGenConfig;
use crate::physics::PhysicsSpace;
use crate::utils::ray::{Hit, Ray};
use crate::world::core::VoxelWorld;
use crate::world::generator::{Flower, FlowerGenerator, TerrainGenerator, TreeGenerator};
use log::info;

/// Owns the world, its physics space, and the decorative entities, and
/// drives the frame cycle: apply the frame's mutations first, then run one
/// incremental rebuild pass so every edit made so far is reflected.
pub struct VoxelEngine {
    world: VoxelWorld,
    physics: PhysicsSpace,
    flowers: Vec<Flower>,
    tree_count: usize,
}

impl VoxelEngine {
    /// Builds a fully populated world: terrain, trees, flowers, then the
    /// initial full mesh/physics build. Dirty flags are cleared afterwards
    /// so the first frame's incremental pass starts with nothing to do.
    pub fn new(config: &WorldGenConfig) -> Self {
        let mut world = VoxelWorld::new(config.size_x, config.size_y, config.size_z);

        TerrainGenerator::new(config).generate(&mut world);
        let mut trees = TreeGenerator::new(config);
        let tree_count = trees.generate(&mut world);
        let mut flower_generator = FlowerGenerator::new(config);
        flower_generator.generate(&world);
        let flowers = flower_generator.into_flowers();

        let mut physics = PhysicsSpace::new();
        world.build_meshes();
        world.build_physics(Some(&mut physics));
        world.clear_all_dirty_flags();

        info!(
            "world ready: {} chunks, {} trees, {} flowers, {} physics bodies",
            world.chunk_count(),
            tree_count,
            flowers.len(),
            physics.body_count()
        );

        Self {
            world,
            physics,
            flowers,
            tree_count,
        }
    }

    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut VoxelWorld {
        &mut self.world
    }

    pub fn physics(&self) -> &PhysicsSpace {
        &self.physics
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn flower_count(&self) -> usize {
        self.flowers.len()
    }

    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    /// Picks the first solid block along the ray and breaks it. Returns the
    /// hit so callers can react to what was struck; the rebuild happens on
    /// the next `update` call.
    pub fn break_at_ray(&mut self, ray: &Ray, max_distance: f32) -> Option<Hit> {
        let hit = self.world.pick_first_solid(ray, max_distance)?;
        self.world.break_at(hit.cell.x, hit.cell.y, hit.cell.z);
        Some(hit)
    }

    /// Per-frame rebuild pass. Call after all of the frame's mutations.
    /// Returns the number of chunks rebuilt.
    pub fn update(&mut self) -> usize {
        self.world.rebuild_dirty_chunks(Some(&mut self.physics))
    }
}
