use crate::physics::PhysicsSpace;
use crate::utils::ray::{Hit, Ray};
use crate::world::chunk::{Chunk, CHUNK_SIZE};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::palette::{BlockId, BlockPalette};
use glam::{IVec3, Vec3};
use log::debug;

/// Baseline Y level used when a spawn column holds no solid block.
const GROUND_HEIGHT: i32 = 8;

/// A bounded, in-memory voxel world: a dense 3D grid of chunks plus the
/// palette giving ids their behavior. All world-coordinate operations are
/// total: out-of-bounds reads are air, out-of-bounds writes are dropped.
pub struct VoxelWorld {
    size_x: i32,
    size_y: i32,
    size_z: i32,
    chunk_count_x: i32,
    chunk_count_y: i32,
    chunk_count_z: i32,
    chunks: Vec<Chunk>,
    palette: BlockPalette,
}

impl VoxelWorld {
    pub fn new(size_x: i32, size_y: i32, size_z: i32) -> Self {
        Self::with_palette(size_x, size_y, size_z, BlockPalette::default_palette())
    }

    pub fn with_palette(size_x: i32, size_y: i32, size_z: i32, palette: BlockPalette) -> Self {
        let n = CHUNK_SIZE as i32;
        let chunk_count_x = (size_x + n - 1) / n;
        let chunk_count_y = (size_y + n - 1) / n;
        let chunk_count_z = (size_z + n - 1) / n;

        let mut chunks = Vec::with_capacity(
            (chunk_count_x * chunk_count_y * chunk_count_z).max(0) as usize,
        );
        for cz in 0..chunk_count_z {
            for cy in 0..chunk_count_y {
                for cx in 0..chunk_count_x {
                    chunks.push(Chunk::new(ChunkCoord::new(cx, cy, cz)));
                }
            }
        }

        Self {
            size_x,
            size_y,
            size_z,
            chunk_count_x,
            chunk_count_y,
            chunk_count_z,
            chunks,
            palette,
        }
    }

    pub fn size(&self) -> IVec3 {
        IVec3::new(self.size_x, self.size_y, self.size_z)
    }

    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }

    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && y >= 0 && z >= 0 && x < self.size_x && y < self.size_y && z < self.size_z
    }

    fn chunk_index(&self, cx: i32, cy: i32, cz: i32) -> usize {
        (cx + cy * self.chunk_count_x + cz * self.chunk_count_x * self.chunk_count_y) as usize
    }

    /// Arena index of the chunk owning an in-bounds world cell.
    fn cell_chunk_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        let n = CHUNK_SIZE as i32;
        Some(self.chunk_index(x / n, y / n, z / n))
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        if coord.x() < 0
            || coord.y() < 0
            || coord.z() < 0
            || coord.x() >= self.chunk_count_x
            || coord.y() >= self.chunk_count_y
            || coord.z() >= self.chunk_count_z
        {
            return None;
        }
        Some(&self.chunks[self.chunk_index(coord.x(), coord.y(), coord.z())])
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        match self.cell_chunk_index(x, y, z) {
            Some(idx) => {
                let n = CHUNK_SIZE as i32;
                self.chunks[idx].get((x % n) as usize, (y % n) as usize, (z % n) as usize)
            }
            None => BlockId::AIR,
        }
    }

    /// Writes a block and marks the owning chunk dirty. When the cell sits
    /// on a chunk boundary face the face-adjacent neighbor chunk is marked
    /// dirty as well: a change at a shared face can flip which faces the
    /// neighbor must render. Out-of-bounds writes are dropped.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        let Some(idx) = self.cell_chunk_index(x, y, z) else {
            return;
        };
        let n = CHUNK_SIZE as i32;
        let (lx, ly, lz) = (x % n, y % n, z % n);
        self.chunks[idx].set(lx as usize, ly as usize, lz as usize, id);

        if lx == 0 {
            self.mark_chunk_dirty_at(x - 1, y, z);
        }
        if lx == n - 1 {
            self.mark_chunk_dirty_at(x + 1, y, z);
        }
        if ly == 0 {
            self.mark_chunk_dirty_at(x, y - 1, z);
        }
        if ly == n - 1 {
            self.mark_chunk_dirty_at(x, y + 1, z);
        }
        if lz == 0 {
            self.mark_chunk_dirty_at(x, y, z - 1);
        }
        if lz == n - 1 {
            self.mark_chunk_dirty_at(x, y, z + 1);
        }
    }

    fn mark_chunk_dirty_at(&mut self, x: i32, y: i32, z: i32) {
        if let Some(idx) = self.cell_chunk_index(x, y, z) {
            self.chunks[idx].mark_dirty();
        }
    }

    /// Clears the target cell to air. Returns whether the coordinate was in
    /// bounds; breaking an already-empty cell still counts as a success.
    pub fn break_at(&mut self, x: i32, y: i32, z: i32) -> bool {
        if !self.in_bounds(x, y, z) {
            return false;
        }
        self.set_block(x, y, z, BlockId::AIR);
        true
    }

    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.palette.is_solid(self.get_block(x, y, z))
    }

    /// Movement-speed multiplier of the block at the given cell; air (and
    /// anything out of bounds) leaves movement unmodified.
    pub fn speed_modifier_at(&self, x: i32, y: i32, z: i32) -> f32 {
        self.palette.get(self.get_block(x, y, z)).speed_modifier
    }

    /// Highest y whose block is solid in the given column, or `None` when
    /// the column is out of bounds or all air.
    pub fn get_top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        if x < 0 || z < 0 || x >= self.size_x || z >= self.size_z {
            return None;
        }
        (0..self.size_y).rev().find(|&y| self.is_solid(x, y, z))
    }

    /// Spawn point above the top solid block of the center column.
    pub fn recommended_spawn(&self) -> Vec3 {
        let cx = self.size_x / 2;
        let cz = self.size_z / 2;
        let ty = self.get_top_solid_y(cx, cz).unwrap_or(GROUND_HEIGHT);
        Vec3::new(cx as f32 + 0.5, ty as f32 + 3.0, cz as f32 + 0.5)
    }

    /// Full rebuild: every chunk's mesh is discarded and rebuilt regardless
    /// of dirty state. Used once after initial generation.
    pub fn build_meshes(&mut self) {
        for chunk in &mut self.chunks {
            chunk.detach_mesh();
        }
        for idx in 0..self.chunks.len() {
            let mesh = {
                let chunk = &self.chunks[idx];
                chunk.build_mesh(&self.palette, |x, y, z| self.is_solid(x, y, z))
            };
            self.chunks[idx].attach_mesh(mesh);
        }
        debug!("full mesh build over {} chunks", self.chunks.len());
    }

    /// Full physics pass: derives and attaches every chunk's collider. A
    /// missing space skips the pass without failing.
    pub fn build_physics(&self, mut space: Option<&mut PhysicsSpace>) {
        for chunk in &self.chunks {
            chunk.update_physics(space.as_deref_mut(), &self.palette);
        }
        if let Some(space) = space {
            debug!("full physics build: {} bodies", space.body_count());
        }
    }

    /// Incremental per-frame pass: rebuilds mesh and physics for dirty
    /// chunks only, then clears their flags. Idempotent: a second call
    /// with no intervening mutation rebuilds nothing. Returns the number of
    /// chunks rebuilt.
    pub fn rebuild_dirty_chunks(&mut self, mut space: Option<&mut PhysicsSpace>) -> usize {
        let mut rebuilt = 0;
        for idx in 0..self.chunks.len() {
            if !self.chunks[idx].is_dirty() {
                continue;
            }
            let mesh = {
                let chunk = &self.chunks[idx];
                chunk.build_mesh(&self.palette, |x, y, z| self.is_solid(x, y, z))
            };
            self.chunks[idx].update_physics(space.as_deref_mut(), &self.palette);
            self.chunks[idx].attach_mesh(mesh);
            self.chunks[idx].clear_dirty();
            rebuilt += 1;
        }
        if rebuilt > 0 {
            debug!("rebuilt {rebuilt} dirty chunks");
        }
        rebuilt
    }

    /// Resets every dirty flag without rebuilding. Called once after the
    /// initial full build so the first incremental pass starts clean.
    pub fn clear_all_dirty_flags(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear_dirty();
        }
    }

    /// Steps the ray through the grid (Amanatides–Woo traversal), visiting
    /// cells in distance order, and returns the first solid cell within
    /// `max_distance`. Out-of-bounds cells are skipped but still consume
    /// distance. An origin already inside a solid in-bounds cell reports
    /// that cell at distance zero with no directional normal.
    pub fn pick_first_solid(&self, ray: &Ray, max_distance: f32) -> Option<Hit> {
        let origin = ray.origin;
        let dir = ray.direction;
        if !dir.is_finite() {
            return None;
        }

        let mut x = origin.x.floor() as i32;
        let mut y = origin.y.floor() as i32;
        let mut z = origin.z.floor() as i32;

        if self.in_bounds(x, y, z) && self.is_solid(x, y, z) {
            return Some(Hit {
                cell: IVec3::new(x, y, z),
                normal: IVec3::ZERO,
                distance: 0.0,
            });
        }

        let step_x: i32 = if dir.x > 0.0 { 1 } else { -1 };
        let step_y: i32 = if dir.y > 0.0 { 1 } else { -1 };
        let step_z: i32 = if dir.z > 0.0 { 1 } else { -1 };

        let next_boundary_x = (x + step_x.max(0)) as f32;
        let next_boundary_y = (y + step_y.max(0)) as f32;
        let next_boundary_z = (z + step_z.max(0)) as f32;

        // An axis with zero direction never crosses a boundary.
        let mut t_max_x = if dir.x != 0.0 {
            (next_boundary_x - origin.x) / dir.x
        } else {
            f32::INFINITY
        };
        let mut t_max_y = if dir.y != 0.0 {
            (next_boundary_y - origin.y) / dir.y
        } else {
            f32::INFINITY
        };
        let mut t_max_z = if dir.z != 0.0 {
            (next_boundary_z - origin.z) / dir.z
        } else {
            f32::INFINITY
        };

        let t_delta_x = if dir.x != 0.0 {
            step_x as f32 / dir.x
        } else {
            f32::INFINITY
        };
        let t_delta_y = if dir.y != 0.0 {
            step_y as f32 / dir.y
        } else {
            f32::INFINITY
        };
        let t_delta_z = if dir.z != 0.0 {
            step_z as f32 / dir.z
        } else {
            f32::INFINITY
        };

        let mut t = 0.0_f32;
        let mut normal = IVec3::ZERO;

        while t <= max_distance {
            // Advance the axis whose next boundary is closest; the fixed
            // comparison order keeps hits reproducible on edges and corners.
            if t_max_x < t_max_y {
                if t_max_x < t_max_z {
                    x += step_x;
                    t = t_max_x;
                    t_max_x += t_delta_x;
                    normal = IVec3::new(-step_x, 0, 0);
                } else {
                    z += step_z;
                    t = t_max_z;
                    t_max_z += t_delta_z;
                    normal = IVec3::new(0, 0, -step_z);
                }
            } else if t_max_y < t_max_z {
                y += step_y;
                t = t_max_y;
                t_max_y += t_delta_y;
                normal = IVec3::new(0, -step_y, 0);
            } else {
                z += step_z;
                t = t_max_z;
                t_max_z += t_delta_z;
                normal = IVec3::new(0, 0, -step_z);
            }

            if t > max_distance {
                break;
            }
            if !self.in_bounds(x, y, z) {
                continue;
            }
            if self.is_solid(x, y, z) {
                return Some(Hit {
                    cell: IVec3::new(x, y, z),
                    normal,
                    distance: t,
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::CHUNK_SIZE;

    fn small_world() -> VoxelWorld {
        VoxelWorld::new(8, 8, 8)
    }

    fn two_by_two_world() -> VoxelWorld {
        VoxelWorld::new(32, 32, 32)
    }

    #[test]
    fn set_then_get_round_trips_in_bounds() {
        let mut world = small_world();
        world.set_block(4, 4, 4, BlockId::STONE);
        assert_eq!(world.get_block(4, 4, 4), BlockId::STONE);
    }

    #[test]
    fn out_of_bounds_reads_air_and_writes_are_dropped() {
        let mut world = small_world();
        world.set_block(3, 3, 3, BlockId::DIRT);
        for (x, y, z) in [(-1, 0, 0), (0, -5, 0), (8, 0, 0), (0, 0, 100), (i32::MAX, 0, 0)] {
            assert_eq!(world.get_block(x, y, z), BlockId::AIR);
            world.set_block(x, y, z, BlockId::STONE);
        }
        assert_eq!(world.get_block(3, 3, 3), BlockId::DIRT);
    }

    #[test]
    fn break_at_reports_bounds_and_clears_cell() {
        let mut world = small_world();
        world.set_block(2, 2, 2, BlockId::STONE);
        assert!(world.break_at(2, 2, 2));
        assert_eq!(world.get_block(2, 2, 2), BlockId::AIR);
        // Breaking air in bounds still succeeds.
        assert!(world.break_at(1, 1, 1));
        assert!(!world.break_at(-1, 0, 0));
    }

    #[test]
    fn boundary_write_marks_face_neighbor_dirty() {
        let mut world = two_by_two_world();
        let n = CHUNK_SIZE as i32;
        world.set_block(n - 1, 5, 5, BlockId::STONE);

        assert!(world.chunk(ChunkCoord::new(0, 0, 0)).unwrap().is_dirty());
        assert!(world.chunk(ChunkCoord::new(1, 0, 0)).unwrap().is_dirty());
        assert!(!world.chunk(ChunkCoord::new(0, 1, 0)).unwrap().is_dirty());
        assert!(!world.chunk(ChunkCoord::new(0, 0, 1)).unwrap().is_dirty());
        assert!(!world.chunk(ChunkCoord::new(1, 1, 0)).unwrap().is_dirty());
    }

    #[test]
    fn interior_write_marks_no_neighbor_dirty() {
        let mut world = two_by_two_world();
        world.set_block(5, 5, 5, BlockId::STONE);

        assert!(world.chunk(ChunkCoord::new(0, 0, 0)).unwrap().is_dirty());
        for coord in [
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, 1, 0),
            ChunkCoord::new(0, 0, 1),
        ] {
            assert!(!world.chunk(coord).unwrap().is_dirty());
        }
    }

    #[test]
    fn boundary_write_at_world_edge_does_not_panic() {
        let mut world = two_by_two_world();
        world.set_block(0, 0, 0, BlockId::STONE);
        world.set_block(31, 31, 31, BlockId::STONE);
        assert!(world.chunk(ChunkCoord::new(0, 0, 0)).unwrap().is_dirty());
        assert!(world.chunk(ChunkCoord::new(1, 1, 1)).unwrap().is_dirty());
    }

    #[test]
    fn rebuild_dirty_chunks_is_idempotent() {
        let mut world = two_by_two_world();
        let mut space = PhysicsSpace::new();
        world.set_block(5, 5, 5, BlockId::STONE);

        let first = world.rebuild_dirty_chunks(Some(&mut space));
        assert!(first > 0);
        assert_eq!(world.rebuild_dirty_chunks(Some(&mut space)), 0);
    }

    #[test]
    fn rebuild_reconciles_physics_bodies() {
        let mut world = small_world();
        let mut space = PhysicsSpace::new();
        world.set_block(4, 4, 4, BlockId::STONE);
        world.rebuild_dirty_chunks(Some(&mut space));
        assert_eq!(space.body_count(), 1);

        world.break_at(4, 4, 4);
        world.rebuild_dirty_chunks(Some(&mut space));
        // The chunk went all-air, so its body is retracted.
        assert_eq!(space.body_count(), 0);
    }

    #[test]
    fn rebuild_without_physics_space_still_rebuilds_meshes() {
        let mut world = small_world();
        world.set_block(4, 4, 4, BlockId::STONE);
        assert_eq!(world.rebuild_dirty_chunks(None), 1);
        let chunk = world.chunk(ChunkCoord::new(0, 0, 0)).unwrap();
        assert!(chunk.mesh().is_some());
    }

    #[test]
    fn clear_all_dirty_flags_skips_rebuild_work() {
        let mut world = small_world();
        world.set_block(1, 1, 1, BlockId::STONE);
        world.clear_all_dirty_flags();
        assert_eq!(world.rebuild_dirty_chunks(None), 0);
    }

    #[test]
    fn full_mesh_build_covers_clean_chunks() {
        let mut world = two_by_two_world();
        world.set_block(5, 5, 5, BlockId::STONE);
        world.clear_all_dirty_flags();
        world.build_meshes();
        for cz in 0..2 {
            for cy in 0..2 {
                for cx in 0..2 {
                    let chunk = world.chunk(ChunkCoord::new(cx, cy, cz)).unwrap();
                    assert!(chunk.mesh().is_some());
                }
            }
        }
    }

    #[test]
    fn cross_chunk_faces_are_culled() {
        let mut world = two_by_two_world();
        let n = CHUNK_SIZE as i32;
        // Two solid cells facing each other across the x chunk boundary.
        world.set_block(n - 1, 5, 5, BlockId::STONE);
        world.set_block(n, 5, 5, BlockId::STONE);
        world.build_meshes();

        let left = world.chunk(ChunkCoord::new(0, 0, 0)).unwrap().mesh().unwrap();
        let right = world.chunk(ChunkCoord::new(1, 0, 0)).unwrap().mesh().unwrap();
        assert_eq!(left.face_count(), 5);
        assert_eq!(right.face_count(), 5);
    }

    #[test]
    fn top_solid_scan_finds_highest_block() {
        let mut world = small_world();
        world.set_block(3, 2, 3, BlockId::STONE);
        world.set_block(3, 6, 3, BlockId::GRASS);
        assert_eq!(world.get_top_solid_y(3, 3), Some(6));
        assert_eq!(world.get_top_solid_y(0, 0), None);
        assert_eq!(world.get_top_solid_y(-1, 3), None);
        assert_eq!(world.get_top_solid_y(3, 99), None);
    }

    #[test]
    fn speed_modifier_comes_from_palette() {
        let mut world = small_world();
        world.set_block(1, 1, 1, BlockId::SAND);
        assert_eq!(world.speed_modifier_at(1, 1, 1), 0.4);
        assert_eq!(world.speed_modifier_at(0, 0, 0), 1.0);
        assert_eq!(world.speed_modifier_at(-5, 0, 0), 1.0);
    }

    #[test]
    fn pick_hits_single_block_scenario() {
        let mut world = small_world();
        world.set_block(4, 4, 4, BlockId::STONE);

        let ray = Ray::new(Vec3::new(4.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = world.pick_first_solid(&ray, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(4, 4, 4));
        assert_eq!(hit.normal, IVec3::new(0, 0, -1));
        assert!((hit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn pick_origin_inside_solid_is_degenerate_hit() {
        let mut world = small_world();
        world.set_block(2, 2, 2, BlockId::STONE);
        let ray = Ray::new(Vec3::new(2.5, 2.5, 2.5), Vec3::new(1.0, 0.0, 0.0));
        let hit = world.pick_first_solid(&ray, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(2, 2, 2));
        assert_eq!(hit.normal, IVec3::ZERO);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn pick_misses_when_max_distance_too_short() {
        let mut world = small_world();
        world.set_block(4, 4, 6, BlockId::STONE);
        let ray = Ray::new(Vec3::new(4.5, 4.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(world.pick_first_solid(&ray, 5.0).is_none());
        assert!(world.pick_first_solid(&ray, 10.0).is_some());
    }

    #[test]
    fn pick_through_empty_world_returns_none() {
        let world = small_world();
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert!(world.pick_first_solid(&ray, 100.0).is_none());
    }

    #[test]
    fn pick_skips_out_of_bounds_cells() {
        let mut world = small_world();
        world.set_block(4, 4, 4, BlockId::STONE);
        // Origin outside the world, pointing in through the cells above it.
        let ray = Ray::new(Vec3::new(4.5, 4.5, -3.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = world.pick_first_solid(&ray, 20.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(4, 4, 4));
        assert_eq!(hit.normal, IVec3::new(0, 0, -1));
    }

    #[test]
    fn pick_reports_negated_step_as_normal() {
        let mut world = small_world();
        world.set_block(2, 4, 4, BlockId::STONE);
        // Approach from +x, so the struck face points back along +x.
        let ray = Ray::new(Vec3::new(6.5, 4.5, 4.5), Vec3::new(-1.0, 0.0, 0.0));
        let hit = world.pick_first_solid(&ray, 10.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(2, 4, 4));
        assert_eq!(hit.normal, IVec3::new(1, 0, 0));
    }

    #[test]
    fn recommended_spawn_sits_above_terrain() {
        let mut world = small_world();
        world.set_block(4, 3, 4, BlockId::GRASS);
        let spawn = world.recommended_spawn();
        assert_eq!(spawn, Vec3::new(4.5, 6.0, 4.5));
    }
}
