use crate::world::chunk_coord::ChunkCoord;
use glam::Vec3;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }
}

/// Static collision shape derived from one chunk's solid cells.
#[derive(Debug, Clone, Default)]
pub struct ChunkCollider {
    pub boxes: Vec<Aabb>,
}

/// Boundary stand-in for an engine physics space: holds one static body per
/// chunk. Attach replaces any body already present for the coordinate and
/// detach of an absent body is a no-op, so callers never have to track
/// whether a chunk was registered before.
#[derive(Debug, Default)]
pub struct PhysicsSpace {
    bodies: HashMap<ChunkCoord, ChunkCollider>,
}

impl PhysicsSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, coord: ChunkCoord, collider: ChunkCollider) {
        self.bodies.insert(coord, collider);
    }

    pub fn detach(&mut self, coord: ChunkCoord) {
        self.bodies.remove(&coord);
    }

    pub fn body(&self, coord: ChunkCoord) -> Option<&ChunkCollider> {
        self.bodies.get(&coord)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collision_boxes(&self) -> impl Iterator<Item = &Aabb> {
        self.bodies.values().flat_map(|body| body.boxes.iter())
    }
}
