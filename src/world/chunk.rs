use crate::physics::collision::{Aabb, ChunkCollider, PhysicsSpace};
use crate::world::chunk_coord::ChunkCoord;
use crate::world::mesh::{ChunkMesh, ChunkMeshSet};
use crate::world::palette::{BlockId, BlockPalette};
use glam::{IVec3, Vec2, Vec3};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// A fixed-size cube of block ids plus the derived mesh the chunk currently
/// owns. Cross-chunk effects (neighbor invalidation, cross-chunk face
/// culling) are mediated by `VoxelWorld`; a chunk never touches another
/// chunk's storage.
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    blocks: Vec<u8>,
    dirty: bool,
    mesh: Option<ChunkMeshSet>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![0; CHUNK_VOLUME],
            dirty: false,
            mesh: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    fn index(lx: usize, ly: usize, lz: usize) -> usize {
        lx + ly * CHUNK_SIZE + lz * CHUNK_SIZE * CHUNK_SIZE
    }

    /// Local coordinates must be in `[0, CHUNK_SIZE)`; the world guarantees
    /// this by reducing world coordinates before delegating.
    pub fn get(&self, lx: usize, ly: usize, lz: usize) -> BlockId {
        BlockId(self.blocks[Self::index(lx, ly, lz)])
    }

    /// Writes a block id and unconditionally marks the chunk dirty, even if
    /// the written value equals the previous one.
    pub fn set(&mut self, lx: usize, ly: usize, lz: usize, id: BlockId) {
        self.blocks[Self::index(lx, ly, lz)] = id.0;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn mesh(&self) -> Option<&ChunkMeshSet> {
        self.mesh.as_ref()
    }

    /// Installs a freshly built mesh set, dropping the previous one.
    pub fn attach_mesh(&mut self, mesh: ChunkMeshSet) {
        self.mesh = Some(mesh);
    }

    pub fn detach_mesh(&mut self) {
        self.mesh = None;
    }

    /// Builds one batched mesh per material bucket present in this chunk.
    /// `world_solid` answers solidity for arbitrary world cell coordinates
    /// so faces shared with neighbor chunks are culled without this chunk
    /// reading neighbor storage. Faces between two solid cells are never
    /// emitted; every externally visible face of a solid cell is.
    pub fn build_mesh(
        &self,
        palette: &BlockPalette,
        world_solid: impl Fn(i32, i32, i32) -> bool,
    ) -> ChunkMeshSet {
        let mut set = ChunkMeshSet::new();
        let origin = self.coord.world_origin(CHUNK_SIZE as i32);

        for lx in 0..CHUNK_SIZE {
            for ly in 0..CHUNK_SIZE {
                for lz in 0..CHUNK_SIZE {
                    let id = self.get(lx, ly, lz);
                    if id.is_air() || !palette.is_solid(id) {
                        continue;
                    }
                    let cell = origin + IVec3::new(lx as i32, ly as i32, lz as i32);
                    for face in 0..6 {
                        let neighbor = cell + FACE_NORMALS[face];
                        if world_solid(neighbor.x, neighbor.y, neighbor.z) {
                            continue;
                        }
                        emit_face(set.bucket_mut(id), cell, face);
                    }
                }
            }
        }

        set
    }

    /// Derives this chunk's collision representation and swaps it into the
    /// physics space, replacing whatever body the space held for this chunk.
    /// A missing space skips the update without failing.
    pub fn update_physics(&self, space: Option<&mut PhysicsSpace>, palette: &BlockPalette) {
        let Some(space) = space else {
            return;
        };
        match self.build_collider(palette) {
            Some(collider) => space.attach(self.coord, collider),
            None => space.detach(self.coord),
        }
    }

    /// Derives the static collision boxes covering this chunk's solid cells,
    /// merging vertical runs into column boxes. `None` when the chunk holds
    /// no solid cell.
    pub fn build_collider(&self, palette: &BlockPalette) -> Option<ChunkCollider> {
        let origin = self.coord.world_origin(CHUNK_SIZE as i32);
        let mut boxes = Vec::new();

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let mut run_start: Option<usize> = None;
                for ly in 0..=CHUNK_SIZE {
                    let solid = ly < CHUNK_SIZE && palette.is_solid(self.get(lx, ly, lz));
                    match (run_start, solid) {
                        (None, true) => run_start = Some(ly),
                        (Some(start), false) => {
                            let min = origin + IVec3::new(lx as i32, start as i32, lz as i32);
                            boxes.push(Aabb::new(
                                min.as_vec3(),
                                Vec3::new(
                                    min.x as f32 + 1.0,
                                    min.y as f32 + (ly - start) as f32,
                                    min.z as f32 + 1.0,
                                ),
                            ));
                            run_start = None;
                        }
                        _ => {}
                    }
                }
            }
        }

        if boxes.is_empty() {
            None
        } else {
            Some(ChunkCollider { boxes })
        }
    }
}

/// Outward normals in face order: front (+z), back (-z), top (+y),
/// bottom (-y), right (+x), left (-x).
const FACE_NORMALS: [IVec3; 6] = [
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
];

fn emit_face(mesh: &mut ChunkMesh, cell: IVec3, face: usize) {
    let p = cell.as_vec3();
    let positions = match face {
        // Front (+z)
        0 => [
            p + Vec3::new(0.0, 0.0, 1.0),
            p + Vec3::new(1.0, 0.0, 1.0),
            p + Vec3::new(1.0, 1.0, 1.0),
            p + Vec3::new(0.0, 1.0, 1.0),
        ],
        // Back (-z)
        1 => [
            p + Vec3::new(1.0, 0.0, 0.0),
            p + Vec3::new(0.0, 0.0, 0.0),
            p + Vec3::new(0.0, 1.0, 0.0),
            p + Vec3::new(1.0, 1.0, 0.0),
        ],
        // Top (+y)
        2 => [
            p + Vec3::new(0.0, 1.0, 1.0),
            p + Vec3::new(1.0, 1.0, 1.0),
            p + Vec3::new(1.0, 1.0, 0.0),
            p + Vec3::new(0.0, 1.0, 0.0),
        ],
        // Bottom (-y)
        3 => [
            p + Vec3::new(0.0, 0.0, 0.0),
            p + Vec3::new(1.0, 0.0, 0.0),
            p + Vec3::new(1.0, 0.0, 1.0),
            p + Vec3::new(0.0, 0.0, 1.0),
        ],
        // Right (+x)
        4 => [
            p + Vec3::new(1.0, 0.0, 1.0),
            p + Vec3::new(1.0, 0.0, 0.0),
            p + Vec3::new(1.0, 1.0, 0.0),
            p + Vec3::new(1.0, 1.0, 1.0),
        ],
        // Left (-x)
        _ => [
            p + Vec3::new(0.0, 0.0, 0.0),
            p + Vec3::new(0.0, 0.0, 1.0),
            p + Vec3::new(0.0, 1.0, 1.0),
            p + Vec3::new(0.0, 1.0, 0.0),
        ],
    };
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    mesh.add_face(&positions, FACE_NORMALS[face].as_vec3(), &uvs);
}
