use crate::world::palette::BlockId;
use glam::{Vec2, Vec3};
use std::collections::HashMap;

/// CPU-side mesh buffers for one material bucket of a chunk. The renderer
/// collaborator uploads these; the core only batches and replaces them.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
    pub vertex_count: usize,
    pub index_count: usize,
}

impl ChunkMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one quad face (two triangles).
    pub fn add_face(&mut self, positions: &[Vec3; 4], normal: Vec3, uvs: &[Vec2; 4]) {
        let base_index = self.vertex_count as u32;

        for (pos, uv) in positions.iter().zip(uvs) {
            self.vertices.extend(&[pos.x, pos.y, pos.z]);
            self.normals.extend(&[normal.x, normal.y, normal.z]);
            self.uvs.extend(&[uv.x, uv.y]);
            self.vertex_count += 1;
        }

        self.indices.extend(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index + 2,
            base_index + 3,
            base_index,
        ]);
        self.index_count += 6;
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn face_count(&self) -> usize {
        self.vertex_count / 4
    }
}

/// All mesh buckets for one chunk, keyed by block id so each distinct
/// palette material renders as a single batched surface. Replaced wholesale
/// on every rebuild.
#[derive(Debug, Clone, Default)]
pub struct ChunkMeshSet {
    pub buckets: HashMap<BlockId, ChunkMesh>,
}

impl ChunkMeshSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_mut(&mut self, id: BlockId) -> &mut ChunkMesh {
        self.buckets.entry(id).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|mesh| mesh.is_empty())
    }

    pub fn face_count(&self) -> usize {
        self.buckets.values().map(|mesh| mesh.face_count()).sum()
    }
}
