pub mod config;
pub mod engine;
pub mod physics;
pub mod utils;
pub mod world;

pub use config::WorldGenConfig;
pub use engine::VoxelEngine;
pub use physics::{Aabb, ChunkCollider, PhysicsSpace};
pub use utils::{Hit, Ray};
pub use world::{BlockId, BlockPalette, Chunk, ChunkCoord, VoxelWorld, CHUNK_SIZE};
