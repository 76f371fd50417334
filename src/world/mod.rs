pub mod chunk;
pub mod chunk_coord;
pub mod core;
pub mod generator;
pub mod mesh;
pub mod palette;

// Re-export commonly used types
pub use chunk::{Chunk, CHUNK_SIZE, CHUNK_VOLUME};
pub use chunk_coord::ChunkCoord;
pub use core::VoxelWorld;
pub use generator::{Flower, FlowerGenerator, TerrainGenerator, Tree, TreeGenerator};
pub use mesh::{ChunkMesh, ChunkMeshSet};
pub use palette::{BlockId, BlockMaterial, BlockPalette, BlockType, PaletteError};
