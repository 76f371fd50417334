use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier space is a single byte; id 0 is always air.
pub const MAX_BLOCK_TYPES: usize = 256;

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("block palette exhausted (more than {MAX_BLOCK_TYPES} registered types)")]
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u8);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const WOOD: BlockId = BlockId(3);
    pub const SAND: BlockId = BlockId(4);
    pub const LEAVES: BlockId = BlockId(5);
    pub const GRASS: BlockId = BlockId(6);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Render hint attached to a block type. The renderer collaborator turns one
/// of these into a drawable surface; equal materials must produce visually
/// consistent, cacheable surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMaterial {
    pub albedo: [f32; 4],
    pub texture: Option<String>,
    pub shininess: f32,
}

impl BlockMaterial {
    pub fn colored(albedo: [f32; 4]) -> Self {
        Self {
            albedo,
            texture: None,
            shininess: 10.0,
        }
    }

    pub fn textured(texture: &str) -> Self {
        Self {
            albedo: [1.0, 1.0, 1.0, 1.0],
            texture: Some(texture.to_string()),
            shininess: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockType {
    pub name: String,
    pub solid: bool,
    /// Movement-speed multiplier for characters standing on this block.
    /// 1.0 leaves movement unmodified.
    pub speed_modifier: f32,
    pub material: BlockMaterial,
}

impl BlockType {
    pub fn new(name: &str, material: BlockMaterial) -> Self {
        Self {
            name: name.to_string(),
            solid: true,
            speed_modifier: 1.0,
            material,
        }
    }

    pub fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            speed_modifier: 1.0,
            material: BlockMaterial::colored([0.0, 0.0, 0.0, 0.0]),
        }
    }

    pub fn with_speed_modifier(mut self, speed_modifier: f32) -> Self {
        self.speed_modifier = speed_modifier;
        self
    }
}

/// Flat lookup table from block ids to block behavior. Immutable once the
/// world is constructed; lookups for unregistered ids fall back to air
/// instead of failing.
#[derive(Debug, Clone)]
pub struct BlockPalette {
    types: Vec<BlockType>,
    air_fallback: BlockType,
}

impl BlockPalette {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            air_fallback: BlockType::air(),
        }
    }

    pub fn register(&mut self, block_type: BlockType) -> Result<BlockId, PaletteError> {
        if self.types.len() >= MAX_BLOCK_TYPES {
            return Err(PaletteError::Exhausted);
        }
        let id = BlockId(self.types.len() as u8);
        self.types.push(block_type);
        Ok(id)
    }

    pub fn get(&self, id: BlockId) -> &BlockType {
        self.types.get(id.0 as usize).unwrap_or(&self.air_fallback)
    }

    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).solid
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The fixed default registration order. Generation and picking rely on
    /// the `BlockId` constants lining up with these slots.
    pub fn default_palette() -> Self {
        let mut palette = Self::new();
        let types = [
            BlockType::air(),
            BlockType::new("stone", BlockMaterial::colored([0.55, 0.55, 0.55, 1.0])),
            BlockType::new("dirt", BlockMaterial::colored([0.45, 0.30, 0.15, 1.0])),
            BlockType::new("wood", BlockMaterial::colored([0.40, 0.26, 0.12, 1.0])),
            BlockType::new("sand", BlockMaterial::colored([0.85, 0.78, 0.50, 1.0]))
                .with_speed_modifier(0.4),
            BlockType::new("leaves", BlockMaterial::colored([0.20, 0.55, 0.20, 1.0])),
            BlockType::new("grass", BlockMaterial::textured("textures/grass.png")),
        ];
        for block_type in types {
            palette
                .register(block_type)
                .expect("default palette fits in the id space");
        }
        palette
    }
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self::default_palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_ids_are_stable() {
        let palette = BlockPalette::default_palette();
        assert_eq!(palette.len(), 7);
        assert_eq!(palette.get(BlockId::AIR).name, "air");
        assert_eq!(palette.get(BlockId::STONE).name, "stone");
        assert_eq!(palette.get(BlockId::DIRT).name, "dirt");
        assert_eq!(palette.get(BlockId::WOOD).name, "wood");
        assert_eq!(palette.get(BlockId::SAND).name, "sand");
        assert_eq!(palette.get(BlockId::LEAVES).name, "leaves");
        assert_eq!(palette.get(BlockId::GRASS).name, "grass");
    }

    #[test]
    fn air_is_not_solid() {
        let palette = BlockPalette::default_palette();
        assert!(!palette.is_solid(BlockId::AIR));
        assert!(palette.is_solid(BlockId::STONE));
    }

    #[test]
    fn unregistered_id_degrades_to_air() {
        let palette = BlockPalette::default_palette();
        let unknown = BlockId(200);
        assert_eq!(palette.get(unknown).name, "air");
        assert!(!palette.is_solid(unknown));
    }

    #[test]
    fn sand_slows_movement() {
        let palette = BlockPalette::default_palette();
        assert_eq!(palette.get(BlockId::SAND).speed_modifier, 0.4);
        assert_eq!(palette.get(BlockId::STONE).speed_modifier, 1.0);
    }

    #[test]
    fn registration_stops_at_capacity() {
        let mut palette = BlockPalette::new();
        for i in 0..MAX_BLOCK_TYPES {
            let id = palette
                .register(BlockType::new(
                    &format!("block_{i}"),
                    BlockMaterial::colored([1.0, 1.0, 1.0, 1.0]),
                ))
                .unwrap();
            assert_eq!(id.0 as usize, i);
        }
        assert_eq!(palette.len(), MAX_BLOCK_TYPES);
        let overflow = palette.register(BlockType::air());
        assert!(matches!(overflow, Err(PaletteError::Exhausted)));
    }
}
