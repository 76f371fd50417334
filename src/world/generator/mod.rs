pub mod flower;
pub mod terrain;
pub mod tree;

pub use flower::{Flower, FlowerGenerator};
pub use terrain::TerrainGenerator;
pub use tree::{Tree, TreeGenerator};
