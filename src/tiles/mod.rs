pub mod geometry;
pub mod random;
pub mod records;
pub mod registry;
pub mod template;

pub use geometry::{TileGeometry, TileMesh, AXES, TILE_INDICES, TILE_SIZE};
pub use random::{RandomSource, RngSource, SequenceRandom};
pub use records::{TileData, TileTemplateData, INVALID_TEXTURE_SLOT};
pub use registry::{TileRegistry, MAX_TILES, MAX_TILE_TEMPLATES};
pub use template::{TileTemplate, VariantWeights};
