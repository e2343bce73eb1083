//! Shared types for the tile world: entity ids, entity types, biomes and
//! validated world names.

mod name;
mod types;

pub use name::{MAX_WORLD_NAME_LEN, ValidationError, WorldName};
pub use types::{Biome, EntityId, EntityIdAllocator, EntityTypeId};
