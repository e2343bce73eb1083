//! World Kernel: authoritative world state for the tile world.
//!
//! # Invariants
//! - The tile grid is square and immutable once generated.
//! - Static entities are kept in depth order (non-increasing Y) after every insertion.
//! - Exactly one controlled entity, the player, exists per world.
//! - Entity ids are unique across the static entities and the player.
//! - A `World` is only ever handed out fully constructed and validated.

pub mod config;
pub mod entity;
pub mod error;
pub mod placement;
pub mod terrain;
pub mod world;

pub use config::WorldConfig;
pub use entity::{Behavior, Controller, DEFAULT_PLAYER_NAME, Entity};
pub use error::{GenerationError, WorldError};
pub use placement::{generate_entities, insert_depth_sorted};
pub use terrain::{TileGrid, biome_for_row, generate_tiles};
pub use world::{MAX_MAP_SIZE, World, WorldSource};
