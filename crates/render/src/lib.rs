//! Rendering Adapter: viewport culling and depth-ordered compositing.
//!
//! # Invariants
//! - Renderer cannot mutate world truth directly.
//! - Entities reach the surface in depth order: higher world Y first, so
//!   nearer entities overpaint farther ones.
//! - Off-screen elements are skipped before any draw call and never counted.
//!
//! The only drawing primitive is [`Surface::blit`]; pixels, textures and
//! windows belong to whichever backend implements it.

mod compositor;
mod surface;
mod viewport;

pub use compositor::{FrameStats, render_entities, render_entity, render_frame, render_tiles};
pub use surface::{Blit, RecordingSurface, Surface};
pub use viewport::{RenderView, entity_screen_position, is_on_screen, tile_screen_position};

use tileworld_common::{Biome, EntityId, EntityTypeId};

/// Errors raised while compositing a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("entity {entity} has type {type_id:?} missing from the entity catalog")]
    UnknownEntityType {
        entity: EntityId,
        type_id: EntityTypeId,
    },
    #[error("biome {0:?} missing from the tile catalog")]
    UnknownBiome(Biome),
}
