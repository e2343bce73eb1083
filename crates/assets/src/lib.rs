//! Sprite catalogs for entities and tiles.
//!
//! The renderer consumes sprites by handle plus their pixel extent; decoding
//! the images behind the handles is the display backend's job.
//!
//! # Layout
//! ```text
//! res/entities/<any>.entity   - JSON entity kind descriptions
//! res/tiles/<id>_<name>.<ext> - one texture per biome id
//! ```

mod entities;
mod tiles;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use entities::{EntityCatalog, EntityKind};
pub use tiles::{TileCatalog, TileKind};

/// Opaque handle to a texture owned by the display backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteHandle(pub u64);

impl SpriteHandle {
    /// Derive a stable handle from a texture filename.
    pub fn for_texture(filename: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(filename.as_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

/// A drawable texture and its on-screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub handle: SpriteHandle,
    pub width: u32,
    pub height: u32,
}

impl Sprite {
    pub fn new(texture: &str, width: u32, height: u32) -> Self {
        Self {
            handle: SpriteHandle::for_texture(texture),
            width,
            height,
        }
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid entity file {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile file name {0:?} does not match <id>_<name>.<ext>")]
    BadFileName(String),
    #[error("tile file {file} names unknown biome id {id}")]
    UnknownBiome { file: String, id: u8 },
    #[error("entity file {file} has non-positive scale {scale}")]
    ZeroScale { file: String, scale: f32 },
}
