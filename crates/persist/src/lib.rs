//! Persistence: one versioned save file per world name.
//!
//! # Invariants
//! - A load either yields a fully validated `World` or an error; nothing is
//!   partially applied.
//! - Save files carry a schema version and a SHA-256 of their payload and
//!   are rejected when either does not match.

mod record;
mod store;

pub use record::{EntityRecord, PlayerRecord, WorldRecord};
pub use store::{SAVE_FILE_NAME, SAVE_SCHEMA_VERSION, SaveStore, StoreError};

use std::path::{Path, PathBuf};
use tileworld_common::WorldName;
use tileworld_kernel::World;

/// Save `world` under `root`. Shorthand for [`SaveStore::save`].
pub fn serialize(world: &World, root: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
    SaveStore::new(root).save(world)
}

/// Load world `name` from `root`. Shorthand for [`SaveStore::load`].
pub fn deserialize(root: impl AsRef<Path>, name: &WorldName) -> Result<World, StoreError> {
    SaveStore::new(root).load(name)
}
