use serde::{Deserialize, Serialize};

/// Generation parameters for a fresh world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of one tile in pixels (world units).
    pub tile_size: u32,
    /// Number of static entities to scatter over the terrain.
    pub entity_count: usize,
    /// Placement seed. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 64,
            entity_count: 1000,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
