use tileworld_common::{ValidationError, WorldName};

/// Failure while building terrain or placing entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("tile size must be positive")]
    ZeroTileSize,
    #[error("cannot place {requested} entities, only {available} distinct positions exist")]
    NotEnoughRoom { requested: usize, available: u64 },
    #[error("map of {map_size} tiles at {tile_size}px exceeds the coordinate range")]
    TooLarge { map_size: usize, tile_size: u32 },
    #[error("sampled position maps to tile ({row}, {col}) outside the grid")]
    OffGrid { row: usize, col: usize },
}

/// Errors from world creation.
///
/// Creation is atomic: on any of these no `World` exists.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid world parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error("world generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("could not load world {name}: {source}")]
    Load {
        name: WorldName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WorldError {
    /// Wrap any loader failure for `name`.
    pub fn load(
        name: &WorldName,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Load {
            name: name.clone(),
            source: source.into(),
        }
    }

    /// Whether the caller can recover by generating a fresh world instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}
