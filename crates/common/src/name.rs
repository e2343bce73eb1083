use serde::{Deserialize, Serialize};

/// Longest accepted world name, in characters.
pub const MAX_WORLD_NAME_LEN: usize = 250;

/// Rejected world parameters. Never retryable with the same input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("world name must not be empty")]
    EmptyName,
    #[error("world name is {len} characters long, at most {max} allowed")]
    NameTooLong { len: usize, max: usize },
    #[error("world name must start with a letter, got {0:?}")]
    NameStartsWithNonLetter(char),
    #[error("world name may only contain letters and digits, got {0:?}")]
    NameInvalidChar(char),
    #[error("map size must be between 1 and {max}, got {size}")]
    MapSize { size: i64, max: u32 },
    #[error("tile grid holds {actual} tiles, expected {expected}")]
    TileCount { expected: usize, actual: usize },
    #[error("unknown biome id {0}")]
    UnknownBiome(u8),
    #[error("entity {0} is controlled but is not the player")]
    ControlledStatic(u64),
    #[error("player entity must be controlled")]
    StaticPlayer,
    #[error("entity id {0} is already in use")]
    DuplicateId(u64),
    #[error("tile size must be positive")]
    ZeroTileSize,
}

/// A validated world name: 1–250 ASCII letters or digits, starting with a letter.
///
/// Doubles as the save slot key, so it is always safe as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorldName(String);

impl WorldName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let mut chars = name.chars();
        let first = chars.next().ok_or(ValidationError::EmptyName)?;
        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::NameStartsWithNonLetter(first));
        }
        if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric()) {
            return Err(ValidationError::NameInvalidChar(bad));
        }
        // All ASCII at this point, so bytes == chars.
        if name.len() > MAX_WORLD_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                len: name.len(),
                max: MAX_WORLD_NAME_LEN,
            });
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for WorldName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WorldName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WorldName> for String {
    fn from(name: WorldName) -> Self {
        name.0
    }
}
