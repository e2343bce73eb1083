use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the world.
///
/// Ids are handed out by an [`EntityIdAllocator`] in strictly increasing
/// order and never reused within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic entity id counter owned by a world.
///
/// Persisted together with the world so that a restored world keeps
/// allocating ids past everything it already contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    /// Start allocating at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume allocating at `next` (used for restore).
    pub fn with_next(next: u64) -> Self {
        Self { next }
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

/// Index into the entity catalog (sprite and display metadata).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityTypeId(pub u32);

impl EntityTypeId {
    pub const SAND_DWELLER: Self = Self(0);
    pub const SNOW_DWELLER: Self = Self(1);
    pub const TROPICAL_DWELLER: Self = Self(2);
    pub const PLAYER: Self = Self(3);
}

/// Terrain classification of a tile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    Sand = 0,
    Tropical = 1,
    Snow = 2,
}

impl Biome {
    pub const ALL: [Biome; 3] = [Biome::Sand, Biome::Tropical, Biome::Snow];

    /// Stable numeric id, also the tile catalog key.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Biome::Sand),
            1 => Some(Biome::Tropical),
            2 => Some(Biome::Snow),
            _ => None,
        }
    }

    /// Entity type that spawns on top of this biome.
    pub fn spawn_type(self) -> EntityTypeId {
        match self {
            Biome::Sand => EntityTypeId::SAND_DWELLER,
            Biome::Snow => EntityTypeId::SNOW_DWELLER,
            Biome::Tropical => EntityTypeId::TROPICAL_DWELLER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Sand => "sand",
            Biome::Tropical => "tropical",
            Biome::Snow => "snow",
        }
    }
}
