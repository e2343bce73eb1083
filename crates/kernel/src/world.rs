use std::collections::HashSet;

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tileworld_common::{EntityId, EntityIdAllocator, EntityTypeId, ValidationError, WorldName};

use crate::config::WorldConfig;
use crate::entity::{DEFAULT_PLAYER_NAME, Entity};
use crate::error::{GenerationError, WorldError};
use crate::placement::{generate_entities, insert_depth_sorted};
use crate::terrain::{TileGrid, generate_tiles};

/// Largest accepted map edge length, in tiles.
pub const MAX_MAP_SIZE: u32 = 4096;

/// Somewhere a saved world can be restored from.
///
/// Implemented by the persistence layer; `World::create` only sees the trait.
pub trait WorldSource {
    fn load_world(&self, name: &WorldName)
    -> Result<World, Box<dyn std::error::Error + Send + Sync>>;
}

/// The authoritative world state.
///
/// Owns the terrain, the depth-ordered static entities and the player.
/// Renderers and persistence read from it; all mutations go through its
/// methods so the depth order and the single-player rule always hold.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    name: WorldName,
    map_size: usize,
    tile_size: u32,
    tiles: TileGrid,
    entities: Vec<Entity>,
    player: Entity,
    ids: EntityIdAllocator,
}

/// Check a caller-supplied map size and convert it to a grid dimension.
pub fn validate_map_size(map_size: i64) -> Result<usize, ValidationError> {
    if map_size < 1 || map_size > MAX_MAP_SIZE as i64 {
        return Err(ValidationError::MapSize {
            size: map_size,
            max: MAX_MAP_SIZE,
        });
    }
    Ok(map_size as usize)
}

impl World {
    /// Generate a fresh world: terrain, scattered entities and a player at the origin.
    pub fn generate(name: &str, map_size: i64, config: &WorldConfig) -> Result<Self, WorldError> {
        let name = WorldName::parse(name)?;
        let map_size = validate_map_size(map_size)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::generate_with(name, map_size, config, &mut rng)
    }

    fn generate_with(
        name: WorldName,
        map_size: usize,
        config: &WorldConfig,
        rng: &mut StdRng,
    ) -> Result<Self, WorldError> {
        let _span = tracing::info_span!("generate_world", %name, map_size).entered();
        if config.tile_size == 0 {
            return Err(GenerationError::ZeroTileSize.into());
        }

        let mut ids = EntityIdAllocator::new();
        let tiles = generate_tiles(map_size);
        let entities =
            generate_entities(&tiles, config.tile_size, config.entity_count, &mut ids, rng)?;
        let player = Entity::player(&mut ids, Vec2::ZERO);

        tracing::info!(
            %name,
            map_size,
            entities = entities.len(),
            "world generated"
        );
        Ok(Self {
            name,
            map_size,
            tile_size: config.tile_size,
            tiles,
            entities,
            player,
            ids,
        })
    }

    /// Validate the parameters, then restore from `source` when given or generate otherwise.
    ///
    /// A restored world must carry the requested name. Its stored map size
    /// takes precedence over `map_size`.
    pub fn create(
        name: &str,
        map_size: i64,
        config: &WorldConfig,
        source: Option<&dyn WorldSource>,
    ) -> Result<Self, WorldError> {
        let parsed = WorldName::parse(name)?;
        let requested_size = validate_map_size(map_size)?;

        let Some(source) = source else {
            return Self::generate(name, map_size, config);
        };

        let world = source
            .load_world(&parsed)
            .map_err(|e| WorldError::load(&parsed, e))?;
        if world.name != parsed {
            return Err(WorldError::load(
                &parsed,
                format!("save belongs to world {}", world.name),
            ));
        }
        if world.map_size != requested_size {
            tracing::warn!(
                name = %parsed,
                requested = requested_size,
                stored = world.map_size,
                "stored map size differs from requested, keeping stored"
            );
        }
        tracing::info!(name = %parsed, entities = world.entities.len(), "world restored");
        Ok(world)
    }

    /// Reassemble a world from stored parts, re-checking every invariant.
    ///
    /// Static entities are re-sorted into depth order. Ids must be unique
    /// across statics and the player. The id allocator is advanced past the
    /// highest id present if needed.
    pub fn from_parts(
        name: WorldName,
        tile_size: u32,
        tiles: TileGrid,
        entities: Vec<Entity>,
        player: Entity,
        mut ids: EntityIdAllocator,
    ) -> Result<Self, ValidationError> {
        let map_size = validate_map_size(tiles.size() as i64)?;
        if tile_size == 0 {
            return Err(ValidationError::ZeroTileSize);
        }
        if !player.is_controlled() {
            return Err(ValidationError::StaticPlayer);
        }
        if let Some(e) = entities.iter().find(|e| e.is_controlled()) {
            return Err(ValidationError::ControlledStatic(e.id().0));
        }
        let mut seen = HashSet::with_capacity(entities.len() + 1);
        for id in entities.iter().map(Entity::id).chain(std::iter::once(player.id())) {
            if !seen.insert(id) {
                return Err(ValidationError::DuplicateId(id.0));
            }
        }

        let max_id = entities
            .iter()
            .map(Entity::id)
            .chain(std::iter::once(player.id()))
            .max()
            .map_or(0, |id| id.0);
        if ids.peek().0 <= max_id {
            tracing::warn!(
                next = ids.peek().0,
                max_id,
                "id allocator behind stored entities, advancing"
            );
            ids = EntityIdAllocator::with_next(max_id + 1);
        }

        let mut sorted = Vec::with_capacity(entities.len());
        for entity in entities {
            insert_depth_sorted(&mut sorted, entity);
        }

        Ok(Self {
            name,
            map_size,
            tile_size,
            tiles,
            entities: sorted,
            player,
            ids,
        })
    }

    pub fn name(&self) -> &WorldName {
        &self.name
    }

    /// Map edge length in tiles.
    pub fn map_size(&self) -> usize {
        self.map_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    /// Static entities in depth order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    /// The id the next spawned entity will get.
    pub fn next_entity_id(&self) -> EntityId {
        self.ids.peek()
    }

    /// Total number of tiles held.
    pub fn loaded_tiles(&self) -> usize {
        self.map_size * self.map_size
    }

    /// Number of static entities held.
    pub fn loaded_entities(&self) -> usize {
        self.entities.len()
    }

    /// Insert a static entity at its depth-order slot.
    ///
    /// Fails if the entity is controlled or its id is already held.
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), ValidationError> {
        if entity.is_controlled() {
            return Err(ValidationError::ControlledStatic(entity.id().0));
        }
        let id = entity.id();
        if self.player.id() == id || self.entities.iter().any(|e| e.id() == id) {
            return Err(ValidationError::DuplicateId(id.0));
        }
        if entity.id() >= self.ids.peek() {
            self.ids = EntityIdAllocator::with_next(entity.id().0 + 1);
        }
        insert_depth_sorted(&mut self.entities, entity);
        Ok(())
    }

    /// Create a static entity with a fresh id and insert it.
    pub fn spawn(&mut self, type_id: EntityTypeId, position: Vec2) -> EntityId {
        let entity = Entity::new(&mut self.ids, type_id, position);
        let id = entity.id();
        insert_depth_sorted(&mut self.entities, entity);
        id
    }

    /// Advance the world by `elapsed` seconds. Only the player moves.
    pub fn update_entities(&mut self, elapsed: f32) {
        let elapsed = if elapsed.is_finite() && elapsed >= 0.0 {
            elapsed
        } else {
            tracing::warn!(elapsed, "ignoring invalid elapsed time");
            0.0
        };
        self.player.update(elapsed, &self.entities);
        tracing::trace!(position = ?self.player.position, "player updated");
    }

    pub fn set_player_velocity(&mut self, velocity: Vec2) {
        self.player.set_velocity(velocity);
    }

    pub fn camera_locked(&self) -> bool {
        self.player.controller().is_some_and(|c| c.camera_locked)
    }

    pub fn set_camera_locked(&mut self, locked: bool) {
        if let Some(c) = self.player.controller_mut() {
            c.camera_locked = locked;
        }
    }

    pub fn player_name(&self) -> &str {
        self.player.controller().map_or(DEFAULT_PLAYER_NAME, |c| c.name.as_str())
    }

    /// Rename the player. An empty name resets it to the default.
    pub fn set_player_name(&mut self, name: &str) {
        if let Some(c) = self.player.controller_mut() {
            c.name = if name.is_empty() {
                DEFAULT_PLAYER_NAME.to_owned()
            } else {
                name.to_owned()
            };
        }
    }

    /// Flip the camera lock and return the new state.
    pub fn toggle_camera_lock(&mut self) -> bool {
        let locked = !self.camera_locked();
        self.set_camera_locked(locked);
        locked
    }
}
