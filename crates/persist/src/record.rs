use glam::Vec2;
use serde::{Deserialize, Serialize};
use tileworld_common::{
    Biome, EntityId, EntityIdAllocator, EntityTypeId, ValidationError, WorldName,
};
use tileworld_kernel::{Behavior, Controller, DEFAULT_PLAYER_NAME, Entity, TileGrid, World};

/// Plain, versionable image of a world.
///
/// Decoupled from the kernel types so the save format only changes when
/// [`SAVE_SCHEMA_VERSION`](crate::SAVE_SCHEMA_VERSION) does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub name: String,
    pub map_size: u32,
    pub tile_size: u32,
    /// Row-major biome ids, `map_size²` of them.
    pub tiles: Vec<u8>,
    /// Static entities in depth order.
    pub entities: Vec<EntityRecord>,
    pub player: PlayerRecord,
    pub next_entity_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: u64,
    pub type_id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u64,
    #[serde(default = "default_player_name")]
    pub name: String,
    pub type_id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub camera_locked: bool,
}

fn default_player_name() -> String {
    DEFAULT_PLAYER_NAME.to_owned()
}

impl WorldRecord {
    /// Capture the full state of `world`.
    pub fn capture(world: &World) -> Self {
        let player = world.player();
        let controller = player.controller().cloned().unwrap_or_default();
        Self {
            name: world.name().to_string(),
            map_size: world.map_size() as u32,
            tile_size: world.tile_size(),
            tiles: world.tiles().tiles().iter().map(|b| b.id()).collect(),
            entities: world
                .entities()
                .iter()
                .map(|e| EntityRecord {
                    id: e.id().0,
                    type_id: e.type_id().0,
                    x: e.position.x,
                    y: e.position.y,
                })
                .collect(),
            player: PlayerRecord {
                id: player.id().0,
                name: controller.name,
                type_id: player.type_id().0,
                x: player.position.x,
                y: player.position.y,
                vx: controller.velocity.x,
                vy: controller.velocity.y,
                camera_locked: controller.camera_locked,
            },
            next_entity_id: world.next_entity_id().0,
        }
    }

    /// Rebuild a validated world. Nothing is constructed unless every part checks out.
    pub fn restore(self) -> Result<World, ValidationError> {
        let name = WorldName::parse(&self.name)?;
        let tiles = self
            .tiles
            .iter()
            .map(|&id| Biome::from_id(id).ok_or(ValidationError::UnknownBiome(id)))
            .collect::<Result<Vec<_>, _>>()?;
        let tiles = TileGrid::from_parts(self.map_size as usize, tiles)?;

        let entities = self
            .entities
            .iter()
            .map(|e| {
                Entity::with_id(
                    EntityId(e.id),
                    EntityTypeId(e.type_id),
                    Vec2::new(e.x, e.y),
                    Behavior::Static,
                )
            })
            .collect();
        let p = self.player;
        let player = Entity::with_id(
            EntityId(p.id),
            EntityTypeId(p.type_id),
            Vec2::new(p.x, p.y),
            Behavior::Controlled(Controller {
                velocity: Vec2::new(p.vx, p.vy),
                camera_locked: p.camera_locked,
                ..Controller::named(&p.name)
            }),
        );

        World::from_parts(
            name,
            self.tile_size,
            tiles,
            entities,
            player,
            EntityIdAllocator::with_next(self.next_entity_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileworld_kernel::WorldConfig;

    fn world() -> World {
        let config = WorldConfig {
            tile_size: 32,
            entity_count: 40,
            seed: Some(3),
        };
        World::generate("recorded", 12, &config).unwrap()
    }

    #[test]
    fn capture_restore_preserves_world() {
        let mut w = world();
        w.set_player_velocity(Vec2::new(3.0, -4.0));
        w.update_entities(2.0);
        w.toggle_camera_lock();

        let restored = WorldRecord::capture(&w).restore().unwrap();
        assert_eq!(restored, w);
    }

    #[test]
    fn capture_flattens_tiles() {
        let w = world();
        let record = WorldRecord::capture(&w);
        assert_eq!(record.tiles.len(), 144);
        assert_eq!(record.map_size, 12);
        assert_eq!(record.entities.len(), 40);
    }

    #[test]
    fn restore_rejects_unknown_biome() {
        let mut record = WorldRecord::capture(&world());
        record.tiles[5] = 9;
        assert_eq!(record.restore(), Err(ValidationError::UnknownBiome(9)));
    }

    #[test]
    fn restore_rejects_truncated_grid() {
        let mut record = WorldRecord::capture(&world());
        record.tiles.pop();
        assert!(matches!(
            record.restore(),
            Err(ValidationError::TileCount { .. })
        ));
    }

    #[test]
    fn restore_keeps_player_name() {
        let mut w = world();
        w.set_player_name("Ada");
        let restored = WorldRecord::capture(&w).restore().unwrap();
        assert_eq!(restored.player_name(), "Ada");

        let mut record = WorldRecord::capture(&w);
        record.player.name.clear();
        assert_eq!(record.restore().unwrap().player_name(), DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn restore_rejects_player_sharing_an_id() {
        let mut record = WorldRecord::capture(&world());
        let id = record.entities[0].id;
        record.player.id = id;
        assert_eq!(record.restore(), Err(ValidationError::DuplicateId(id)));
    }

    #[test]
    fn restore_rejects_repeated_static_ids() {
        let mut record = WorldRecord::capture(&world());
        let id = record.entities[0].id;
        record.entities[1].id = id;
        assert_eq!(record.restore(), Err(ValidationError::DuplicateId(id)));
    }

    #[test]
    fn restore_rejects_zero_tile_size() {
        let mut record = WorldRecord::capture(&world());
        record.tile_size = 0;
        assert_eq!(record.restore(), Err(ValidationError::ZeroTileSize));
    }

    #[test]
    fn restore_rejects_bad_name() {
        let mut record = WorldRecord::capture(&world());
        record.name = "9lives".into();
        assert!(record.restore().is_err());
    }
}
