use glam::Vec2;
use serde::{Deserialize, Serialize};
use tileworld_common::{EntityId, EntityIdAllocator, EntityTypeId};

/// Name given to a player created without one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Input-driven capability attached to the player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    /// Display name, never empty.
    pub name: String,
    /// World units per second. Set from input, never computed here.
    pub velocity: Vec2,
    /// Whether the camera follows this entity.
    pub camera_locked: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_owned(),
            velocity: Vec2::ZERO,
            camera_locked: true,
        }
    }
}

impl Controller {
    /// A still, camera-locked controller. An empty `name` falls back to
    /// [`DEFAULT_PLAYER_NAME`].
    pub fn named(name: &str) -> Self {
        if name.is_empty() {
            return Self::default();
        }
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

/// How an entity advances over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Never moves after placement.
    Static,
    /// Integrates its controller's velocity each update.
    Controlled(Controller),
}

/// A positioned, renderable world object.
///
/// Positions are world space with the origin at the map center and Y up.
/// Sprites anchor at their bottom-middle point.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    type_id: EntityTypeId,
    pub position: Vec2,
    behavior: Behavior,
}

impl Entity {
    /// Create a static entity with a fresh id. `type_id` is checked against
    /// the catalog only at render time.
    pub fn new(ids: &mut EntityIdAllocator, type_id: EntityTypeId, position: Vec2) -> Self {
        Self::with_id(ids.allocate(), type_id, position, Behavior::Static)
    }

    /// Create the controllable player entity.
    pub fn player(ids: &mut EntityIdAllocator, position: Vec2) -> Self {
        Self::with_id(
            ids.allocate(),
            EntityTypeId::PLAYER,
            position,
            Behavior::Controlled(Controller::default()),
        )
    }

    /// Rebuild an entity with a known id (used for restore).
    pub fn with_id(
        id: EntityId,
        type_id: EntityTypeId,
        position: Vec2,
        behavior: Behavior,
    ) -> Self {
        Self {
            id,
            type_id,
            position,
            behavior,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn type_id(&self) -> EntityTypeId {
        self.type_id
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.behavior, Behavior::Controlled(_))
    }

    pub fn controller(&self) -> Option<&Controller> {
        match &self.behavior {
            Behavior::Controlled(c) => Some(c),
            Behavior::Static => None,
        }
    }

    pub fn controller_mut(&mut self) -> Option<&mut Controller> {
        match &mut self.behavior {
            Behavior::Controlled(c) => Some(c),
            Behavior::Static => None,
        }
    }

    /// Set the velocity of a controlled entity. Returns `false` for static ones.
    pub fn set_velocity(&mut self, velocity: Vec2) -> bool {
        match self.controller_mut() {
            Some(c) => {
                c.velocity = velocity;
                true
            }
            None => false,
        }
    }

    /// Advance this entity by `elapsed` seconds.
    ///
    /// `peers` is the rest of the world's entities; no current behavior reads it.
    pub fn update(&mut self, elapsed: f32, _peers: &[Entity]) {
        match &self.behavior {
            Behavior::Static => {}
            Behavior::Controlled(c) => {
                self.position += c.velocity * elapsed;
            }
        }
    }
}
