use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tileworld_common::EntityTypeId;

use crate::{CatalogError, Sprite};

/// Display metadata for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityKind {
    pub name: String,
    pub sprite: Sprite,
}

/// On-disk `.entity` description.
#[derive(Debug, Deserialize)]
struct EntityFile {
    entity_id: u32,
    entity_name: String,
    texture_filename: String,
    /// Texture size before scaling.
    width: u32,
    height: u32,
    #[serde(default = "default_scale")]
    scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// Entity type id to display metadata.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    kinds: BTreeMap<EntityTypeId, EntityKind>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog covering every type the world generator and the player use.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (type_id, name, width, height) in [
            (EntityTypeId::SAND_DWELLER, "cactus", 64, 128),
            (EntityTypeId::SNOW_DWELLER, "pine", 64, 128),
            (EntityTypeId::TROPICAL_DWELLER, "palm", 64, 128),
            (EntityTypeId::PLAYER, "player", 48, 96),
        ] {
            catalog.insert(
                type_id,
                EntityKind {
                    name: name.into(),
                    sprite: Sprite::new(&format!("{name}.png"), width, height),
                },
            );
        }
        catalog
    }

    /// Load every `*.entity` file in `dir`. Other files are skipped.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("entity") {
                continue;
            }
            let file = path.display().to_string();
            let data = std::fs::read_to_string(&path)?;
            let desc: EntityFile =
                serde_json::from_str(&data).map_err(|source| CatalogError::Json {
                    file: file.clone(),
                    source,
                })?;
            if desc.scale.is_nan() || desc.scale <= 0.0 {
                return Err(CatalogError::ZeroScale {
                    file,
                    scale: desc.scale,
                });
            }
            let width = (desc.width as f32 * desc.scale).round() as u32;
            let height = (desc.height as f32 * desc.scale).round() as u32;
            tracing::debug!(
                id = desc.entity_id,
                name = %desc.entity_name,
                width,
                height,
                "entity kind loaded"
            );
            catalog.insert(
                EntityTypeId(desc.entity_id),
                EntityKind {
                    name: desc.entity_name,
                    sprite: Sprite::new(&desc.texture_filename, width, height),
                },
            );
        }
        tracing::info!(dir = %dir.display(), kinds = catalog.len(), "entity catalog loaded");
        Ok(catalog)
    }

    pub fn insert(&mut self, type_id: EntityTypeId, kind: EntityKind) {
        self.kinds.insert(type_id, kind);
    }

    pub fn get(&self, type_id: EntityTypeId) -> Option<&EntityKind> {
        self.kinds.get(&type_id)
    }

    pub fn sprite(&self, type_id: EntityTypeId) -> Option<&Sprite> {
        self.get(type_id).map(|k| &k.sprite)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
