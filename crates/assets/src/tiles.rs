use std::collections::BTreeMap;
use std::path::Path;

use tileworld_common::Biome;

use crate::{CatalogError, Sprite};

#[derive(Debug, Clone, PartialEq)]
pub struct TileKind {
    pub name: String,
    pub sprite: Sprite,
}

/// Biome to tile texture. Every tile sprite is `tile_size` square.
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    kinds: BTreeMap<Biome, TileKind>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin(tile_size: u32) -> Self {
        let mut catalog = Self::new();
        for biome in Biome::ALL {
            let name = biome.name();
            catalog.insert(
                biome,
                TileKind {
                    name: name.into(),
                    sprite: Sprite::new(
                        &format!("{}_{name}.png", biome.id()),
                        tile_size,
                        tile_size,
                    ),
                },
            );
        }
        catalog
    }

    /// Load tile textures named `<biome id>_<name>.<ext>` from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>, tile_size: u32) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file = entry.file_name().to_string_lossy().into_owned();
            let (biome, name) = parse_tile_file_name(&file)?;
            tracing::debug!(id = biome.id(), name, "tile kind loaded");
            catalog.insert(
                biome,
                TileKind {
                    name: name.to_owned(),
                    sprite: Sprite::new(&file, tile_size, tile_size),
                },
            );
        }
        tracing::info!(dir = %dir.display(), kinds = catalog.len(), "tile catalog loaded");
        Ok(catalog)
    }

    pub fn insert(&mut self, biome: Biome, kind: TileKind) {
        self.kinds.insert(biome, kind);
    }

    pub fn get(&self, biome: Biome) -> Option<&TileKind> {
        self.kinds.get(&biome)
    }

    pub fn sprite(&self, biome: Biome) -> Option<&Sprite> {
        self.get(biome).map(|k| &k.sprite)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn parse_tile_file_name(file: &str) -> Result<(Biome, &str), CatalogError> {
    let bad = || CatalogError::BadFileName(file.to_owned());
    let stem = file.split('.').next().ok_or_else(bad)?;
    let (id, name) = stem.split_once('_').ok_or_else(bad)?;
    let id: u8 = id.parse().map_err(|_| bad())?;
    let biome = Biome::from_id(id).ok_or_else(|| CatalogError::UnknownBiome {
        file: file.to_owned(),
        id,
    })?;
    Ok((biome, name))
}
