use tileworld_common::{Biome, ValidationError};

/// Square, row-major grid of biomes. Row index runs along latitude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    size: usize,
    tiles: Vec<Biome>,
}

impl TileGrid {
    /// Rebuild a grid from a flat row-major tile list (used for restore).
    pub fn from_parts(size: usize, tiles: Vec<Biome>) -> Result<Self, ValidationError> {
        let expected = size * size;
        if tiles.len() != expected {
            return Err(ValidationError::TileCount {
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self { size, tiles })
    }

    /// Side length in tiles.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Biome> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.tiles.get(row * self.size + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[Biome]> {
        if row >= self.size {
            return None;
        }
        let start = row * self.size;
        Some(&self.tiles[start..start + self.size])
    }

    /// Iterate rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = &[Biome]> {
        // size >= 1 for every grid a world can hold; guard the empty grid anyway.
        self.tiles.chunks(self.size.max(1))
    }

    /// Flat row-major view of every tile.
    pub fn tiles(&self) -> &[Biome] {
        &self.tiles
    }
}

/// Biome of row `row` in a map of `map_size` rows.
///
/// Saw-tooth latitude profile: `sample = 1 - |row - half| / half` peaks at
/// the vertical center of the map. Sand sits on the equator, snow at the poles.
pub fn biome_for_row(row: usize, map_size: usize) -> Biome {
    let half = map_size as f64 / 2.0;
    let sample = 1.0 - (row as f64 - half).abs() / half;
    if sample < 0.2 {
        Biome::Snow
    } else if sample < 0.8 {
        Biome::Tropical
    } else {
        Biome::Sand
    }
}

/// Generate the `map_size × map_size` tile grid. Pure function of `map_size`.
pub fn generate_tiles(map_size: usize) -> TileGrid {
    let _span = tracing::debug_span!("generate_tiles", map_size).entered();
    let mut tiles = Vec::with_capacity(map_size * map_size);
    for row in 0..map_size {
        let biome = biome_for_row(row, map_size);
        tiles.extend(std::iter::repeat_n(biome, map_size));
    }
    TileGrid {
        size: map_size,
        tiles,
    }
}
