use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use tileworld_common::EntityIdAllocator;

use crate::entity::Entity;
use crate::error::GenerationError;
use crate::terrain::TileGrid;

/// Insert `entity` keeping `entities` in depth order (non-increasing Y).
///
/// The new entity takes the slot of the first entity with a strictly lower
/// Y, so ties land at the end of their run.
pub fn insert_depth_sorted(entities: &mut Vec<Entity>, entity: Entity) {
    let y = entity.position.y;
    let index = entities.partition_point(|e| e.position.y >= y);
    entities.insert(index, entity);
}

/// Largest map edge in pixels. Every integer position up to here is exact in `f32`.
pub const MAX_PIXEL_EXTENT: u64 = 1 << 24;

/// Half-open pixel range entities may be placed in, on both axes.
///
/// Maps larger than 3 tiles keep a one-tile border free.
fn placeable_range(map_size: usize, tile_size: u32) -> Result<(i64, i64), GenerationError> {
    let extent = (map_size as u64)
        .checked_mul(tile_size as u64)
        .filter(|&e| e <= MAX_PIXEL_EXTENT)
        .ok_or(GenerationError::TooLarge {
            map_size,
            tile_size,
        })? as i64;
    let tile = tile_size as i64;
    if map_size > 3 {
        Ok((tile, extent - tile))
    } else {
        Ok((0, extent))
    }
}

/// Scatter `count` static entities over distinct pixel positions of the map.
///
/// Each entity's type is the spawn type of the biome below its anchor point.
/// The result is in depth order.
pub fn generate_entities(
    tiles: &TileGrid,
    tile_size: u32,
    count: usize,
    ids: &mut EntityIdAllocator,
    rng: &mut impl Rng,
) -> Result<Vec<Entity>, GenerationError> {
    let map_size = tiles.size();
    let _span = tracing::debug_span!("generate_entities", map_size, tile_size, count).entered();
    if tile_size == 0 {
        return Err(GenerationError::ZeroTileSize);
    }

    let (lo, hi) = placeable_range(map_size, tile_size)?;
    let side = (hi - lo).max(0) as u64;
    let available = side.saturating_mul(side);
    if count as u64 > available {
        return Err(GenerationError::NotEnoughRoom {
            requested: count,
            available,
        });
    }

    // Rejection sampling: uniform without replacement.
    let mut chosen: HashSet<(i64, i64)> = HashSet::with_capacity(count);
    let mut positions = Vec::with_capacity(count);
    while positions.len() < count {
        let pos = (rng.random_range(lo..hi), rng.random_range(lo..hi));
        if chosen.insert(pos) {
            positions.push(pos);
        }
    }

    let tile = tile_size as i64;
    let origin = (map_size / 2) as i64 * tile;
    let last_row = map_size.saturating_sub(1);
    let mut entities = Vec::with_capacity(count);
    for (x, y) in positions {
        let col = (x / tile) as usize;
        // Sprites anchor at their bottom edge, so sample the tile below the point.
        let row = ((y / tile) as usize + 1).min(last_row);
        let biome = tiles.get(row, col);
        debug_assert!(biome.is_some(), "placeable range leaves the grid");
        let biome = biome.ok_or(GenerationError::OffGrid { row, col })?;
        let shifted = Vec2::new((x - origin) as f32, (y - origin) as f32);
        insert_depth_sorted(&mut entities, Entity::new(ids, biome.spawn_type(), shifted));
    }

    tracing::debug!(placed = entities.len(), "entities generated");
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{biome_for_row, generate_tiles};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tileworld_common::EntityTypeId;

    fn is_depth_sorted(entities: &[Entity]) -> bool {
        entities
            .windows(2)
            .all(|w| w[0].position.y >= w[1].position.y)
    }

    #[test]
    fn returns_requested_count_with_distinct_positions() {
        let tiles = generate_tiles(10);
        let mut ids = EntityIdAllocator::new();
        let mut rng = StdRng::seed_from_u64(1);
        let entities = generate_entities(&tiles, 64, 200, &mut ids, &mut rng).unwrap();
        assert_eq!(entities.len(), 200);

        let distinct: HashSet<(i64, i64)> = entities
            .iter()
            .map(|e| (e.position.x as i64, e.position.y as i64))
            .collect();
        assert_eq!(distinct.len(), 200);
    }

    #[test]
    fn output_is_depth_sorted() {
        let tiles = generate_tiles(12);
        let mut ids = EntityIdAllocator::new();
        let mut rng = StdRng::seed_from_u64(7);
        let entities = generate_entities(&tiles, 16, 500, &mut ids, &mut rng).unwrap();
        assert!(is_depth_sorted(&entities));
    }

    #[test]
    fn same_seed_same_layout() {
        let tiles = generate_tiles(8);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a =
            generate_entities(&tiles, 32, 50, &mut EntityIdAllocator::new(), &mut rng_a).unwrap();
        let b =
            generate_entities(&tiles, 32, 50, &mut EntityIdAllocator::new(), &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn positions_stay_inside_border() {
        let map_size = 10;
        let tile = 64.0;
        let tiles = generate_tiles(map_size);
        let mut rng = StdRng::seed_from_u64(3);
        let entities =
            generate_entities(&tiles, 64, 300, &mut EntityIdAllocator::new(), &mut rng).unwrap();
        let origin = 5.0 * tile;
        for e in &entities {
            let raw = e.position + Vec2::splat(origin);
            assert!(raw.x >= tile && raw.x < 9.0 * tile, "x {}", raw.x);
            assert!(raw.y >= tile && raw.y < 9.0 * tile, "y {}", raw.y);
        }
    }

    #[test]
    fn types_follow_biome_below() {
        let map_size = 10;
        let tiles = generate_tiles(map_size);
        let mut rng = StdRng::seed_from_u64(11);
        let entities =
            generate_entities(&tiles, 64, 300, &mut EntityIdAllocator::new(), &mut rng).unwrap();
        for e in &entities {
            let raw_y = e.position.y as i64 + 5 * 64;
            let row = ((raw_y / 64) as usize + 1).min(map_size - 1);
            assert_eq!(e.type_id(), biome_for_row(row, map_size).spawn_type());
        }
    }

    #[test]
    fn small_maps_use_full_extent() {
        // 2x2 tiles of 1px: exactly 4 positions, all of them must be used.
        let tiles = generate_tiles(2);
        let mut rng = StdRng::seed_from_u64(5);
        let entities =
            generate_entities(&tiles, 1, 4, &mut EntityIdAllocator::new(), &mut rng).unwrap();
        assert_eq!(entities.len(), 4);
    }

    #[test]
    fn too_many_entities_is_an_error() {
        let tiles = generate_tiles(2);
        let mut rng = StdRng::seed_from_u64(5);
        let err = generate_entities(&tiles, 1, 5, &mut EntityIdAllocator::new(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::NotEnoughRoom {
                requested: 5,
                available: 4
            }
        );
    }

    #[test]
    fn zero_tile_size_is_an_error() {
        let tiles = generate_tiles(4);
        let mut rng = StdRng::seed_from_u64(5);
        let err = generate_entities(&tiles, 0, 1, &mut EntityIdAllocator::new(), &mut rng)
            .unwrap_err();
        assert_eq!(err, GenerationError::ZeroTileSize);
    }

    #[test]
    fn extent_beyond_exact_f32_is_too_large() {
        let tiles = generate_tiles(4);
        let mut rng = StdRng::seed_from_u64(5);
        let tile_size = (MAX_PIXEL_EXTENT / 4) as u32 + 1;
        let err = generate_entities(&tiles, tile_size, 1, &mut EntityIdAllocator::new(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::TooLarge {
                map_size: 4,
                tile_size
            }
        );
    }

    #[test]
    fn extent_at_exact_f32_limit_is_accepted() {
        let tiles = generate_tiles(4);
        let mut rng = StdRng::seed_from_u64(5);
        let tile_size = (MAX_PIXEL_EXTENT / 4) as u32;
        let entities =
            generate_entities(&tiles, tile_size, 20, &mut EntityIdAllocator::new(), &mut rng)
                .unwrap();
        assert_eq!(entities.len(), 20);
        for e in &entities {
            let raw_y = e.position.y as i64 + 2 * tile_size as i64;
            let row = ((raw_y / tile_size as i64) as usize + 1).min(3);
            assert_eq!(e.type_id(), biome_for_row(row, 4).spawn_type());
        }
    }

    #[test]
    fn zero_count_is_empty() {
        let tiles = generate_tiles(4);
        let mut rng = StdRng::seed_from_u64(5);
        let entities =
            generate_entities(&tiles, 64, 0, &mut EntityIdAllocator::new(), &mut rng).unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn insertion_keeps_order_and_appends_ties() {
        let mut ids = EntityIdAllocator::new();
        let mut entities = Vec::new();
        for y in [5.0, 1.0, 9.0, 5.0, -3.0, 9.0] {
            insert_depth_sorted(
                &mut entities,
                Entity::new(&mut ids, EntityTypeId(0), Vec2::new(0.0, y)),
            );
        }
        assert!(is_depth_sorted(&entities));
        let ys: Vec<f32> = entities.iter().map(|e| e.position.y).collect();
        assert_eq!(ys, vec![9.0, 9.0, 5.0, 5.0, 1.0, -3.0]);

        // Ties keep insertion order: the first 9.0 (id 2) stays ahead of the second (id 5).
        assert!(entities[0].id() < entities[1].id());
        assert!(entities[2].id() < entities[3].id());
    }
}
