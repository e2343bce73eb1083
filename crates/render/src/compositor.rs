use glam::Vec2;
use tileworld_assets::{EntityCatalog, TileCatalog};
use tileworld_kernel::{Entity, World};

use crate::RenderError;
use crate::surface::Surface;
use crate::viewport::{
    RenderView, axis_on_screen, entity_screen_position, is_on_screen, tile_screen_position,
};

/// Per-frame draw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub tiles_rendered: usize,
    pub tiles_loaded: usize,
    pub entities_rendered: usize,
    pub entities_loaded: usize,
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Rendered tiles: {}/{}",
            self.tiles_rendered, self.tiles_loaded
        )?;
        write!(
            f,
            "Rendered entities: {}/{}",
            self.entities_rendered, self.entities_loaded
        )
    }
}

/// Draw one entity unless it is off screen. Returns whether it was drawn.
pub fn render_entity<S: Surface + ?Sized>(
    entity: &Entity,
    surface: &mut S,
    view: &RenderView,
    catalog: &EntityCatalog,
) -> Result<bool, RenderError> {
    let sprite = catalog
        .sprite(entity.type_id())
        .ok_or(RenderError::UnknownEntityType {
            entity: entity.id(),
            type_id: entity.type_id(),
        })?;
    let extent = Vec2::new(sprite.width as f32, sprite.height as f32);
    let screen = entity_screen_position(entity.position, extent, view);
    if !is_on_screen(screen, extent, view) {
        return Ok(false);
    }
    surface.blit(sprite, screen);
    Ok(true)
}

/// Draw every on-screen tile of `world`. Returns the number drawn.
pub fn render_tiles<S: Surface + ?Sized>(
    world: &World,
    surface: &mut S,
    view: &RenderView,
    catalog: &TileCatalog,
) -> Result<usize, RenderError> {
    let map_size = world.map_size();
    let tile_size = world.tile_size();
    let tile = tile_size as f32;
    let size = view.viewport.as_vec2();
    let mut rendered = 0;

    for (row, biomes) in world.tiles().rows().enumerate() {
        // A row shares one screen Y, so cull it whole before scanning columns.
        let row_y = tile_screen_position(row, 0, map_size, tile_size, view).y;
        if !axis_on_screen(row_y, tile, size.y) {
            continue;
        }
        for (col, biome) in biomes.iter().enumerate() {
            let screen = tile_screen_position(row, col, map_size, tile_size, view);
            if !axis_on_screen(screen.x, tile, size.x) {
                continue;
            }
            let sprite = catalog
                .sprite(*biome)
                .ok_or(RenderError::UnknownBiome(*biome))?;
            surface.blit(sprite, screen);
            rendered += 1;
        }
    }

    tracing::trace!(rendered, loaded = world.loaded_tiles(), "tiles rendered");
    Ok(rendered)
}

/// Draw the static entities with the movable ones merged in depth order.
///
/// `statics` must already be in depth order. Before each static entity,
/// every pending movable entity with a greater Y is drawn; movables left
/// over at the end are drawn last.
fn composite<S: Surface + ?Sized>(
    statics: &[Entity],
    movables: &[&Entity],
    surface: &mut S,
    view: &RenderView,
    catalog: &EntityCatalog,
) -> Result<usize, RenderError> {
    let mut pending = movables.to_vec();
    pending.sort_by(|a, b| b.position.y.total_cmp(&a.position.y));
    let mut pending = pending.into_iter().peekable();
    let mut rendered = 0;

    for entity in statics {
        while let Some(movable) = pending.next_if(|m| m.position.y > entity.position.y) {
            rendered += usize::from(render_entity(movable, surface, view, catalog)?);
        }
        rendered += usize::from(render_entity(entity, surface, view, catalog)?);
    }
    for movable in pending {
        rendered += usize::from(render_entity(movable, surface, view, catalog)?);
    }
    Ok(rendered)
}

/// Draw every on-screen entity of `world`, player included, in depth order.
pub fn render_entities<S: Surface + ?Sized>(
    world: &World,
    surface: &mut S,
    view: &RenderView,
    catalog: &EntityCatalog,
) -> Result<usize, RenderError> {
    let rendered = composite(world.entities(), &[world.player()], surface, view, catalog)?;
    tracing::trace!(rendered, loaded = world.loaded_entities(), "entities rendered");
    Ok(rendered)
}

/// Tiles first, then entities on top.
pub fn render_frame<S: Surface + ?Sized>(
    world: &World,
    surface: &mut S,
    view: &RenderView,
    tiles: &TileCatalog,
    entities: &EntityCatalog,
) -> Result<FrameStats, RenderError> {
    let tiles_rendered = render_tiles(world, surface, view, tiles)?;
    let entities_rendered = render_entities(world, surface, view, entities)?;
    Ok(FrameStats {
        tiles_rendered,
        tiles_loaded: world.loaded_tiles(),
        entities_rendered,
        entities_loaded: world.loaded_entities(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use glam::UVec2;
    use tileworld_assets::{EntityKind, Sprite};
    use tileworld_common::{Biome, EntityIdAllocator, EntityTypeId};
    use tileworld_kernel::WorldConfig;

    fn empty_world(map_size: i64) -> World {
        let config = WorldConfig {
            tile_size: 64,
            entity_count: 0,
            seed: Some(1),
        };
        World::generate("frame", map_size, &config).unwrap()
    }

    fn view() -> RenderView {
        RenderView::new(Vec2::ZERO, UVec2::new(800, 600))
    }

    #[test]
    fn ten_tile_map_scenario() {
        let world = empty_world(10);
        let mut surface = RecordingSurface::new();
        let n = render_tiles(&world, &mut surface, &view(), &TileCatalog::builtin(64)).unwrap();
        // Row 0 lands at y=620, below the 600px window; the other 9 rows fit.
        assert_eq!(n, 90);
        assert_eq!(surface.len(), 90);
        assert!(n > 0 && n <= world.loaded_tiles());
    }

    #[test]
    fn tile_count_matches_visible_cells() {
        let world = empty_world(40);
        let v = RenderView::new(Vec2::new(300.0, -150.0), UVec2::new(640, 480));
        let mut expected = 0;
        for row in 0..40 {
            for col in 0..40 {
                let s = tile_screen_position(row, col, 40, 64, &v);
                if is_on_screen(s, Vec2::splat(64.0), &v) {
                    expected += 1;
                }
            }
        }
        let mut surface = RecordingSurface::new();
        let n = render_tiles(&world, &mut surface, &v, &TileCatalog::builtin(64)).unwrap();
        assert_eq!(n, expected);
        assert!(n < world.loaded_tiles());
    }

    #[test]
    fn far_camera_renders_no_tiles() {
        let world = empty_world(10);
        let v = RenderView::new(Vec2::new(100_000.0, 0.0), UVec2::new(800, 600));
        let mut surface = RecordingSurface::new();
        let n = render_tiles(&world, &mut surface, &v, &TileCatalog::builtin(64)).unwrap();
        assert_eq!(n, 0);
        assert!(surface.is_empty());
    }

    #[test]
    fn missing_tile_kind_is_an_error() {
        let world = empty_world(10);
        let mut surface = RecordingSurface::new();
        let err = render_tiles(&world, &mut surface, &view(), &TileCatalog::new()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownBiome(_)));
    }

    #[test]
    fn entity_at_center_is_drawn() {
        let catalog = EntityCatalog::builtin();
        let mut ids = EntityIdAllocator::new();
        let e = Entity::new(&mut ids, EntityTypeId(0), Vec2::ZERO);
        let mut surface = RecordingSurface::new();
        assert!(render_entity(&e, &mut surface, &view(), &catalog).unwrap());
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn offscreen_entity_is_culled() {
        let catalog = EntityCatalog::builtin();
        let mut ids = EntityIdAllocator::new();
        let mut surface = RecordingSurface::new();
        for pos in [
            Vec2::new(2000.0, 0.0),
            Vec2::new(-2000.0, 0.0),
            Vec2::new(0.0, 2000.0),
            Vec2::new(0.0, -2000.0),
        ] {
            let e = Entity::new(&mut ids, EntityTypeId(1), pos);
            assert!(!render_entity(&e, &mut surface, &view(), &catalog).unwrap());
        }
        assert!(surface.is_empty());
    }

    #[test]
    fn unknown_entity_type_is_an_error() {
        let mut ids = EntityIdAllocator::new();
        let e = Entity::new(&mut ids, EntityTypeId(77), Vec2::ZERO);
        let mut surface = RecordingSurface::new();
        let err = render_entity(&e, &mut surface, &view(), &EntityCatalog::builtin()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownEntityType { .. }));
    }

    /// Catalog where every type has its own texture so blits can be told apart.
    fn tagged_catalog() -> EntityCatalog {
        let mut catalog = EntityCatalog::new();
        for id in 0..4 {
            catalog.insert(
                EntityTypeId(id),
                EntityKind {
                    name: format!("kind{id}"),
                    sprite: Sprite::new(&format!("kind{id}.png"), 8, 8),
                },
            );
        }
        catalog
    }

    #[test]
    fn player_is_merged_by_depth() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(0), Vec2::new(0.0, 100.0));
        world.spawn(EntityTypeId(1), Vec2::new(0.0, -100.0));
        world.player_mut().position = Vec2::new(10.0, 0.0);

        let catalog = tagged_catalog();
        let mut surface = RecordingSurface::new();
        let n = render_entities(&world, &mut surface, &view(), &catalog).unwrap();
        assert_eq!(n, 3);

        let order: Vec<_> = surface.blits().iter().map(|b| b.handle).collect();
        let handle = |id| catalog.sprite(EntityTypeId(id)).unwrap().handle;
        assert_eq!(order, vec![handle(0), handle(3), handle(1)]);
    }

    #[test]
    fn player_behind_everything_draws_first() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(0), Vec2::new(0.0, 10.0));
        world.player_mut().position = Vec2::new(0.0, 50.0);

        let catalog = tagged_catalog();
        let mut surface = RecordingSurface::new();
        render_entities(&world, &mut surface, &view(), &catalog).unwrap();
        assert_eq!(
            surface.blits()[0].handle,
            catalog.sprite(EntityTypeId::PLAYER).unwrap().handle
        );
    }

    #[test]
    fn player_in_front_of_everything_draws_last() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(0), Vec2::new(0.0, 10.0));
        world.spawn(EntityTypeId(2), Vec2::new(0.0, -10.0));
        world.player_mut().position = Vec2::new(0.0, -50.0);

        let catalog = tagged_catalog();
        let mut surface = RecordingSurface::new();
        render_entities(&world, &mut surface, &view(), &catalog).unwrap();
        assert_eq!(
            surface.blits().last().unwrap().handle,
            catalog.sprite(EntityTypeId::PLAYER).unwrap().handle
        );
    }

    #[test]
    fn equal_depth_draws_static_first() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(0), Vec2::new(0.0, 0.0));

        let catalog = tagged_catalog();
        let mut surface = RecordingSurface::new();
        render_entities(&world, &mut surface, &view(), &catalog).unwrap();
        let order: Vec<_> = surface.blits().iter().map(|b| b.handle).collect();
        let handle = |id| catalog.sprite(EntityTypeId(id)).unwrap().handle;
        assert_eq!(order, vec![handle(0), handle(3)]);
    }

    #[test]
    fn several_movables_merge_in_depth_order() {
        let mut ids = EntityIdAllocator::new();
        let statics = vec![
            Entity::new(&mut ids, EntityTypeId(0), Vec2::new(0.0, 30.0)),
            Entity::new(&mut ids, EntityTypeId(0), Vec2::new(0.0, -30.0)),
        ];
        let a = Entity::player(&mut ids, Vec2::new(0.0, -40.0));
        let b = Entity::player(&mut ids, Vec2::new(0.0, 0.0));
        let c = Entity::player(&mut ids, Vec2::new(0.0, 50.0));

        let mut surface = RecordingSurface::new();
        let n = composite(
            &statics,
            &[&a, &b, &c],
            &mut surface,
            &view(),
            &EntityCatalog::builtin(),
        )
        .unwrap();
        assert_eq!(n, 5);
        // Expected world Y order: c(50) s(30) b(0) s(-30) a(-40).
        let player = EntityCatalog::builtin().sprite(EntityTypeId::PLAYER).unwrap().handle;
        let kinds: Vec<bool> = surface.blits().iter().map(|b| b.handle == player).collect();
        assert_eq!(kinds, vec![true, false, true, false, true]);
    }

    #[test]
    fn culled_entities_are_not_counted() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(0), Vec2::new(0.0, 0.0));
        world.spawn(EntityTypeId(0), Vec2::new(5000.0, 0.0));
        let mut surface = RecordingSurface::new();
        let n = render_entities(&world, &mut surface, &view(), &EntityCatalog::builtin()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn frame_stats_cover_both_passes() {
        let mut world = empty_world(10);
        world.spawn(EntityTypeId(1), Vec2::new(0.0, 20.0));
        let mut surface = RecordingSurface::new();
        let stats = render_frame(
            &world,
            &mut surface,
            &view(),
            &TileCatalog::builtin(64),
            &EntityCatalog::builtin(),
        )
        .unwrap();
        assert_eq!(stats.tiles_rendered, 90);
        assert_eq!(stats.tiles_loaded, 100);
        assert_eq!(stats.entities_rendered, 2);
        assert_eq!(stats.entities_loaded, 1);
        assert_eq!(surface.len(), 92);
        assert_eq!(
            stats.to_string(),
            "Rendered tiles: 90/100\nRendered entities: 2/1"
        );
        // Tiles come first so entities paint over them.
        let tile_handles: Vec<_> = Biome::ALL
            .iter()
            .map(|b| TileCatalog::builtin(64).sprite(*b).unwrap().handle)
            .collect();
        assert!(surface.blits()[..90].iter().all(|b| tile_handles.contains(&b.handle)));
    }
}
