use glam::{UVec2, Vec2};

/// Camera and window configuration for one frame.
///
/// `camera` is a screen-space offset: a camera following an entity at
/// world `(x, y)` sits at `(x, -y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub camera: Vec2,
    /// Window size in pixels.
    pub viewport: UVec2,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            camera: Vec2::ZERO,
            viewport: UVec2::new(1920, 1080),
        }
    }
}

impl RenderView {
    pub fn new(camera: Vec2, viewport: UVec2) -> Self {
        Self { camera, viewport }
    }

    /// Camera position that centers the view on world point `target`.
    pub fn following(target: Vec2, viewport: UVec2) -> Self {
        Self::new(Vec2::new(target.x, -target.y), viewport)
    }

    /// Window center, halved on whole pixels.
    pub fn center(&self) -> Vec2 {
        (self.viewport / 2).as_vec2()
    }
}

/// Top-left screen corner of a sprite anchored bottom-middle at world `position`.
pub fn entity_screen_position(position: Vec2, extent: Vec2, view: &RenderView) -> Vec2 {
    let center = view.center();
    Vec2::new(
        position.x + center.x - view.camera.x - extent.x / 2.0,
        -position.y + center.y - view.camera.y - extent.y,
    )
}

/// Top-left screen corner of tile (`row`, `col`) in a map of `map_size` tiles.
///
/// Row indices grow with world Y, so rows are flipped onto the screen.
pub fn tile_screen_position(
    row: usize,
    col: usize,
    map_size: usize,
    tile_size: u32,
    view: &RenderView,
) -> Vec2 {
    let center = view.center();
    let half = (map_size / 2) as f32;
    let tile = tile_size as f32;
    Vec2::new(
        tile * (col as f32 - half) + center.x - view.camera.x,
        -tile * (row as f32 - half) + center.y - view.camera.y,
    )
}

/// Whether a rectangle at `screen` of size `extent` may touch the viewport.
///
/// Only the corner is tested against `[-extent, viewport]` per axis.
pub fn is_on_screen(screen: Vec2, extent: Vec2, view: &RenderView) -> bool {
    let size = view.viewport.as_vec2();
    axis_on_screen(screen.x, extent.x, size.x) && axis_on_screen(screen.y, extent.y, size.y)
}

pub(crate) fn axis_on_screen(corner: f32, extent: f32, size: f32) -> bool {
    corner >= -extent && corner <= size
}
