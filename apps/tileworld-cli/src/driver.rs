use glam::{UVec2, Vec2};
use tileworld_kernel::World;
use tileworld_render::RenderView;

/// Player speed in world units per second while a move key is held.
pub const PLAYER_SPEED: f32 = 200.0;
/// Free camera step in pixels per frame.
pub const CAMERA_STEP: f32 = 10.0;
/// Free camera step multiplier while the fast key is held.
pub const FAST_FACTOR: f32 = 4.0;

/// Keys held during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    pub up: bool,
    pub left: bool,
    pub down: bool,
    pub right: bool,
    pub fast: bool,
}

impl Input {
    /// Unit direction in world space (Y up).
    fn world_direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y += 1.0;
        }
        if self.down {
            dir.y -= 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Frame-loop driver state: where the camera is and how big the window is.
#[derive(Debug, Clone)]
pub struct Driver {
    camera: Vec2,
    viewport: UVec2,
}

impl Driver {
    pub fn new(viewport: UVec2) -> Self {
        Self {
            camera: Vec2::ZERO,
            viewport,
        }
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    /// Apply one frame of input, advance the world by `dt` and return the view to render.
    ///
    /// A locked camera steers the player and follows it. An unlocked camera
    /// stops the player and pans on its own, in screen space.
    pub fn frame(&mut self, world: &mut World, input: &Input, dt: f32) -> RenderView {
        let dir = input.world_direction();
        if world.camera_locked() {
            world.set_player_velocity(dir * PLAYER_SPEED);
            world.update_entities(dt);
            let p = world.player().position;
            self.camera = Vec2::new(p.x, -p.y);
        } else {
            world.set_player_velocity(Vec2::ZERO);
            world.update_entities(dt);
            let step = if input.fast {
                CAMERA_STEP * FAST_FACTOR
            } else {
                CAMERA_STEP
            };
            self.camera += Vec2::new(dir.x, -dir.y) * step;
        }
        RenderView::new(self.camera, self.viewport)
    }
}
