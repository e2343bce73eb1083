use glam::Vec2;
use tileworld_assets::{Sprite, SpriteHandle};

/// Something sprites can be drawn onto.
pub trait Surface {
    /// Draw `sprite` with its top-left corner at `screen` (pixels, Y down).
    fn blit(&mut self, sprite: &Sprite, screen: Vec2);
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    pub handle: SpriteHandle,
    pub position: Vec2,
}

/// Surface that only records draw calls, in order.
///
/// Used by headless tooling and tests to observe culling and paint order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    blits: Vec<Blit>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blits(&self) -> &[Blit] {
        &self.blits
    }

    pub fn len(&self) -> usize {
        self.blits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blits.is_empty()
    }

    /// Forget every recorded call, e.g. between frames.
    pub fn clear(&mut self) {
        self.blits.clear();
    }
}

impl Surface for RecordingSurface {
    fn blit(&mut self, sprite: &Sprite, screen: Vec2) {
        self.blits.push(Blit {
            handle: sprite.handle,
            position: screen,
        });
    }
}
