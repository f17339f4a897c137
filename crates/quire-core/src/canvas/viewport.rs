//! Pan and zoom transform between screen and scene

use serde::{Deserialize, Serialize};

use super::geometry::Position;

/// Scale change per wheel notch
pub const ZOOM_FACTOR: f64 = 1.02;

/// Stage transform: `screen = scene * scale + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Visible stage size in screen pixels
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            width,
            height,
        }
    }

    pub fn to_scene(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.x) / self.scale,
            (screen.y - self.y) / self.scale,
        )
    }

    pub fn to_screen(&self, scene: Position) -> Position {
        Position::new(scene.x * self.scale + self.x, scene.y * self.scale + self.y)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Zoom one step about the pointer, keeping the scene point under it fixed
    ///
    /// Scrolling up (`delta_y <= 0`) zooms in.
    pub fn zoom_at(&mut self, pointer: Position, delta_y: f64) {
        let anchor = self.to_scene(pointer);
        self.scale = if delta_y <= 0.0 {
            self.scale * ZOOM_FACTOR
        } else {
            self.scale / ZOOM_FACTOR
        };
        self.x = pointer.x - anchor.x * self.scale;
        self.y = pointer.y - anchor.y * self.scale;
    }

    /// Reset to scale 1 with `target` in the middle of the stage
    pub fn center_on(&mut self, target: Position) {
        self.scale = 1.0;
        self.x = self.width / 2.0 - target.x;
        self.y = self.height / 2.0 - target.y;
    }
}
