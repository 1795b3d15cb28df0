//! Element geometry

/// Axis-aligned rectangle in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Y coordinate of the bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// X coordinate of the right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
