//! Layout data types for page composition
//!
//! These types represent the geometric results computed before anything is
//! drawn into the output document.

use crate::types::Orientation;

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle, within `epsilon`
    pub fn contains(&self, other: &Rect, epsilon: f32) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.top() <= self.top() + epsilon
    }
}

/// Destination page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
}

/// Where the header label goes on a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderPosition {
    /// Left edge of the text run
    pub x: f32,
    /// Text baseline
    pub y: f32,
    pub text_width: f32,
}

/// Final placement of one source unit on a destination page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Area available for content (inside margins, below the header band)
    pub content_box: Rect,
    /// Where the scaled source lands, centered in `content_box`
    pub content_rect: Rect,
    /// Uniform scale factor applied to the source
    pub scale: f32,
}
