//! Mapping from the top-left layout space onto a template page's bottom-left PDF space.

use crate::forms::layout::Rect;

/// Default page size used when a template page carries no MediaBox.
pub const LETTER_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Uniform mapping of a fixed-width container onto a page's MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    left: f32,
    top: f32,
    scale: f32,
}

impl PageFrame {
    /// `media_box` is `[x0, y0, x1, y1]`; the container spans the full page width.
    pub fn new(media_box: [f32; 4], container_width: f32) -> Self {
        let [x0, y0, x1, y1] = media_box;
        let (left, right) = (x0.min(x1), x0.max(x1));
        let top = y0.max(y1);
        let width = right - left;
        let scale = if container_width > 0.0 && width > 0.0 {
            width / container_width
        } else {
            1.0
        };
        Self { left, top, scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn length(&self, value: f32) -> f32 {
        value * self.scale
    }

    pub fn x(&self, x: f32) -> f32 {
        self.left + x * self.scale
    }

    pub fn y(&self, y: f32) -> f32 {
        self.top - y * self.scale
    }

    /// Bottom-left corner plus size, ready for an `re` operator.
    pub fn rect(&self, rect: Rect) -> [f32; 4] {
        [
            self.x(rect.x),
            self.y(rect.bottom()),
            self.length(rect.width),
            self.length(rect.height),
        ]
    }
}
