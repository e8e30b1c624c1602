//! Camera (scroll position) over the projected view
//!
//! Tracks which slice of the content is visible and keeps the position
//! inside `[0, content_height - view_height]`.

/// Scroll state in logical units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    /// Offset of the top edge of the viewport
    pub position: usize,
    /// Height of the viewport
    pub view_height: usize,
}

impl Camera {
    pub fn new(view_height: usize) -> Self {
        Self {
            position: 0,
            view_height,
        }
    }

    /// Largest valid position for the given content height
    pub fn max_position(&self, content_height: usize) -> usize {
        content_height.saturating_sub(self.view_height)
    }

    /// Clamp the position into range
    pub fn clamp(&mut self, content_height: usize) {
        self.position = self.position.min(self.max_position(content_height));
    }

    /// Set the position, clamped into range
    pub fn set_position(&mut self, position: usize, content_height: usize) {
        self.position = position;
        self.clamp(content_height);
    }

    /// Scroll by a signed amount, clamped into range
    pub fn scroll_by(&mut self, delta: isize, content_height: usize) {
        let position = self.position.saturating_add_signed(delta);
        self.set_position(position, content_height);
    }

    /// Whether `[head, head + height]` lies inside the viewport after
    /// reserving `reserved` units at its top
    pub fn shows(&self, head: usize, height: usize, reserved: usize) -> bool {
        let top = self.position + reserved;
        let bottom = self.position + self.view_height;
        head >= top && head + height <= bottom
    }

    /// The visible window `[position, position + view_height)`
    pub fn window(&self) -> (usize, usize) {
        (self.position, self.position + self.view_height)
    }
}
