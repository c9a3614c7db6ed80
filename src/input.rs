//! Pointer input
//!
//! The host forwards raw mouse and touch events here; the simulation only
//! ever reads [`Pointer::target`].

use glam::Vec2;

/// Primary pointer (left mouse button or first touch).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    position: Vec2,
    pressed: bool,
    device_pixel_ratio: f32,
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Pointer {
    /// Create a released pointer. Page coordinates are multiplied by
    /// `device_pixel_ratio` to land in canvas pixels.
    pub fn new(device_pixel_ratio: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            pressed: false,
            device_pixel_ratio,
        }
    }

    /// Pointer moved to page coordinates `(page_x, page_y)`.
    pub fn move_to(&mut self, page_x: f32, page_y: f32) {
        self.position = Vec2::new(page_x, page_y) * self.device_pixel_ratio;
    }

    /// Button down or touch start.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Button up or touch end.
    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
    }

    /// Position in canvas pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Drive target for the next tick: the position while pressed.
    pub fn target(&self) -> Option<Vec2> {
        self.pressed.then_some(self.position)
    }
}
