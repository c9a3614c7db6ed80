//! Render hints
//!
//! Drawing stays with the host. These helpers turn simulation output into the
//! shapes the host draws: one dot per cell and two vector overlays on the
//! charge. Colors are left as HSL components.

use crate::kinematics::Charge;
use glam::Vec2;

/// Radius of the charge marker in pixels.
pub const CHARGE_RADIUS: f32 = 10.0;

/// What a cell contributes to a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    pub center: Vec2,
    pub intensity: f32,
    pub intensity_change: f32,
}

/// Size and color of a cell's dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotStyle {
    pub radius: f32,
    /// Degrees; may fall outside [0, 360) and wraps on the host side.
    pub hue: f32,
    /// Percent.
    pub saturation: f32,
    /// Percent.
    pub lightness: f32,
}

impl DotStyle {
    /// Style a dot from its intensity and intensity change.
    ///
    /// Strong samples fill the whole cell; steady ones are red, changing ones
    /// shift toward violet.
    pub fn for_sample(intensity: f32, intensity_change: f32, cell_size: u32) -> Self {
        let color = intensity.min(1.0);
        let raw = 40.0 * intensity;
        let radius = if raw > 20.0 {
            cell_size as f32
        } else if raw > 3.0 {
            raw.round()
        } else {
            raw
        };

        Self {
            radius,
            hue: -20.0 + (1.0 - intensity_change) * 300.0,
            saturation: 20.0 + 80.0 * color,
            lightness: 30.0 + 60.0 * color,
        }
    }
}

impl CellSample {
    pub fn style(&self, cell_size: u32) -> DotStyle {
        DotStyle::for_sample(self.intensity, self.intensity_change, cell_size)
    }
}

/// Line segment from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

/// Velocity and acceleration arrows drawn on the charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorOverlay {
    pub charge: Vec2,
    pub charge_radius: f32,
    pub velocity: Segment,
    /// Drawn at twice the acceleration to stay visible.
    pub acceleration: Segment,
}

impl VectorOverlay {
    pub fn for_charge(charge: &Charge) -> Self {
        Self {
            charge: charge.position,
            charge_radius: CHARGE_RADIUS,
            velocity: Segment {
                start: charge.position,
                end: charge.position + charge.velocity,
            },
            acceleration: Segment {
                start: charge.position,
                end: charge.position + 2.0 * charge.acceleration,
            },
        }
    }
}
