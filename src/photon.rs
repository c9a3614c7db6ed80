//! Photon pulse - the light strip shown beside the controls
//!
//! A stylized marker that slides along a strip at the propagation speed,
//! giving a visual reference for how fast field changes travel.

use crate::config::TICK_RATE_HZ;
use crate::error::ConfigError;
use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct PhotonPulse {
    x: f32,
    speed: f32,
    width: f32,
    baseline: f32,
}

impl PhotonPulse {
    /// Pulse at the left edge of a `width x height` strip.
    pub fn new(speed: f32, width: u32, height: u32) -> Result<Self, ConfigError> {
        let mut pulse = Self {
            x: 0.0,
            speed: 0.0,
            width: 1.0,
            baseline: 0.0,
        };
        pulse.reconfigure(speed, width, height)?;
        Ok(pulse)
    }

    /// Change speed and strip size, keeping the pulse's place on the strip.
    pub fn reconfigure(&mut self, speed: f32, width: u32, height: u32) -> Result<(), ConfigError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::PropagationSpeed(speed));
        }
        if width == 0 || height == 0 {
            return Err(ConfigError::Canvas { width, height });
        }
        self.speed = speed;
        self.width = width as f32;
        self.baseline = (height as f32 / 2.0).round();
        self.x %= self.width;
        Ok(())
    }

    /// Advance by one tick's travel, wrapping at the strip end.
    pub fn tick(&mut self) {
        self.x = (self.x + self.speed / TICK_RATE_HZ as f32) % self.width;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Outline of the strip sampled every `step` pixels, as points above the
    /// baseline. The displacement grows with wrapped distance from the pulse.
    pub fn profile(&self, step: usize) -> Vec<Vec2> {
        (0..self.width as usize)
            .step_by(step.max(1))
            .map(|i| {
                let i = i as f32;
                let distance = (self.x - i).abs();
                let wrapped = distance.min(self.width - distance);
                let value = (4.0 * wrapped / self.width).powi(3);
                Vec2::new(i, self.baseline - value)
            })
            .collect()
    }
}
