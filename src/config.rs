//! Simulation configuration

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nominal ticks per simulated second.
pub const TICK_RATE_HZ: u32 = 60;

/// Fraction of a tick's velocity applied to the position each step.
pub const TIME_STEP: f32 = 0.05;

/// Per-tick velocity retention once the pointer is released.
pub const DAMPING: f32 = 0.95;

/// Velocity components at or below this magnitude snap to zero.
pub const DEAD_ZONE: f32 = 0.5;

/// The charge never moves faster than this fraction of the propagation speed.
pub const MAX_SPEED_FRACTION: f32 = 0.99;

/// Extra history slots beyond the canvas light-crossing time.
pub const HISTORY_MARGIN: usize = 10;

/// Upper bound on the history capacity.
pub const MAX_EVENTS_SIZE: usize = 1 << 20;

/// Upper bound on the averaging window.
pub const MAX_AVG_TIME: usize = 1024;

/// Upper bound on stored cell intensities (cells x averaging window).
pub const MAX_GRID_VALUES: usize = 1 << 24;

/// Smallest cell-to-charge distance used in the intensity formula.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Frames a cell may reuse its last match when no event satisfies causality.
pub const HOLD_FRAMES: u32 = 5;

/// Canvas size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the canvas diagonal.
    pub fn diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32)
    }

    /// Pixel-rounded center, where the charge starts.
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(
            (self.width as f32 / 2.0).round(),
            (self.height as f32 / 2.0).round(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Canvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Parameters of the field simulation.
///
/// Changing any of them invalidates the history buffers and the grid, so the
/// owning [`Simulation`](crate::Simulation) rebuilds both on every change.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Speed at which field changes travel outward, in pixels per second.
    pub propagation_speed: f32,

    /// Grid spacing in pixels; also the light-cone acceptance tolerance.
    pub cell_size: u32,

    /// Intensity multiplier.
    pub field_magnitude: f32,

    /// Ticks over which acceleration and intensity change are averaged.
    pub avg_time: usize,

    /// Tick rate in Hz (for retarded-time calculations).
    pub tick_rate_hz: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            propagation_speed: 600.0,
            cell_size: 30,
            field_magnitude: 1.0,
            avg_time: 10,
            tick_rate_hz: TICK_RATE_HZ,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration with the default averaging window and tick rate.
    pub fn new(propagation_speed: f32, cell_size: u32, field_magnitude: f32) -> Self {
        Self {
            propagation_speed,
            cell_size,
            field_magnitude,
            ..Self::default()
        }
    }

    pub fn with_avg_time(mut self, avg_time: usize) -> Self {
        self.avg_time = avg_time;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate_hz: u32) -> Self {
        self.tick_rate_hz = tick_rate_hz;
        self
    }

    /// Clamp values into the ranges the controls panel accepts.
    ///
    /// NaN passes through untouched so that [`validate`](Self::validate)
    /// still rejects it.
    pub fn sanitized(mut self) -> Self {
        if self.propagation_speed < 50.0 {
            self.propagation_speed = 50.0;
        }
        self.cell_size = self.cell_size.clamp(5, 1000);
        self.field_magnitude = self.field_magnitude.clamp(0.0, 100.0);
        self
    }

    /// Highest speed the charge may reach.
    pub fn max_speed(&self) -> f32 {
        MAX_SPEED_FRACTION * self.propagation_speed
    }

    /// Distance a field change covers in `ticks` ticks.
    pub fn light_travel(&self, ticks: usize) -> f32 {
        self.propagation_speed * ticks as f32 / self.tick_rate_hz as f32
    }

    /// History capacity needed for a change to cross the whole canvas.
    pub fn events_size(&self, canvas: CanvasSize) -> usize {
        let crossing = canvas.diagonal() / self.propagation_speed * self.tick_rate_hz as f32;
        (crossing.ceil() as usize).saturating_add(HISTORY_MARGIN)
    }

    /// Validate the configuration together with the canvas it will cover.
    pub fn validate_for(&self, canvas: CanvasSize) -> Result<(), ConfigError> {
        self.validate()?;
        canvas.validate()?;
        let events_size = self.events_size(canvas);
        if events_size > MAX_EVENTS_SIZE {
            return Err(ConfigError::HistoryTooLarge(events_size));
        }
        let columns = canvas.width.div_ceil(self.cell_size) as usize;
        let rows = canvas.height.div_ceil(self.cell_size) as usize;
        let values = columns
            .checked_mul(rows)
            .and_then(|cells| cells.checked_mul(self.avg_time))
            .unwrap_or(usize::MAX);
        if values > MAX_GRID_VALUES {
            return Err(ConfigError::GridTooLarge(values));
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.propagation_speed.is_finite() && self.propagation_speed > 0.0) {
            return Err(ConfigError::PropagationSpeed(self.propagation_speed));
        }
        if self.cell_size == 0 {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if !(self.field_magnitude.is_finite() && self.field_magnitude >= 0.0) {
            return Err(ConfigError::FieldMagnitude(self.field_magnitude));
        }
        if !(2..=MAX_AVG_TIME).contains(&self.avg_time) {
            return Err(ConfigError::AvgTime(self.avg_time));
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::TickRate(self.tick_rate_hz));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_events_size() {
        let config = SimulationConfig::default();
        // diagonal of 900x600 is ~1081.67 px; at 600 px/s and 60 Hz that is 108.2 ticks
        assert_eq!(config.events_size(CanvasSize::new(900, 600)), 109 + HISTORY_MARGIN);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            SimulationConfig::new(0.0, 30, 1.0).validate(),
            Err(ConfigError::PropagationSpeed(0.0))
        );
        assert_eq!(
            SimulationConfig::new(600.0, 0, 1.0).validate(),
            Err(ConfigError::CellSize(0))
        );
        assert!(SimulationConfig::new(f32::NAN, 30, 1.0).validate().is_err());
        assert!(SimulationConfig::new(600.0, 30, -1.0).validate().is_err());
        assert_eq!(
            SimulationConfig::default().with_avg_time(1).validate(),
            Err(ConfigError::AvgTime(1))
        );
    }

    #[test]
    fn test_history_limit() {
        let canvas = CanvasSize::new(900, 600);
        let slow = SimulationConfig::new(1e-3, 30, 1.0);
        assert!(matches!(slow.validate_for(canvas), Err(ConfigError::HistoryTooLarge(_))));
        assert!(SimulationConfig::default().validate_for(canvas).is_ok());
        assert!(SimulationConfig::default().validate_for(CanvasSize::new(0, 1)).is_err());
    }

    #[test]
    fn test_averaging_and_grid_limits() {
        let canvas = CanvasSize::new(900, 600);
        let huge = SimulationConfig::default().with_avg_time(usize::MAX / 4);
        assert_eq!(huge.validate_for(canvas), Err(ConfigError::AvgTime(usize::MAX / 4)));

        // 1 px cells on a large canvas with a wide window
        let dense = SimulationConfig::new(600.0, 1, 1.0).with_avg_time(MAX_AVG_TIME);
        assert!(matches!(
            dense.validate_for(CanvasSize::new(4000, 4000)),
            Err(ConfigError::GridTooLarge(_))
        ));
    }

    #[test]
    fn test_sanitized_bounds() {
        let config = SimulationConfig::new(10.0, 2000, 250.0).sanitized();
        assert_eq!(config.propagation_speed, 50.0);
        assert_eq!(config.cell_size, 1000);
        assert_eq!(config.field_magnitude, 100.0);

        let nan = SimulationConfig::new(f32::NAN, 30, 1.0).sanitized();
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_canvas() {
        let canvas = CanvasSize::new(901, 600);
        assert_eq!(canvas.center(), glam::Vec2::new(451.0, 300.0));
        assert!(CanvasSize::new(0, 10).validate().is_err());
    }
}
