//! Field intensity model
//!
//! The intensity is a visualization proxy, not a field in physical units:
//!
//! ```text
//! intensity = magnitude_scale * |sin(observation_angle - acceleration_angle)| * |a| / distance
//! ```
//!
//! The sine term gives the dipole-like angular pattern (no radiation along the
//! acceleration axis) and `1 / distance` the radial falloff.

use crate::config::MIN_DISTANCE;
use crate::history::HistoryBuffer;
use crate::kinematics::KinematicEvent;
use glam::Vec2;

/// Geometry from a recorded charge position to a sample point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    /// Vector from the charge position to the sample point.
    pub offset: Vec2,
    /// Distance, never below [`MIN_DISTANCE`].
    pub distance: f32,
    /// True when the raw distance had to be clamped.
    pub degenerate: bool,
}

impl Observation {
    pub fn between(sample: Vec2, charge_position: Vec2) -> Self {
        let offset = sample - charge_position;
        let raw = offset.length();
        let degenerate = !(raw >= MIN_DISTANCE);
        if degenerate {
            tracing::trace!(x = sample.x, y = sample.y, "sample coincides with charge, clamping distance");
        }
        Self {
            offset,
            distance: if degenerate { MIN_DISTANCE } else { raw },
            degenerate,
        }
    }

    /// Direction of the offset as `atan2(x, y)`, the convention used for
    /// event angles.
    pub fn angle(&self) -> f32 {
        self.offset.x.atan2(self.offset.y)
    }
}

/// Intensity seen along `observation` for a charge undergoing `event`.
pub fn field_intensity(observation: &Observation, event: &KinematicEvent, field_magnitude: f32) -> f32 {
    let sine = (observation.angle() - event.angle).sin().abs();
    field_magnitude * sine * event.magnitude / observation.distance
}

/// `|newest - oldest| / max(history)`, or 0 when the history peak is 0.
pub fn intensity_change(history: &HistoryBuffer<f32>) -> f32 {
    let (Some(&newest), Some(&oldest)) = (history.newest(), history.oldest()) else {
        return 0.0;
    };
    let peak = history.max();
    if peak > 0.0 {
        (newest - oldest).abs() / peak
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(acceleration: Vec2) -> KinematicEvent {
        KinematicEvent::new(Vec2::ZERO, acceleration, 1)
    }

    #[test]
    fn test_perpendicular_is_strongest() {
        // acceleration along +x, observer along +y
        let obs = Observation::between(Vec2::new(0.0, 100.0), Vec2::ZERO);
        let value = field_intensity(&obs, &event(Vec2::new(5.0, 0.0)), 2.0);
        assert!((value - 2.0 * 5.0 / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_radiation_along_axis() {
        let obs = Observation::between(Vec2::new(100.0, 0.0), Vec2::ZERO);
        let value = field_intensity(&obs, &event(Vec2::new(5.0, 0.0)), 1.0);
        assert!(value.abs() < 1e-6);

        // behind the charge as well
        let obs = Observation::between(Vec2::new(-100.0, 0.0), Vec2::ZERO);
        assert!(field_intensity(&obs, &event(Vec2::new(5.0, 0.0)), 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_distance_stays_finite() {
        let obs = Observation::between(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0));
        assert!(obs.degenerate);
        assert_eq!(obs.distance, MIN_DISTANCE);
        assert!(field_intensity(&obs, &event(Vec2::new(1.0, 1.0)), 1.0).is_finite());
    }

    #[test]
    fn test_change_against_oldest() {
        let mut history = HistoryBuffer::filled(3, 0.0f32);
        history.push(1.0);
        history.push(2.0);
        // newest 2, oldest 0, peak 2
        assert!((intensity_change(&history) - 1.0).abs() < 1e-6);

        history.push(2.0);
        // newest 2, oldest 1, peak 2
        assert!((intensity_change(&history) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_change_with_flat_history() {
        let history = HistoryBuffer::filled(5, 0.0f32);
        assert_eq!(intensity_change(&history), 0.0);
    }
}
