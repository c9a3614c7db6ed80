//! Kinematics - pointer-driven motion of the charge and its event log

use crate::config::{SimulationConfig, DAMPING, DEAD_ZONE, TIME_STEP};
use crate::history::HistoryBuffer;
use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The moving point charge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Charge {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Charge {
    /// A charge at rest at `position`.
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

/// Snapshot of the charge at one past tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicEvent {
    /// Charge position after the tick's step.
    pub position: Vec2,
    /// Averaged acceleration at that tick.
    pub acceleration: Vec2,
    /// Length of `acceleration`.
    pub magnitude: f32,
    /// Direction of `acceleration` as `atan2(x, y)`.
    pub angle: f32,
    /// Simulation tick that recorded the event.
    pub tick: u64,
}

impl KinematicEvent {
    pub fn new(position: Vec2, acceleration: Vec2, tick: u64) -> Self {
        Self {
            position,
            acceleration,
            magnitude: acceleration.length(),
            angle: acceleration.x.atan2(acceleration.y),
            tick,
        }
    }

    /// A motionless event, used to seed fresh buffers.
    pub fn at_rest(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO, 0)
    }
}

/// Advances the charge one tick at a time and records what it did.
///
/// The drive is a snap-to-target controller rather than an inertial force:
/// while the pointer is down the velocity is simply the offset to it.
#[derive(Clone, Debug)]
pub struct Integrator {
    charge: Charge,

    /// Most recent velocities, length `avg_time`.
    velocities: HistoryBuffer<Vec2>,

    /// Past events, length `events_size`.
    events: HistoryBuffer<KinematicEvent>,

    max_speed: f32,

    tick_count: u64,
}

impl Integrator {
    /// Create an integrator with the charge at rest at `start` and every
    /// buffer seeded with that state, so the first frame has no discontinuity.
    pub fn new(config: &SimulationConfig, start: Vec2, events_size: usize) -> Self {
        Self {
            charge: Charge::at_rest(start),
            velocities: HistoryBuffer::filled(config.avg_time, Vec2::ZERO),
            events: HistoryBuffer::filled(events_size, KinematicEvent::at_rest(start)),
            max_speed: config.max_speed(),
            tick_count: 0,
        }
    }

    // =========================================================================
    // TIME ADVANCEMENT
    // =========================================================================

    /// Advance one tick toward `target` (or coast when `None`).
    pub fn step(&mut self, target: Option<Vec2>) -> KinematicEvent {
        self.tick_count += 1;

        let velocity = match target {
            Some(target) => target - self.charge.position,
            None => Vec2::new(coast(self.charge.velocity.x), coast(self.charge.velocity.y)),
        };
        let velocity = clamp_speed(velocity, self.max_speed);

        self.velocities.push(velocity);
        self.charge.acceleration = self.averaged_acceleration();
        self.charge.velocity = velocity;
        self.charge.position += TIME_STEP * velocity;

        let event = KinematicEvent::new(
            self.charge.position,
            self.charge.acceleration,
            self.tick_count,
        );
        self.events.push(event);
        event
    }

    /// Finite difference across the velocity window.
    fn averaged_acceleration(&self) -> Vec2 {
        match (self.velocities.newest(), self.velocities.oldest()) {
            (Some(newest), Some(oldest)) => {
                (*newest - *oldest) / (self.velocities.len() as f32 - 1.0).max(1.0)
            }
            _ => Vec2::ZERO,
        }
    }

    // =========================================================================
    // READING
    // =========================================================================

    pub fn charge(&self) -> &Charge {
        &self.charge
    }

    pub fn events(&self) -> &HistoryBuffer<KinematicEvent> {
        &self.events
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Damped velocity component once the drive is released.
fn coast(v: f32) -> f32 {
    if v.abs() > DEAD_ZONE {
        DAMPING * v
    } else {
        0.0
    }
}

/// Rescale `velocity` to at most `max_speed`, keeping its direction.
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    // hypot does not overflow for large finite components
    let speed = velocity.x.hypot(velocity.y);
    if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}
