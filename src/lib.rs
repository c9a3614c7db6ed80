//! Retarded Field - electromagnetic field of an accelerating point charge
//!
//! Field changes leave the charge at a finite speed. A sample point far away
//! sees what the charge was doing a while ago, not what it is doing now.
//!
//! # Core Types
//!
//! - **Simulation**: One running visualization; owns everything below
//! - **Integrator**: Pointer-driven motion of the charge
//! - **HistoryBuffer**: Fixed-capacity log of past events, indexed by ticks ago
//! - **Resolver**: Per-cell light-cone search for the causally visible event
//! - **Grid**: Lattice of sample cells with rolling intensity histories
//!
//! # Per-tick flow
//!
//! 1. The integrator steps the charge and pushes a [`KinematicEvent`]
//! 2. Every [`GridCell`] asks the [`Resolver`] which past event it can see
//! 3. The intensity model turns that event and the cell geometry into a number
//! 4. The host reads [`CellSample`]s and draws them
//!
//! In instantaneous mode step 2 always picks the newest event, which is what a
//! field with infinite propagation speed would show.
//!
//! # Example
//!
//! ```rust
//! use retarded_field::{CanvasSize, Pointer, Simulation, SimulationConfig, StepOutcome};
//!
//! let mut sim = Simulation::new(SimulationConfig::new(600.0, 30, 1.0));
//! sim.configure(SimulationConfig::new(600.0, 30, 1.0), CanvasSize::new(900, 600))
//!     .expect("valid configuration");
//!
//! // The host forwards pointer events...
//! let mut pointer = Pointer::new(1.0);
//! pointer.move_to(550.0, 300.0);
//! pointer.press();
//!
//! // ...and calls `frame` once per display refresh.
//! assert_eq!(sim.frame(pointer.target()), Ok(StepOutcome::Advanced));
//!
//! let charge = sim.charge().expect("configured");
//! assert_eq!(charge.velocity.x, 100.0);
//!
//! for sample in sim.samples() {
//!     let _dot = sample.style(sim.config().cell_size);
//!     // draw a dot at sample.center
//! }
//! ```
//!
//! # Not a Maxwell solver
//!
//! Intensities come from `|sin(angle)| * |a| / distance`, a visual proxy for
//! dipole radiation. They are not in physical units.

mod config;
mod error;
mod grid;
mod history;
mod input;
mod intensity;
mod kinematics;
mod observer;
mod photon;
mod render;
mod resolver;
mod simulation;

pub use config::{
    CanvasSize, SimulationConfig, DAMPING, DEAD_ZONE, HISTORY_MARGIN, HOLD_FRAMES, MAX_AVG_TIME,
    MAX_EVENTS_SIZE, MAX_GRID_VALUES, MAX_SPEED_FRACTION, MIN_DISTANCE, TICK_RATE_HZ, TIME_STEP,
};
pub use error::{ConfigError, Result, SimulationError};
pub use grid::{Grid, GridCell};
pub use history::HistoryBuffer;
pub use input::Pointer;
pub use intensity::{field_intensity, intensity_change, Observation};
pub use kinematics::{clamp_speed, Charge, Integrator, KinematicEvent};
pub use observer::{ChannelObserver, FnObserver, SimulationEvent, SimulationObserver};
pub use photon::PhotonPulse;
pub use render::{CellSample, DotStyle, Segment, VectorOverlay, CHARGE_RADIUS};
pub use resolver::{Resolution, Resolver, SearchWindow};
pub use simulation::{FrameStats, Simulation, SimulationState, StepOutcome};

// Vector type used throughout the public API
pub use glam::Vec2;
