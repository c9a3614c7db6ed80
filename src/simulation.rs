//! Simulation - one running field visualization
//!
//! Owns the charge, its event history and the grid, and is the only writer of
//! any of them. The host drives it with one [`frame`](Simulation::frame) call
//! per display refresh and reads positions and intensities back out between
//! calls.
//!
//! ```text
//! Uninitialized --configure--> Ready --configure/resize--> Ready
//!                                 \--dispose--> Disposed --configure--> Ready
//! ```

use crate::config::{CanvasSize, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::grid::Grid;
use crate::history::HistoryBuffer;
use crate::intensity::{field_intensity, Observation};
use crate::kinematics::{Charge, Integrator, KinematicEvent};
use crate::observer::{SimulationEvent, SimulationObserver};
use crate::render::{CellSample, VectorOverlay};
use crate::resolver::{Resolution, Resolver};
use glam::Vec2;
use std::sync::Arc;

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    /// No canvas size reported yet.
    Uninitialized,
    /// Grid and history built; ticks do work.
    Ready,
    /// Torn down by the host; needs `configure` before ticking again.
    Disposed,
}

/// Whether a frame or single-step call advanced the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Skipped,
}

/// How the cells resolved during the last tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub matched: usize,
    pub instantaneous: usize,
    pub held: usize,
    pub unresolved: usize,
    /// Samples whose distance to the charge had to be clamped.
    pub degenerate: usize,
}

/// State rebuilt from scratch on every reconfiguration.
#[derive(Clone, Debug)]
struct Engine {
    integrator: Integrator,
    grid: Grid,
    resolver: Resolver,
}

impl Engine {
    fn build(config: &SimulationConfig, canvas: CanvasSize, relativistic: bool) -> Self {
        let events_size = config.events_size(canvas);
        let mut resolver = Resolver::new(config, events_size);
        resolver.set_relativistic(relativistic);

        Self {
            integrator: Integrator::new(config, canvas.center(), events_size),
            grid: Grid::new(canvas, config.cell_size, config.avg_time),
            resolver,
        }
    }

    /// Resolve and record every cell against the current history.
    fn update_cells(&mut self, field_magnitude: f32) -> FrameStats {
        let Engine {
            integrator,
            grid,
            resolver,
        } = self;
        let events = integrator.events();
        let mut stats = FrameStats::default();

        for cell in grid.iter_mut() {
            let resolution = resolver.resolve(cell, events);
            match resolution {
                Resolution::Matched { .. } => stats.matched += 1,
                Resolution::Instantaneous { .. } => stats.instantaneous += 1,
                Resolution::Held { .. } => stats.held += 1,
                Resolution::Unresolved => stats.unresolved += 1,
            }

            let value = match resolution.event() {
                Some(event) => {
                    let observation = Observation::between(cell.center, event.position);
                    if observation.degenerate {
                        stats.degenerate += 1;
                    }
                    field_intensity(&observation, event, field_magnitude)
                }
                None => 0.0,
            };
            cell.record_intensity(value);
        }

        stats
    }
}

/// A retarded-field simulation instance.
pub struct Simulation {
    config: SimulationConfig,
    canvas: Option<CanvasSize>,
    state: SimulationState,
    engine: Option<Engine>,
    relativistic: bool,
    running: bool,
    /// Set once a tick failure has been reported to observers.
    fault_reported: bool,
    stats: FrameStats,
    observers: Vec<Arc<dyn SimulationObserver>>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("canvas", &self.canvas)
            .field("state", &self.state)
            .field("relativistic", &self.relativistic)
            .field("running", &self.running)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Simulation {
    /// Create an unconfigured simulation. Nothing is built until the first
    /// canvas size arrives through [`configure`](Self::configure) or
    /// [`resize`](Self::resize).
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            canvas: None,
            state: SimulationState::Uninitialized,
            engine: None,
            relativistic: true,
            running: true,
            fault_reported: false,
            stats: FrameStats::default(),
            observers: Vec::new(),
        }
    }

    /// Subscribe an observer to lifecycle and failure events.
    pub fn subscribe(&mut self, observer: Arc<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: SimulationEvent) {
        for observer in &self.observers {
            observer.on_event(event.clone());
        }
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Rebuild history and grid for `config` on `canvas` and re-center the
    /// charge. Invalid input leaves the simulation untouched.
    pub fn configure(&mut self, config: SimulationConfig, canvas: CanvasSize) -> Result<()> {
        config.validate_for(canvas)?;

        let engine = Engine::build(&config, canvas, self.relativistic);
        let (columns, rows) = (engine.grid.columns(), engine.grid.rows());
        let events_size = engine.resolver.events_size();

        self.engine = Some(engine);
        self.config = config;
        self.canvas = Some(canvas);
        self.state = SimulationState::Ready;
        self.stats = FrameStats::default();
        self.fault_reported = false;
        self.resume();

        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            columns,
            rows,
            events_size,
            propagation_speed = self.config.propagation_speed,
            "field simulation configured"
        );
        self.notify(SimulationEvent::Configured {
            columns,
            rows,
            events_size,
        });
        Ok(())
    }

    /// Rebuild for a new canvas size with the current configuration.
    pub fn resize(&mut self, canvas: CanvasSize) -> Result<()> {
        self.configure(self.config.clone(), canvas)
    }

    /// Apply a new configuration on the current canvas. Before the first
    /// canvas size is known the configuration is only validated and stored.
    pub fn update_config(&mut self, config: SimulationConfig) -> Result<()> {
        match self.canvas {
            Some(canvas) => self.configure(config, canvas),
            None => {
                config.validate()?;
                self.config = config;
                Ok(())
            }
        }
    }

    /// Drop grid and history. Ticks fail until the next `configure`.
    pub fn dispose(&mut self) {
        self.engine = None;
        self.canvas = None;
        self.state = SimulationState::Disposed;
        self.running = false;
        tracing::debug!("field simulation disposed");
    }

    // =========================================================================
    // TIME ADVANCEMENT
    // =========================================================================

    /// Advance one tick toward `target` (pointer position while pressed).
    ///
    /// Runs regardless of the run flag; [`frame`](Self::frame) and
    /// [`single_step`](Self::single_step) are the flag-aware entry points.
    pub fn tick(&mut self, target: Option<Vec2>) -> Result<()> {
        if let Some(target) = target {
            if !target.is_finite() {
                return Err(SimulationError::NonFiniteInput {
                    x: target.x,
                    y: target.y,
                });
            }
        }
        let engine = self.engine.as_mut().ok_or(SimulationError::NotConfigured)?;

        engine.integrator.step(target);
        if !engine.integrator.charge().is_finite() {
            return Err(SimulationError::NonFiniteState {
                tick: engine.integrator.tick_count(),
            });
        }

        self.stats = engine.update_cells(self.config.field_magnitude);
        Ok(())
    }

    /// Per-refresh callback. Does nothing while paused; a failing tick pauses
    /// the simulation and is reported to observers once.
    pub fn frame(&mut self, target: Option<Vec2>) -> Result<StepOutcome> {
        if !self.running {
            return Ok(StepOutcome::Skipped);
        }
        self.advance(target)
    }

    /// Force exactly one tick while paused. No-op while running.
    pub fn single_step(&mut self, target: Option<Vec2>) -> Result<StepOutcome> {
        if self.running {
            return Ok(StepOutcome::Skipped);
        }
        self.advance(target)
    }

    fn advance(&mut self, target: Option<Vec2>) -> Result<StepOutcome> {
        match self.tick(target) {
            Ok(()) => Ok(StepOutcome::Advanced),
            Err(err) => {
                self.pause();
                if !self.fault_reported {
                    self.fault_reported = true;
                    tracing::error!(error = %err, "tick failed, simulation paused");
                    self.notify(SimulationEvent::TickFailed {
                        reason: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // RUN CONTROL
    // =========================================================================

    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!("field simulation paused");
            self.notify(SimulationEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if !self.running {
            self.running = true;
            self.fault_reported = false;
            tracing::debug!("field simulation resumed");
            self.notify(SimulationEvent::Resumed);
        }
    }

    pub fn toggle_running(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switch between retarded (`true`) and instantaneous fields. Cell
    /// histories are cleared either way; the charge is left alone.
    pub fn set_relativistic(&mut self, enabled: bool) {
        self.relativistic = enabled;
        if let Some(engine) = self.engine.as_mut() {
            engine.resolver.set_relativistic(enabled);
            engine.grid.reset_cells();
        }
        tracing::debug!(relativistic = enabled, "field mode changed");
        self.notify(SimulationEvent::ModeChanged {
            relativistic: enabled,
        });
    }

    pub fn toggle_relativistic(&mut self) {
        self.set_relativistic(!self.relativistic);
    }

    pub fn is_relativistic(&self) -> bool {
        self.relativistic
    }

    // =========================================================================
    // READING
    // =========================================================================

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn canvas(&self) -> Option<CanvasSize> {
        self.canvas
    }

    pub fn charge(&self) -> Option<&Charge> {
        self.engine.as_ref().map(|e| e.integrator.charge())
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.engine.as_ref().map(|e| &e.grid)
    }

    /// Recorded events, newest first.
    pub fn history(&self) -> Option<&HistoryBuffer<KinematicEvent>> {
        self.engine.as_ref().map(|e| e.integrator.events())
    }

    pub fn events_size(&self) -> Option<usize> {
        self.engine.as_ref().map(|e| e.resolver.events_size())
    }

    /// Ticks since the last reconfiguration.
    pub fn tick_count(&self) -> u64 {
        self.engine
            .as_ref()
            .map_or(0, |e| e.integrator.tick_count())
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Per-cell output for the renderer.
    pub fn samples(&self) -> impl Iterator<Item = CellSample> + '_ {
        self.grid().into_iter().flat_map(|grid| {
            grid.iter().map(|cell| CellSample {
                center: cell.center,
                intensity: cell.intensity(),
                intensity_change: cell.intensity_change(),
            })
        })
    }

    /// Velocity and acceleration arrows for the current charge.
    pub fn overlay(&self) -> Option<VectorOverlay> {
        self.charge().map(VectorOverlay::for_charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::observer::ChannelObserver;
    use std::sync::mpsc;

    fn configured() -> Simulation {
        let mut sim = Simulation::default();
        sim.configure(SimulationConfig::default(), CanvasSize::new(900, 600))
            .unwrap();
        sim
    }

    #[test]
    fn test_new_is_uninitialized() {
        let mut sim = Simulation::default();
        assert_eq!(sim.state(), SimulationState::Uninitialized);
        assert!(sim.charge().is_none());
        assert_eq!(sim.samples().count(), 0);
        assert_eq!(sim.tick(None), Err(SimulationError::NotConfigured));
    }

    #[test]
    fn test_configure_builds_everything() {
        let sim = configured();
        assert_eq!(sim.state(), SimulationState::Ready);
        assert!(sim.is_running());
        assert_eq!(sim.events_size(), Some(119));
        assert_eq!(sim.history().map(|h| h.len()), Some(119));

        let grid = sim.grid().unwrap();
        assert_eq!((grid.columns(), grid.rows()), (30, 20));
        assert_eq!(sim.charge().unwrap().position, Vec2::new(450.0, 300.0));
    }

    #[test]
    fn test_invalid_config_changes_nothing() {
        let mut sim = configured();
        sim.tick(Some(Vec2::new(500.0, 300.0))).unwrap();
        let before = *sim.charge().unwrap();

        let err = sim
            .configure(SimulationConfig::new(-1.0, 30, 1.0), CanvasSize::new(100, 100))
            .unwrap_err();
        assert_eq!(err, SimulationError::InvalidConfig(ConfigError::PropagationSpeed(-1.0)));
        assert_eq!(*sim.charge().unwrap(), before);
        assert_eq!(sim.canvas(), Some(CanvasSize::new(900, 600)));
        assert_eq!(sim.tick_count(), 1);

        let err = sim
            .configure(
                SimulationConfig::default().with_avg_time(usize::MAX / 4),
                CanvasSize::new(900, 600),
            )
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::InvalidConfig(ConfigError::AvgTime(usize::MAX / 4))
        );
        assert_eq!(*sim.charge().unwrap(), before);
        assert_eq!(sim.config().avg_time, SimulationConfig::default().avg_time);
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let mut sim = configured();
        let err = sim.tick(Some(Vec2::new(f32::NAN, 0.0))).unwrap_err();
        assert!(matches!(err, SimulationError::NonFiniteInput { .. }));
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn test_frame_respects_run_flag() {
        let mut sim = configured();
        assert_eq!(sim.frame(None), Ok(StepOutcome::Advanced));

        sim.pause();
        assert_eq!(sim.frame(None), Ok(StepOutcome::Skipped));
        assert_eq!(sim.tick_count(), 1);

        assert_eq!(sim.single_step(None), Ok(StepOutcome::Advanced));
        assert_eq!(sim.tick_count(), 2);
        assert!(!sim.is_running());

        sim.resume();
        assert_eq!(sim.single_step(None), Ok(StepOutcome::Skipped));
    }

    #[test]
    fn test_failure_pauses_and_reports_once() {
        let (tx, rx) = mpsc::channel();
        let mut sim = Simulation::default();
        sim.subscribe(Arc::new(ChannelObserver::new(tx)));

        assert!(sim.frame(None).is_err());
        assert!(!sim.is_running());
        assert!(sim.single_step(None).is_err());

        let events: Vec<_> = rx.try_iter().collect();
        let failures = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::TickFailed { .. }))
            .count();
        assert_eq!(failures, 1);
        assert!(events.contains(&SimulationEvent::Paused));

        sim.configure(SimulationConfig::default(), CanvasSize::new(900, 600))
            .unwrap();
        assert!(sim.is_running());
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&SimulationEvent::Resumed));
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::Configured { .. })));
    }

    #[test]
    fn test_mode_switch_resets_cells_only() {
        let mut sim = configured();
        for _ in 0..20 {
            sim.tick(Some(Vec2::new(600.0, 400.0))).unwrap();
        }
        let charge = *sim.charge().unwrap();
        assert!(sim.samples().any(|s| s.intensity > 0.0));

        sim.set_relativistic(false);
        assert_eq!(*sim.charge().unwrap(), charge);
        assert!(sim.samples().all(|s| s.intensity == 0.0));
        assert!(sim
            .grid()
            .unwrap()
            .iter()
            .all(|c| c.last_event_index().is_none()));
    }

    #[test]
    fn test_instantaneous_mode_counts() {
        let mut sim = configured();
        sim.set_relativistic(false);
        sim.tick(None).unwrap();
        let stats = sim.last_frame_stats();
        assert_eq!(stats.instantaneous, 600);
        assert_eq!(stats.matched + stats.held + stats.unresolved, 0);
    }

    #[test]
    fn test_update_config_before_canvas() {
        let mut sim = Simulation::default();
        sim.update_config(SimulationConfig::new(300.0, 20, 2.0)).unwrap();
        assert_eq!(sim.state(), SimulationState::Uninitialized);

        sim.resize(CanvasSize::new(200, 100)).unwrap();
        let grid = sim.grid().unwrap();
        assert_eq!((grid.columns(), grid.rows()), (10, 5));
    }

    #[test]
    fn test_dispose() {
        let mut sim = configured();
        sim.dispose();
        assert_eq!(sim.state(), SimulationState::Disposed);
        assert_eq!(sim.tick(None), Err(SimulationError::NotConfigured));

        sim.configure(SimulationConfig::default(), CanvasSize::new(60, 60))
            .unwrap();
        assert_eq!(sim.state(), SimulationState::Ready);
    }
}
