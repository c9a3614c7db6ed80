//! Retarded-event resolver - per-cell light-cone search over the event log
//!
//! A cell "sees" the event recorded `k` ticks ago when the distance from the
//! cell to where the charge was at that tick matches how far a field change
//! travels in `k` ticks, to within one cell size:
//!
//! ```text
//! | |cell - position(k)| - c * k / tick_rate | < cell_size
//! ```
//!
//! The scan is greedy (newest first, first hit wins). Because the charge moves
//! continuously, the index a cell matched last frame is a good prior, so the
//! scan is narrowed to a window around it and only widened on a miss.

use crate::config::{SimulationConfig, HOLD_FRAMES};
use crate::grid::GridCell;
use crate::history::HistoryBuffer;
use crate::kinematics::KinematicEvent;
use glam::Vec2;

/// Contiguous range of "ticks ago" indices to scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: usize,
    pub end: usize,
}

impl SearchWindow {
    /// The whole buffer.
    pub fn full(events_size: usize) -> Self {
        Self {
            start: 0,
            end: events_size,
        }
    }

    /// `[last - round(events_size / 3), last + 3)`, clamped to the buffer.
    pub fn around(last_index: usize, events_size: usize) -> Self {
        let reach_back = (events_size as f32 / 3.0).round() as usize;
        Self {
            start: last_index.saturating_sub(reach_back),
            end: (last_index + 3).min(events_size),
        }
    }

    pub fn covers(&self, events_size: usize) -> bool {
        self.start == 0 && self.end >= events_size
    }
}

/// What a cell observes this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution {
    /// Event `index` ticks ago lies on the cell's past light cone.
    Matched { index: usize, event: KinematicEvent },
    /// Non-relativistic mode: the current state, seen without delay.
    Instantaneous { event: KinematicEvent },
    /// Nothing matched; last frame's match is reused for the `frames`-th time.
    Held { event: KinematicEvent, frames: u32 },
    /// Nothing matched and nothing is held.
    Unresolved,
}

impl Resolution {
    pub fn event(&self) -> Option<&KinematicEvent> {
        match self {
            Resolution::Matched { event, .. }
            | Resolution::Instantaneous { event }
            | Resolution::Held { event, .. } => Some(event),
            Resolution::Unresolved => None,
        }
    }
}

/// Finds the causally visible event for each cell.
#[derive(Clone, Debug)]
pub struct Resolver {
    propagation_speed: f32,
    tick_rate_hz: f32,
    tolerance: f32,
    events_size: usize,
    hold_frames: u32,
    relativistic: bool,
}

impl Resolver {
    pub fn new(config: &SimulationConfig, events_size: usize) -> Self {
        Self {
            propagation_speed: config.propagation_speed,
            tick_rate_hz: config.tick_rate_hz as f32,
            tolerance: config.cell_size as f32,
            events_size,
            hold_frames: HOLD_FRAMES,
            relativistic: true,
        }
    }

    /// Set how many frames a cell may reuse a stale match.
    pub fn with_hold_frames(mut self, frames: u32) -> Self {
        self.hold_frames = frames;
        self
    }

    pub fn set_relativistic(&mut self, enabled: bool) {
        self.relativistic = enabled;
    }

    pub fn is_relativistic(&self) -> bool {
        self.relativistic
    }

    pub fn events_size(&self) -> usize {
        self.events_size
    }

    /// Whether the event `index` ticks ago at `position` is on the light cone
    /// of `center`.
    pub fn is_causal(&self, center: Vec2, position: Vec2, index: usize) -> bool {
        let travelled = self.propagation_speed * index as f32 / self.tick_rate_hz;
        (center.distance(position) - travelled).abs() < self.tolerance
    }

    /// Light-cone scan over `window`, newest first.
    pub fn search(
        &self,
        center: Vec2,
        events: &HistoryBuffer<KinematicEvent>,
        window: SearchWindow,
    ) -> Option<usize> {
        let end = window.end.min(events.len());
        (window.start..end).find(|&k| {
            events
                .get(k)
                .is_some_and(|event| self.is_causal(center, event.position, k))
        })
    }

    /// Resolve `cell` against the event log, updating its search cache.
    pub fn resolve(&self, cell: &mut GridCell, events: &HistoryBuffer<KinematicEvent>) -> Resolution {
        if !self.relativistic {
            return match events.newest() {
                Some(event) => Resolution::Instantaneous { event: *event },
                None => Resolution::Unresolved,
            };
        }

        let full = SearchWindow::full(self.events_size);
        let window = cell
            .last_event_index
            .map_or(full, |last| SearchWindow::around(last, self.events_size));

        let found = self.search(cell.center, events, window).or_else(|| {
            if window.covers(self.events_size) {
                return None;
            }
            tracing::trace!(x = cell.center.x, y = cell.center.y, "window miss, widening to full history");
            self.search(cell.center, events, full)
        });

        if let Some((index, event)) = found.and_then(|k| events.get(k).map(|e| (k, *e))) {
            cell.last_event_index = Some(index);
            cell.held_event = Some(event);
            cell.held_frames = 0;
            return Resolution::Matched { index, event };
        }

        match cell.held_event {
            Some(event) if cell.held_frames < self.hold_frames => {
                cell.held_frames += 1;
                Resolution::Held {
                    event,
                    frames: cell.held_frames,
                }
            }
            _ => {
                cell.last_event_index = None;
                cell.held_event = None;
                cell.held_frames = 0;
                Resolution::Unresolved
            }
        }
    }
}
