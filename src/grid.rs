//! Grid - static lattice of field sample cells

use crate::config::CanvasSize;
use crate::history::HistoryBuffer;
use crate::intensity;
use crate::kinematics::KinematicEvent;
use glam::Vec2;

/// One field sample point.
#[derive(Clone, Debug)]
pub struct GridCell {
    /// Cell center in canvas pixels.
    pub center: Vec2,

    /// Recent intensities, newest first, length `avg_time`.
    intensity: HistoryBuffer<f32>,

    /// Relative change of the newest intensity against the oldest.
    intensity_change: f32,

    /// History index that satisfied causality last frame.
    pub(crate) last_event_index: Option<usize>,

    /// Event behind the last successful match, reused while holding.
    pub(crate) held_event: Option<KinematicEvent>,

    /// Consecutive frames spent holding `held_event`.
    pub(crate) held_frames: u32,
}

impl GridCell {
    pub fn new(center: Vec2, avg_time: usize) -> Self {
        Self {
            center,
            intensity: HistoryBuffer::filled(avg_time, 0.0),
            intensity_change: 0.0,
            last_event_index: None,
            held_event: None,
            held_frames: 0,
        }
    }

    /// Push a new intensity and update the derived change.
    pub fn record_intensity(&mut self, value: f32) -> f32 {
        self.intensity.push(value);
        self.intensity_change = intensity::intensity_change(&self.intensity);
        self.intensity_change
    }

    /// Forget intensities and any cached search state.
    pub fn reset(&mut self) {
        self.intensity.refill(0.0);
        self.intensity_change = 0.0;
        self.last_event_index = None;
        self.held_event = None;
        self.held_frames = 0;
    }

    /// Latest intensity.
    pub fn intensity(&self) -> f32 {
        self.intensity.newest().copied().unwrap_or(0.0)
    }

    pub fn intensity_change(&self) -> f32 {
        self.intensity_change
    }

    pub fn intensity_history(&self) -> &HistoryBuffer<f32> {
        &self.intensity
    }

    pub fn last_event_index(&self) -> Option<usize> {
        self.last_event_index
    }

    /// Consecutive frames this cell has reused an earlier match.
    pub fn held_frames(&self) -> u32 {
        self.held_frames
    }
}

/// Row-major lattice of cells covering the canvas.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<GridCell>,
    columns: usize,
    rows: usize,
    cell_size: u32,
}

impl Grid {
    /// Cover `canvas` with `ceil(width / cell_size) x ceil(height / cell_size)` cells.
    pub fn new(canvas: CanvasSize, cell_size: u32, avg_time: usize) -> Self {
        let cell_size = cell_size.max(1);
        let columns = canvas.width.div_ceil(cell_size) as usize;
        let rows = canvas.height.div_ceil(cell_size) as usize;
        let size = cell_size as f32;

        let mut cells = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let center = Vec2::new(
                    column as f32 * size + 0.5 * size,
                    row as f32 * size + 0.5 * size,
                );
                cells.push(GridCell::new(center, avg_time));
            }
        }

        Self {
            cells,
            columns,
            rows,
            cell_size,
        }
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&GridCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GridCell> {
        self.cells.iter_mut()
    }

    /// Reset every cell's intensity history and search cache.
    pub fn reset_cells(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
