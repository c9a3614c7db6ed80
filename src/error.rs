//! Error types

/// Invalid numeric parameter in a configuration or canvas size.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("propagation speed must be finite and > 0 (got {0})")]
    PropagationSpeed(f32),

    #[error("cell size must be > 0 (got {0})")]
    CellSize(u32),

    #[error("field magnitude must be finite and >= 0 (got {0})")]
    FieldMagnitude(f32),

    #[error("averaging window must be between 2 and {max} ticks (got {0})", max = crate::config::MAX_AVG_TIME)]
    AvgTime(usize),

    #[error("tick rate must be > 0 Hz (got {0})")]
    TickRate(u32),

    #[error("history of {0} events exceeds the limit of {max}", max = crate::config::MAX_EVENTS_SIZE)]
    HistoryTooLarge(usize),

    #[error("grid would store {0} intensities, over the limit of {max}", max = crate::config::MAX_GRID_VALUES)]
    GridTooLarge(usize),

    #[error("canvas must be at least 1x1 pixels (got {width}x{height})")]
    Canvas { width: u32, height: u32 },
}

/// Errors surfaced by simulation operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("simulation has not been configured with a canvas size")]
    NotConfigured,

    #[error("drive target is not finite: ({x}, {y})")]
    NonFiniteInput { x: f32, y: f32 },

    #[error("charge state became non-finite at tick {tick}")]
    NonFiniteState { tick: u64 },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
