//! Error types for waterpixel-region

use thiserror::Error;

/// Errors that can occur during grid, marker and watershed processing
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] waterpixel_core::Error),

    /// Grid step, shrink factor or image size cannot produce a grid
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Cell has no member pixels or no usable marker seed
    #[error("degenerate cell {cell}")]
    DegenerateCell { cell: usize },

    /// Pixel index outside the buffer
    #[error("index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Buffer has an unexpected channel count
    #[error("channel mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: &'static str, actual: u32 },

    /// Worker pool could not be built
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
