//! Error types for the segmentation pipeline

use thiserror::Error;
use waterpixel_morph::KernelError;
use waterpixel_region::RegionError;

/// Errors that abort a segmentation run
///
/// No partial [`Segmentation`](crate::Segmentation) is ever returned
/// alongside an error.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Grid step, shrink factor or image size cannot produce a grid
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A compute kernel failed; the whole run is abandoned
    #[error("compute backend failure in stage '{stage}' (kernel '{kernel}'): {source}")]
    ComputeBackendFailure {
        stage: &'static str,
        kernel: &'static str,
        #[source]
        source: KernelError,
    },

    /// Marker selection or flooding error
    #[error("region error: {0}")]
    Region(RegionError),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] waterpixel_core::Error),
}

impl SegmentError {
    pub(crate) fn backend(stage: &'static str, source: KernelError) -> Self {
        let kernel = source.kernel().unwrap_or(stage);
        Self::ComputeBackendFailure {
            stage,
            kernel,
            source,
        }
    }
}

impl From<RegionError> for SegmentError {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::InvalidConfiguration(msg) => Self::InvalidConfiguration(msg),
            RegionError::Core(e) => Self::Core(e),
            other => Self::Region(other),
        }
    }
}

/// Result type for segmentation
pub type SegmentResult<T> = Result<T, SegmentError>;
