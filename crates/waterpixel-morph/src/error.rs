//! Error types for waterpixel-morph

use thiserror::Error;

/// A compute kernel failed as a unit.
///
/// `kernel` names the primitive (`erode`, `dilate`, `outline`, `gradient`,
/// `distance`) so the caller can report which stage went wrong.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Kernel rejected its input or could not produce an output
    #[error("{kernel} kernel failed: {message}")]
    Failed {
        kernel: &'static str,
        message: String,
    },

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] waterpixel_core::Error),
}

impl KernelError {
    pub fn failed(kernel: &'static str, message: impl Into<String>) -> Self {
        KernelError::Failed {
            kernel,
            message: message.into(),
        }
    }

    /// Name of the failing kernel, if known.
    pub fn kernel(&self) -> Option<&'static str> {
        match self {
            KernelError::Failed { kernel, .. } => Some(kernel),
            KernelError::Core(_) => None,
        }
    }
}

/// Result type for kernel operations
pub type MorphResult<T> = Result<T, KernelError>;
