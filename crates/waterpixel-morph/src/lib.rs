//! waterpixel-morph - Compute kernels for waterpixel segmentation
//!
//! This crate provides the pixel-level primitives the pipeline depends on:
//!
//! - Grayscale morphology: square-window erosion and dilation per channel
//! - Contour thickening ("outline" dilation) for rendering
//! - Lab ΔE color gradient
//! - Exact Euclidean distance transform and the marker distance field
//! - [`ComputeBackend`]: the trait the pipeline calls, with [`CpuBackend`]
//!   as the rayon-based implementation

pub mod backend;
pub mod distance;
mod error;
pub mod gradient;
pub mod grayscale;

pub use backend::{ComputeBackend, CpuBackend, DilateMode};
pub use distance::{distance_from_markers, squared_distance_transform};
pub use error::{KernelError, MorphResult};
pub use gradient::lab_gradient;
pub use grayscale::{HALO_VALUE, dilate_gray, erode_gray, outline_gray};
