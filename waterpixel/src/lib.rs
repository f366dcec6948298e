//! Waterpixel - superpixel segmentation with a grid-regularized watershed
//!
//! Waterpixels are basins of a marker-controlled watershed computed on a
//! gradient that is biased by the distance to a regular hexagonal grid of
//! markers. They follow image edges while keeping a near-regular size and
//! layout.
//!
//! # Overview
//!
//! - [`Segmenter`] runs the whole pipeline on a [`ComputeBackend`]
//! - [`segment`] is the one-call entry point on the CPU backend
//! - [`evaluate_boundaries`] scores a contour image against ground truth
//!
//! The stage crates are re-exported as modules: [`io`], [`morph`] and
//! [`region`].
//!
//! # Example
//!
//! ```
//! use waterpixel::{PixelBuffer, SegmentOptions, Segmenter};
//! use waterpixel::morph::CpuBackend;
//!
//! let image = PixelBuffer::from_fn(48, 32, 3, |x, _| if x < 24 { [20, 40, 200] } else { [230, 200, 30] })
//!     .unwrap();
//! let segmenter = Segmenter::new(CpuBackend::new(), SegmentOptions::new(8));
//! let seg = segmenter.segment(&image).unwrap();
//! assert_eq!(seg.labels.width(), 48);
//! assert!(seg.diagnostics.basin_count > 1);
//! ```

mod contours;
mod evaluate;
mod pipeline;
mod segment_error;

// Re-export core types (primary data structures used everywhere)
pub use waterpixel_core::*;

// Re-export stage crates as modules
pub use waterpixel_io as io;
pub use waterpixel_morph as morph;
pub use waterpixel_region as region;

pub use contours::{CORE_VALUE, paint_contours, render_contours};
pub use segment_error::{SegmentError, SegmentResult};
pub use evaluate::{BoundaryScores, DEFAULT_TOLERANCE, EvaluateError, evaluate_boundaries};
pub use morph::ComputeBackend;
pub use pipeline::{
    Diagnostics, SegmentOptions, Segmentation, Segmenter, StageTimings, segment,
};
