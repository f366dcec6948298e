//! Waterpixel Core - Basic data structures for superpixel segmentation
//!
//! This crate provides the buffers handed from one pipeline stage to the
//! next:
//!
//! - [`PixelBuffer`] - Row-major 8-bit image with 1 or 3 interleaved channels
//! - [`LabelMap`] - Per-pixel basin labels (0 = watershed line)
//! - [`MarkerMask`] - Per-pixel marker flags
//! - [`neighbors8`] - Bounds-checked 8-connected neighbourhood
//! - [`color`] - sRGB to CIE L*a*b* conversion
//!
//! Every stage takes its input by reference and returns a freshly owned
//! output buffer; nothing here is shared between segmentation runs.

pub mod buffer;
pub mod color;
pub mod error;
pub mod label;
pub mod neighbors;

pub use buffer::PixelBuffer;
pub use color::{Lab, rgb_to_lab};
pub use error::{Error, Result};
pub use label::{LabelMap, MarkerMask};
pub use neighbors::{NEIGHBOR_OFFSETS, neighbors8};
