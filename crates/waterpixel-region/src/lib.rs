//! waterpixel-region - Grid, markers and flooding for waterpixel segmentation
//!
//! This crate provides the region-level stages of the pipeline:
//!
//! - **Hexagonal grid** - Brick-offset hexagon cells, shrunk around their
//!   centroids, with the member pixels of every cell
//! - **Marker selection** - One minimum-gradient connected component per
//!   cell, computed on a worker pool
//! - **Regularization** - Gradient plus marker distance field
//! - **Watershed flooding** - Priority flood from one seed per marker
//!
//! # Examples
//!
//! ```
//! use waterpixel_core::PixelBuffer;
//! use waterpixel_region::{GridOptions, HexGrid, MarkerOptions, MarkerSelector, flood};
//!
//! let gradient = PixelBuffer::filled(40, 40, 1, 0).unwrap();
//! let grid = HexGrid::new(40, 40, &GridOptions::new(10)).unwrap();
//! let markers = MarkerSelector::new(MarkerOptions::new().with_workers(2))
//!     .select(&grid, &gradient)
//!     .unwrap();
//! let result = flood(&gradient, &markers).unwrap();
//! assert_eq!(result.basin_count(), markers.markers.len());
//! ```

mod error;
pub mod grid;
pub mod markers;
pub mod regularize;
pub mod watershed;

pub use error::{RegionError, RegionResult};
pub use grid::{GridCell, GridOptions, HexGrid, Point, hexagon_width, polygon_contains};
pub use markers::{
    CellMarker, MarkerOptions, MarkerSelector, MarkerSet, partition_cells, select_cell_marker,
};
pub use regularize::regularize;
pub use watershed::{Basin, WatershedResult, contour_density, flood};
