//! Segmentation orchestrator
//!
//! [`Segmenter`] runs the stages in order, each one consuming the previous
//! stage's buffers and producing new owned ones:
//!
//! 1. Hexagonal grid (validates the configuration before any pixel work)
//! 2. Smoothing: erode, dilate, dilate, erode
//! 3. Gradient
//! 4. Marker selection on the worker pool (join barrier)
//! 5. Distance from markers
//! 6. Regularized gradient
//! 7. Watershed flood (serial)
//! 8. Contour rendering
//!
//! Any failure aborts the run and nothing but the error is returned.

use crate::contours::{paint_contours, render_contours};
use crate::segment_error::{SegmentError, SegmentResult};
use log::{debug, info};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use waterpixel_core::{LabelMap, PixelBuffer};
use waterpixel_morph::{ComputeBackend, CpuBackend, DilateMode, MorphResult};
use waterpixel_region::{
    Basin, GridOptions, HexGrid, MarkerOptions, MarkerSelector, MarkerSet, flood, regularize,
};

/// Options for a segmentation run
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    /// Grid step and shrink factor
    pub grid: GridOptions,
    /// Marker selection options
    pub markers: MarkerOptions,
    /// Thicken contours and add a halo when rendering
    pub render_outline: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            grid: GridOptions::default(),
            markers: MarkerOptions::default(),
            render_outline: true,
        }
    }
}

impl SegmentOptions {
    /// Create options with the given grid step and defaults otherwise
    pub fn new(step: u32) -> Self {
        Self {
            grid: GridOptions::new(step),
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, grid: GridOptions) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_markers(mut self, markers: MarkerOptions) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_render_outline(mut self, render_outline: bool) -> Self {
        self.render_outline = render_outline;
        self
    }
}

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    pub grid: Duration,
    pub smoothing: Duration,
    pub gradient: Duration,
    pub markers: Duration,
    pub distance: Duration,
    pub regularize: Duration,
    pub watershed: Duration,
    pub render: Duration,
    pub total: Duration,
}

/// Summary numbers of a run
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub cell_count: usize,
    pub basin_count: usize,
    pub degenerate_cells: usize,
    pub marker_pixels: usize,
    pub contour_pixels: usize,
    /// Unlabelled pixels plus the image frame over the pixel count
    pub contour_density: f64,
    pub timings: StageTimings,
}

/// Output of a successful run
///
/// Every intermediate buffer is kept so callers can export it.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Smoothed input
    pub smoothed: PixelBuffer,
    /// 1-channel gradient of the smoothed input
    pub gradient: PixelBuffer,
    /// Selected markers
    pub markers: MarkerSet,
    /// 1-channel distance from markers
    pub distance: PixelBuffer,
    /// Gradient plus distance
    pub regularized: PixelBuffer,
    /// Basin label per pixel, 0 on watershed lines
    pub labels: LabelMap,
    /// Basins in label order
    pub basins: Vec<Basin>,
    /// 1-channel contour image (255 core, 10 halo)
    pub contours: PixelBuffer,
    /// Input with the contours painted over it
    pub result: PixelBuffer,
    pub diagnostics: Diagnostics,
}

impl Segmentation {
    /// 1-channel mask: 255 on watershed lines, 0 elsewhere
    pub fn contour_mask(&self) -> PixelBuffer {
        self.labels.contour_mask()
    }

    /// Intermediate images by export name, in pipeline order
    pub fn snapshots(&self) -> Vec<(&'static str, PixelBuffer)> {
        vec![
            ("smooth", self.smoothed.clone()),
            ("gradient", self.gradient.clone()),
            ("markers", self.markers.mask.to_buffer()),
            ("distance_from_markers", self.distance.clone()),
            ("regularized_gradient", self.regularized.clone()),
            ("contours", self.contours.clone()),
            ("result", self.result.clone()),
        ]
    }
}

/// Runs the segmentation pipeline on a [`ComputeBackend`]
///
/// A segmenter can be shared between threads; runs are serialized.
pub struct Segmenter<B: ComputeBackend = CpuBackend> {
    backend: B,
    options: SegmentOptions,
    run_lock: Mutex<()>,
}

impl Default for Segmenter<CpuBackend> {
    fn default() -> Self {
        Self::new(CpuBackend::new(), SegmentOptions::default())
    }
}

impl<B: ComputeBackend> Segmenter<B> {
    pub fn new(backend: B, options: SegmentOptions) -> Self {
        Self {
            backend,
            options,
            run_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Segment `image` (1 or 3 channels).
    ///
    /// # Errors
    ///
    /// - [`SegmentError::InvalidConfiguration`] if the grid cannot be built;
    ///   this is checked before any pixel work
    /// - [`SegmentError::ComputeBackendFailure`] if a kernel fails or returns
    ///   a buffer of the wrong size
    /// - [`SegmentError::Region`] if marker selection or flooding fails
    pub fn segment(&self, image: &PixelBuffer) -> SegmentResult<Segmentation> {
        let _run = self.run_lock.lock();
        let start = Instant::now();
        let mut timings = StageTimings::default();
        let width = image.width();
        let height = image.height();
        let step = self.options.grid.step;
        let backend = &self.backend;

        let t = Instant::now();
        let grid = HexGrid::new(width, height, &self.options.grid)?;
        timings.grid = t.elapsed();

        let t = Instant::now();
        let smoothed = {
            let eroded = stage("smoothing", image, backend.erode(step, image))?;
            let opened = stage(
                "smoothing",
                image,
                backend.dilate(step, &eroded, DilateMode::Plain),
            )?;
            let dilated = stage(
                "smoothing",
                image,
                backend.dilate(step, &opened, DilateMode::Plain),
            )?;
            stage("smoothing", image, backend.erode(step, &dilated))?
        };
        timings.smoothing = t.elapsed();

        let t = Instant::now();
        let gradient = stage("gradient", image, backend.gradient(&smoothed))?;
        timings.gradient = t.elapsed();

        let t = Instant::now();
        let markers = MarkerSelector::new(self.options.markers.clone()).select(&grid, &gradient)?;
        timings.markers = t.elapsed();

        let t = Instant::now();
        let distance = stage(
            "distance",
            image,
            backend.distance_from_markers(width, height, step, &markers.pixel_indices()),
        )?;
        timings.distance = t.elapsed();

        let t = Instant::now();
        let regularized = regularize(&gradient, &distance)?;
        timings.regularize = t.elapsed();

        let t = Instant::now();
        let watershed = flood(&regularized, &markers)?;
        timings.watershed = t.elapsed();

        let t = Instant::now();
        let contours = stage(
            "contours",
            image,
            render_contours(
                backend,
                step,
                &watershed.labels,
                self.options.render_outline,
            ),
        )?;
        let result = paint_contours(image, &contours)
            .map_err(|e| SegmentError::backend("contours", e))?;
        timings.render = t.elapsed();
        timings.total = start.elapsed();

        debug!("segment: stage timings {:?}", timings);

        let diagnostics = Diagnostics {
            cell_count: grid.cell_count(),
            basin_count: watershed.basin_count(),
            degenerate_cells: markers.degenerate_cells.len(),
            marker_pixels: markers.pixel_count(),
            contour_pixels: watershed.contour_pixels,
            contour_density: watershed.contour_density,
            timings,
        };
        info!(
            "segment ({} backend): {}x{} step {}, {} basins, contour density {:.4}, {:.1} ms",
            backend.name(),
            width,
            height,
            step,
            diagnostics.basin_count,
            diagnostics.contour_density,
            diagnostics.timings.total.as_secs_f64() * 1000.0
        );

        Ok(Segmentation {
            smoothed,
            gradient,
            markers,
            distance,
            regularized,
            labels: watershed.labels,
            basins: watershed.basins,
            contours,
            result,
            diagnostics,
        })
    }
}

/// Check a kernel result and its size against the input image.
fn stage(
    name: &'static str,
    image: &PixelBuffer,
    output: MorphResult<PixelBuffer>,
) -> SegmentResult<PixelBuffer> {
    let output = output.map_err(|e| SegmentError::backend(name, e))?;
    if output.width() != image.width() || output.height() != image.height() {
        return Err(SegmentError::backend(
            name,
            waterpixel_core::Error::DimensionMismatch {
                expected: (image.width(), image.height()),
                actual: (output.width(), output.height()),
            }
            .into(),
        ));
    }
    Ok(output)
}

/// Segment `image` with grid step `step` on the CPU backend and default
/// options.
///
/// # Examples
///
/// ```
/// use waterpixel::{PixelBuffer, segment};
///
/// let image = PixelBuffer::filled(12, 10, 3, 128).unwrap();
/// let seg = segment(&image, 8).unwrap();
/// assert_eq!(seg.diagnostics.basin_count, 1);
/// assert_eq!(seg.diagnostics.contour_pixels, 0);
/// ```
pub fn segment(image: &PixelBuffer, step: u32) -> SegmentResult<Segmentation> {
    Segmenter::new(CpuBackend::new(), SegmentOptions::new(step)).segment(image)
}
