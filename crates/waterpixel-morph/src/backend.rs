//! Compute kernel boundary
//!
//! The segmentation pipeline only talks to pixel kernels through the
//! [`ComputeBackend`] trait. Every call is synchronous, returns a freshly
//! owned buffer of the input's size, and fails as a unit: an `Err` means no
//! output was produced.
//!
//! [`CpuBackend`] is the stock implementation built on the rayon kernels in
//! this crate.

use crate::distance::distance_from_markers;
use crate::grayscale::{dilate_gray, erode_gray, outline_gray};
use crate::gradient::lab_gradient;
use crate::{KernelError, MorphResult};
use log::debug;
use waterpixel_core::PixelBuffer;

/// Dilation flavour requested from [`ComputeBackend::dilate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DilateMode {
    /// Max filter with the step-derived structuring element
    #[default]
    Plain,
    /// One-pixel contour thickening with a halo value
    Outline,
}

/// Pixel kernels consumed by the segmentation pipeline.
pub trait ComputeBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Erode with a structuring element derived from `step`.
    fn erode(&self, step: u32, image: &PixelBuffer) -> MorphResult<PixelBuffer>;

    /// Dilate with a structuring element derived from `step`, or thicken
    /// contours when `mode` is [`DilateMode::Outline`].
    fn dilate(&self, step: u32, image: &PixelBuffer, mode: DilateMode)
    -> MorphResult<PixelBuffer>;

    /// Perceptual gradient magnitude, 1 channel.
    fn gradient(&self, image: &PixelBuffer) -> MorphResult<PixelBuffer>;

    /// Scaled, clamped distance to the nearest marker pixel, 1 channel.
    fn distance_from_markers(
        &self,
        width: u32,
        height: u32,
        step: u32,
        markers: &[usize],
    ) -> MorphResult<PixelBuffer>;
}

/// Multi-threaded CPU kernels.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    /// Smoothing radius is `max(1, step / smoothing_radius_divisor)`
    pub smoothing_radius_divisor: u32,
    /// Weight `k` of the distance term
    pub regularization: f32,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self {
            smoothing_radius_divisor: 10,
            regularization: 64.0,
        }
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_smoothing_radius_divisor(mut self, divisor: u32) -> Self {
        self.smoothing_radius_divisor = divisor;
        self
    }

    pub fn with_regularization(mut self, k: f32) -> Self {
        self.regularization = k;
        self
    }

    /// Structuring element radius used for smoothing at grid step `step`.
    ///
    /// `None` when the divisor is 0.
    pub fn structuring_radius(&self, step: u32) -> Option<u32> {
        step.checked_div(self.smoothing_radius_divisor)
            .map(|r| r.max(1))
    }

    fn radius_for(&self, kernel: &'static str, step: u32) -> MorphResult<u32> {
        self.structuring_radius(step)
            .ok_or_else(|| KernelError::failed(kernel, "smoothing radius divisor must be positive"))
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn erode(&self, step: u32, image: &PixelBuffer) -> MorphResult<PixelBuffer> {
        let radius = self.radius_for("erode", step)?;
        debug!(
            "erode: radius {} on {}x{}",
            radius,
            image.width(),
            image.height()
        );
        erode_gray(image, radius)
    }

    fn dilate(
        &self,
        step: u32,
        image: &PixelBuffer,
        mode: DilateMode,
    ) -> MorphResult<PixelBuffer> {
        match mode {
            DilateMode::Plain => {
                let radius = self.radius_for("dilate", step)?;
                debug!(
                    "dilate: radius {} on {}x{}",
                    radius,
                    image.width(),
                    image.height()
                );
                dilate_gray(image, radius)
            }
            DilateMode::Outline => outline_gray(image),
        }
    }

    fn gradient(&self, image: &PixelBuffer) -> MorphResult<PixelBuffer> {
        lab_gradient(image)
    }

    fn distance_from_markers(
        &self,
        width: u32,
        height: u32,
        step: u32,
        markers: &[usize],
    ) -> MorphResult<PixelBuffer> {
        debug!(
            "distance: {} marker pixels, step {}, k {}",
            markers.len(),
            step,
            self.regularization
        );
        distance_from_markers(width, height, step, markers, self.regularization)
    }
}
