//! Marker-controlled watershed flooding
//!
//! Floods the regularized gradient from one seed pixel per marker and
//! produces a [`LabelMap`] where 0 marks the watershed lines.
//!
//! # Algorithm
//!
//! 1. Every marker becomes a basin with a fresh label (1, 2, ... in cell
//!    order). Only the marker's first pixel is labelled; it is flagged as
//!    enqueued so it is never pushed.
//! 2. The unlabelled neighbours of every seed are pushed with their
//!    regularized gradient (channel 0) as priority.
//! 3. Pop the lowest priority; equal priorities pop in push order. Among the
//!    popped pixel's neighbours, labelled ones vote: a single label is
//!    assigned to the pixel, disagreeing labels (or none) leave it at 0 for
//!    good. Unlabelled neighbours not yet enqueued are pushed.
//! 4. Stop when the queue is empty.
//!
//! Each pixel is pushed at most once and a non-zero label is never
//! overwritten. The loop is serial.

use crate::markers::MarkerSet;
use crate::{RegionError, RegionResult};
use log::debug;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use waterpixel_core::{LabelMap, PixelBuffer, neighbors8};

/// One flooded basin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Basin {
    /// Label written into the [`LabelMap`]
    pub label: u32,
    /// Grid cell the marker came from
    pub cell: usize,
    /// Seed pixel (first pixel of the marker)
    pub seed: usize,
}

/// Output of [`flood`]
#[derive(Debug, Clone)]
pub struct WatershedResult {
    /// Basin label per pixel, 0 on watershed lines
    pub labels: LabelMap,
    /// Basins in label order
    pub basins: Vec<Basin>,
    /// Number of unlabelled pixels
    pub contour_pixels: usize,
    /// `(contour_pixels + 2 width + 2 height + 4) / (width height)`
    pub contour_density: f64,
}

impl WatershedResult {
    /// Number of basins
    pub fn basin_count(&self) -> usize {
        self.basins.len()
    }

    /// 1-channel mask: 255 on watershed lines, 0 elsewhere
    pub fn contour_mask(&self) -> PixelBuffer {
        self.labels.contour_mask()
    }
}

/// Contour density of a label map: unlabelled pixels plus the image frame
/// (`2 width + 2 height + 4`), divided by the pixel count.
pub fn contour_density(labels: &LabelMap) -> f64 {
    let w = labels.width() as f64;
    let h = labels.height() as f64;
    (labels.unlabeled_count() as f64 + 2.0 * w + 2.0 * h + 4.0) / (w * h)
}

type QueueEntry = Reverse<(u8, u64, usize)>;

struct FloodQueue {
    heap: BinaryHeap<QueueEntry>,
    enqueued: Vec<bool>,
    sequence: u64,
}

impl FloodQueue {
    fn new(len: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            enqueued: vec![false; len],
            sequence: 0,
        }
    }

    fn push(&mut self, priority: u8, pixel: usize) {
        self.enqueued[pixel] = true;
        self.heap.push(Reverse((priority, self.sequence, pixel)));
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse((_, _, pixel))| pixel)
    }
}

/// Flood `regularized` from the markers in `markers`.
///
/// # Errors
///
/// Returns an error if `regularized` and the marker mask differ in size or
/// a marker seed lies outside the image.
pub fn flood(regularized: &PixelBuffer, markers: &MarkerSet) -> RegionResult<WatershedResult> {
    let width = regularized.width();
    let height = regularized.height();
    if markers.mask.width() != width || markers.mask.height() != height {
        return Err(waterpixel_core::Error::DimensionMismatch {
            expected: (width, height),
            actual: (markers.mask.width(), markers.mask.height()),
        }
        .into());
    }

    let len = regularized.pixel_count();
    let priority = |p: usize| regularized.sample_unchecked(p, 0);
    let mut labels = LabelMap::new(width, height)?;
    let mut queue = FloodQueue::new(len);

    // Seeds first, so a seed adjacent to another is never pushed
    let mut basins = Vec::with_capacity(markers.markers.len());
    for marker in &markers.markers {
        let Some(seed) = marker.seed() else {
            continue;
        };
        if seed >= len {
            return Err(RegionError::IndexOutOfRange { index: seed, len });
        }
        let label = basins.len() as u32 + 1;
        labels.set_label(seed, label)?;
        queue.enqueued[seed] = true;
        basins.push(Basin {
            label,
            cell: marker.cell,
            seed,
        });
    }

    for basin in &basins {
        for n in neighbors8(width, height, basin.seed) {
            if labels.label_at(n) == 0 && !queue.enqueued[n] {
                queue.push(priority(n), n);
            }
        }
    }

    while let Some(pixel) = queue.pop() {
        if labels.label_at(pixel) != 0 {
            continue;
        }

        let mut candidate = 0u32;
        let mut conflict = false;
        for n in neighbors8(width, height, pixel) {
            let l = labels.label_at(n);
            if l != 0 {
                if candidate == 0 {
                    candidate = l;
                } else if l != candidate {
                    conflict = true;
                }
            } else if !queue.enqueued[n] {
                queue.push(priority(n), n);
            }
        }

        if !conflict && candidate != 0 {
            labels.set_label(pixel, candidate)?;
        }
    }

    let contour_pixels = labels.unlabeled_count();
    let density = contour_density(&labels);
    debug!(
        "watershed: {} basins, {} pushes, {} contour pixels, density {:.4}",
        basins.len(),
        queue.sequence,
        contour_pixels,
        density
    );

    Ok(WatershedResult {
        labels,
        basins,
        contour_pixels,
        contour_density: density,
    })
}
