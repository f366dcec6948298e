//! Per-cell marker selection
//!
//! For every cell of a [`HexGrid`] the marker is the largest 8-connected
//! component of member pixels whose gradient equals the cell's minimum
//! gradient.
//!
//! # Algorithm
//!
//! 1. Find the minimum gradient over the cell's members.
//! 2. Scan the members in ascending order. Every unvisited pixel at the
//!    minimum seeds an iterative flood fill restricted to the cell's members
//!    and to the minimum level. Visited state is kept per cell, indexed by
//!    position in the membership list.
//! 3. Keep the largest component; the first one found wins ties. With
//!    early exit enabled, the scan stops as soon as a new largest component
//!    covers at least `coverage_threshold` of the cell, even if a larger one
//!    would have followed.
//!
//! Cells are split into contiguous ranges, one per worker of a dedicated
//! rayon pool. Workers only read the gradient and return owned marker lists;
//! the [`MarkerMask`] is written after every worker has finished.

use crate::grid::HexGrid;
use crate::{RegionError, RegionResult};
use log::debug;
use rayon::prelude::*;
use std::ops::Range;
use waterpixel_core::{MarkerMask, PixelBuffer, neighbors8};

/// Options for marker selection
#[derive(Debug, Clone)]
pub struct MarkerOptions {
    /// Stop scanning a cell once a component reaches `coverage_threshold`
    pub early_exit: bool,
    /// Fraction of the cell's pixels that triggers early exit
    pub coverage_threshold: f32,
    /// Worker count; 0 uses one worker per logical CPU
    pub workers: usize,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            early_exit: true,
            coverage_threshold: 0.5,
            workers: 0,
        }
    }
}

impl MarkerOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the coverage early exit
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    /// Set the early-exit coverage threshold
    pub fn with_coverage_threshold(mut self, threshold: f32) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    /// Set the worker count (0 = number of logical CPUs)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}

/// Marker component selected for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMarker {
    /// Cell index
    pub cell: usize,
    /// Minimum gradient over the cell
    pub min_gradient: u8,
    /// Component pixels, ascending linear indices
    pub pixels: Vec<usize>,
}

impl CellMarker {
    /// Representative pixel used to seed the basin (smallest index)
    pub fn seed(&self) -> Option<usize> {
        self.pixels.first().copied()
    }
}

/// Result of marker selection over a whole grid
#[derive(Debug, Clone)]
pub struct MarkerSet {
    /// One marker per non-degenerate cell, in cell order
    pub markers: Vec<CellMarker>,
    /// Union of all marker pixels
    pub mask: MarkerMask,
    /// Cells skipped because they had no member pixels or no seed
    pub degenerate_cells: Vec<usize>,
}

impl MarkerSet {
    /// Total number of marker pixels
    pub fn pixel_count(&self) -> usize {
        self.markers.iter().map(|m| m.pixels.len()).sum()
    }

    /// All marker pixel indices, ascending
    pub fn pixel_indices(&self) -> Vec<usize> {
        self.mask.indices()
    }
}

/// Split `cells` into at most `workers` contiguous ranges covering every cell.
///
/// Ranges are `ceil(cells / workers)` long except possibly the last.
///
/// # Examples
///
/// ```
/// use waterpixel_region::partition_cells;
///
/// assert_eq!(partition_cells(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
/// assert_eq!(partition_cells(2, 8), vec![0..1, 1..2]);
/// ```
pub fn partition_cells(cells: usize, workers: usize) -> Vec<Range<usize>> {
    if cells == 0 {
        return Vec::new();
    }
    let chunk = cells.div_ceil(workers.max(1));
    (0..cells)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(cells))
        .collect()
}

/// Select the marker component of one cell.
///
/// `members` must be the cell's ascending member list and `gradient` the
/// gradient buffer of the image the grid was built for; channel 0 is read.
/// Returns `None` when the cell is degenerate.
pub fn select_cell_marker(
    cell: usize,
    members: &[usize],
    gradient: &PixelBuffer,
    options: &MarkerOptions,
) -> Option<CellMarker> {
    let level = |p: usize| gradient.sample(p, 0);

    let min_gradient = members.iter().filter_map(|&p| level(p)).min()?;

    let width = gradient.width();
    let height = gradient.height();
    let count = members.len();
    let mut visited = vec![false; count];
    let mut stack = Vec::new();
    let mut best: Option<Vec<usize>> = None;

    for start in 0..count {
        if visited[start] || level(members[start]) != Some(min_gradient) {
            continue;
        }

        // Iterative flood fill over the cell's members at the minimum level
        let mut component = Vec::new();
        visited[start] = true;
        stack.push(start);
        while let Some(local) = stack.pop() {
            let pixel = members[local];
            component.push(pixel);
            for neighbor in neighbors8(width, height, pixel) {
                if let Ok(j) = members.binary_search(&neighbor)
                    && !visited[j]
                    && level(neighbor) == Some(min_gradient)
                {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }

        let area = component.len();
        if best.as_ref().is_none_or(|b| area > b.len()) {
            best = Some(component);
            let coverage = area as f32 / count as f32;
            if options.early_exit && coverage >= options.coverage_threshold {
                break;
            }
        }
    }

    best.map(|mut pixels| {
        pixels.sort_unstable();
        CellMarker {
            cell,
            min_gradient,
            pixels,
        }
    })
}

/// Marker selection stage
#[derive(Debug, Clone, Default)]
pub struct MarkerSelector {
    options: MarkerOptions,
}

impl MarkerSelector {
    pub fn new(options: MarkerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MarkerOptions {
        &self.options
    }

    /// Select one marker per cell of `grid` on `gradient`.
    ///
    /// # Errors
    ///
    /// Returns an error if `gradient` does not match the grid's image size,
    /// the worker pool cannot be built, or a marker pixel falls outside the
    /// mask. Degenerate cells are not errors; they are listed in
    /// [`MarkerSet::degenerate_cells`].
    pub fn select(&self, grid: &HexGrid, gradient: &PixelBuffer) -> RegionResult<MarkerSet> {
        if gradient.width() != grid.width() || gradient.height() != grid.height() {
            return Err(waterpixel_core::Error::DimensionMismatch {
                expected: (grid.width(), grid.height()),
                actual: (gradient.width(), gradient.height()),
            }
            .into());
        }

        let ranges = partition_cells(grid.cell_count(), self.options.worker_count());
        let workers = ranges.len().max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("waterpixel-markers-{}", i))
            .build()
            .map_err(|e| RegionError::WorkerPool(e.to_string()))?;

        debug!(
            "markers: {} cells over {} ranges, {} workers",
            grid.cell_count(),
            ranges.len(),
            workers
        );

        let per_range: Vec<Vec<(usize, Option<CellMarker>)>> = pool.install(|| {
            ranges
                .par_iter()
                .map(|range| {
                    range
                        .clone()
                        .map(|cell| {
                            let marker = select_cell_marker(
                                cell,
                                grid.members(cell),
                                gradient,
                                &self.options,
                            );
                            (cell, marker)
                        })
                        .collect()
                })
                .collect()
        });

        let mut mask = MarkerMask::new(grid.width(), grid.height())?;
        let mut markers = Vec::new();
        let mut degenerate_cells = Vec::new();
        for (cell, marker) in per_range.into_iter().flatten() {
            match marker {
                Some(marker) => {
                    for &p in &marker.pixels {
                        mask.mark(p)?;
                    }
                    markers.push(marker);
                }
                None => {
                    debug!("markers: skipping {}", RegionError::DegenerateCell { cell });
                    degenerate_cells.push(cell);
                }
            }
        }

        let set = MarkerSet {
            markers,
            mask,
            degenerate_cells,
        };
        debug!(
            "markers: {} markers, {} marker pixels, {} degenerate cells",
            set.markers.len(),
            set.pixel_count(),
            set.degenerate_cells.len()
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, data: &[u8]) -> PixelBuffer {
        PixelBuffer::from_vec(width, height, 1, data.to_vec()).unwrap()
    }

    #[test]
    fn test_partition_covers_all_cells() {
        for cells in 0..20 {
            for workers in 1..9 {
                let ranges = partition_cells(cells, workers);
                assert!(ranges.len() <= workers);
                let covered: Vec<usize> = ranges.iter().flat_map(|r| r.clone()).collect();
                assert_eq!(covered, (0..cells).collect::<Vec<_>>());
            }
        }
        assert_eq!(partition_cells(5, 0), vec![0..5]);
    }

    #[test]
    fn test_more_workers_than_cells() {
        // One single-cell range each, never more ranges than cells
        assert_eq!(partition_cells(3, 10_000), vec![0..1, 1..2, 2..3]);

        let grid = HexGrid::new(32, 24, &crate::GridOptions::new(8)).unwrap();
        let g = PixelBuffer::from_fn(32, 24, 1, |x, y| [((x * 7 + y * 3) % 11) as u8; 3]).unwrap();
        let one = MarkerSelector::new(MarkerOptions::new().with_workers(1))
            .select(&grid, &g)
            .unwrap();
        let many = MarkerSelector::new(MarkerOptions::new().with_workers(10_000))
            .select(&grid, &g)
            .unwrap();
        assert_eq!(one.markers, many.markers);
        assert_eq!(one.degenerate_cells, many.degenerate_cells);
        assert_eq!(one.mask, many.mask);
    }

    #[test]
    fn test_largest_component_wins() {
        // Row-major 5x1 strip; minimum 0 appears as {0} and {2, 3}
        let g = gray(5, 1, &[0, 9, 0, 0, 9]);
        let members = [0, 1, 2, 3, 4];
        let options = MarkerOptions::new().with_early_exit(false);
        let m = select_cell_marker(3, &members, &g, &options).unwrap();
        assert_eq!(m.cell, 3);
        assert_eq!(m.min_gradient, 0);
        assert_eq!(m.pixels, vec![2, 3]);
        assert_eq!(m.seed(), Some(2));
    }

    #[test]
    fn test_first_component_wins_ties() {
        let g = gray(5, 1, &[4, 9, 4, 9, 4]);
        let m = select_cell_marker(0, &[0, 1, 2, 3, 4], &g, &MarkerOptions::new()).unwrap();
        assert_eq!(m.pixels, vec![0]);
    }

    #[test]
    fn test_early_exit_keeps_first_large_component() {
        // {0, 1} covers half of the cell, so {3} is never grown
        let g = gray(6, 1, &[1, 1, 7, 1, 1, 1]);
        let members = [0, 1, 2, 3];
        let early = select_cell_marker(0, &members, &g, &MarkerOptions::new()).unwrap();
        assert_eq!(early.pixels, vec![0, 1]);

        // A larger later component is skipped once the threshold is met
        let members = [0, 1, 2, 3, 4, 5];
        let options = MarkerOptions::new().with_coverage_threshold(0.3);
        let early = select_cell_marker(0, &members, &g, &options).unwrap();
        assert_eq!(early.pixels, vec![0, 1]);
        let full = select_cell_marker(
            0,
            &members,
            &g,
            &MarkerOptions::new().with_early_exit(false),
        )
        .unwrap();
        assert_eq!(full.pixels, vec![3, 4, 5]);
    }

    #[test]
    fn test_component_is_restricted_to_members() {
        // Pixel 1 is at the minimum but outside the cell
        let g = gray(3, 1, &[0, 0, 0]);
        let m = select_cell_marker(0, &[0, 2], &g, &MarkerOptions::new()).unwrap();
        assert_eq!(m.pixels, vec![0]);
    }

    #[test]
    fn test_diagonal_connectivity_without_row_wrap() {
        // 3x3: minimum at (2,0) and (0,1) are linear neighbours 2 and 3 but
        // not 8-connected; (1,1) is diagonal to (2,0).
        let g = gray(3, 3, &[9, 9, 0, 0, 9, 9, 9, 9, 9]);
        let members: Vec<usize> = (0..9).collect();
        let options = MarkerOptions::new().with_early_exit(false);
        let m = select_cell_marker(0, &members, &g, &options).unwrap();
        assert_eq!(m.pixels, vec![2]);

        let g = gray(3, 3, &[9, 9, 0, 9, 0, 9, 9, 9, 9]);
        let m = select_cell_marker(0, &members, &g, &MarkerOptions::new()).unwrap();
        assert_eq!(m.pixels, vec![2, 4]);
    }

    #[test]
    fn test_empty_cell_is_degenerate() {
        let g = gray(2, 1, &[0, 0]);
        assert!(select_cell_marker(0, &[], &g, &MarkerOptions::new()).is_none());
    }
}
