//! Hexagonal grid partition
//!
//! The image is tiled with flat-topped hexagons laid out in a brick
//! pattern: every odd column of hexagons is shifted down by half a hexagon.
//! Each hexagon is then shrunk toward its centroid by the shrink factor
//! (default 2/3). The shrunk ("inset") hexagon is the cell: its member
//! pixels are where markers are searched for.
//!
//! # Geometry
//!
//! For a grid step `S` the hexagon width is `w = trunc(S + 2 S cos 60°)`.
//! The grid has `width / (w / 2)` columns and `height / (w / 2)` rows of
//! slices, one cell per slice, numbered row-major.
//!
//! # Membership
//!
//! A pixel `(x, y)` belongs to a cell when the integer point `(x, y)` lies
//! inside the inset polygon under the even-odd rule. Horizontal edges are
//! ignored and an edge is crossed when `y1 <= y < y2`, so a point on the
//! bottom edge of a cell is outside it. Candidates are taken from the
//! polygon's bounding box only.

use crate::{RegionError, RegionResult};
use log::debug;
use rayon::prelude::*;

/// Integer point in image coordinates (may lie outside the image)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Options for building a [`HexGrid`]
#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Grid step in pixels
    pub step: u32,
    /// Factor by which each hexagon is shrunk toward its centroid, in (0, 1]
    pub shrink: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            step: 40,
            shrink: 2.0 / 3.0,
        }
    }
}

impl GridOptions {
    /// Create options with the given step and the default shrink factor
    pub fn new(step: u32) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Set the shrink factor
    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }
}

/// Hexagon width for a grid step, as `trunc(S + 2 S cos 60°)`.
pub fn hexagon_width(step: u32) -> u32 {
    let s = step as f64;
    (s + 2.0 * ((std::f64::consts::PI / 3.0).cos() * s)) as u32
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Row-major cell index
    pub index: usize,
    /// Slice coordinates `(column, row)`
    pub slice: (u32, u32),
    /// Full hexagon vertices
    pub outer: [Point; 6],
    /// Inset hexagon vertices (the authoritative cell polygon)
    pub inner: [Point; 6],
    /// Rounded centroid of the outer hexagon
    pub centroid: Point,
}

impl GridCell {
    fn build(index: usize, sx: u32, sy: u32, hex_width: i32, shrink: f32) -> Self {
        let w = hex_width;
        let base_offset = w / 2 + w / 4;
        let ox = sx as i32 * base_offset;
        let oy = if sx % 2 == 0 {
            sy as i32 * w
        } else {
            sy as i32 * w + w / 2
        };

        let rel = [
            (w / 2, 0),
            (w / 4, -w / 2),
            (-w / 4, -w / 2),
            (-w / 2, 0),
            (-w / 4, w / 2),
            (w / 4, w / 2),
        ];
        let outer = rel.map(|(dx, dy)| Point::new(ox + dx, oy + dy));

        let (sum_x, sum_y) = outer
            .iter()
            .fold((0i32, 0i32), |(ax, ay), p| (ax + p.x, ay + p.y));
        let centroid = Point::new(
            round_half_away(sum_x as f32 / 6.0),
            round_half_away(sum_y as f32 / 6.0),
        );

        let inner = outer.map(|p| {
            Point::new(
                centroid.x + round_half_away(shrink * (p.x - centroid.x) as f32),
                centroid.y + round_half_away(shrink * (p.y - centroid.y) as f32),
            )
        });

        Self {
            index,
            slice: (sx, sy),
            outer,
            inner,
            centroid,
        }
    }

    /// Even-odd test of the integer point `(x, y)` against the inset polygon.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        polygon_contains(&self.inner, x, y)
    }

    /// Inclusive bounding box `(min, max)` of the inset polygon.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = self.inner[0];
        let mut max = self.inner[0];
        for p in &self.inner[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

/// `qRound`-style rounding: halves go away from zero, so an inset hexagon
/// stays symmetric about its centroid.
#[inline]
fn round_half_away(v: f32) -> i32 {
    v.round() as i32
}

/// Even-odd point-in-polygon test.
///
/// Horizontal edges never count; an edge from `y1` to `y2` (ordered so that
/// `y1 < y2`) is crossed when `y1 <= py < y2` and the crossing lies at or
/// left of `px`.
pub fn polygon_contains(polygon: &[Point], px: i32, py: i32) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut crossings = 0u32;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if a.y == b.y {
            continue;
        }
        let (p1, p2) = if a.y < b.y { (a, b) } else { (b, a) };
        if py >= p1.y && py < p2.y {
            let slope = (p2.x - p1.x) as f64 / (p2.y - p1.y) as f64;
            let x = p1.x as f64 + slope * (py - p1.y) as f64;
            if x <= px as f64 {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

/// Hexagonal grid with per-cell pixel membership
///
/// Membership is stored compressed: `members(i)` is a slice of ascending
/// linear pixel indices.
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    step: u32,
    hex_width: u32,
    slices_x: u32,
    slices_y: u32,
    cells: Vec<GridCell>,
    offsets: Vec<usize>,
    members: Vec<usize>,
}

impl HexGrid {
    /// Build the grid and its membership lists for a `width` x `height` image.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidConfiguration`] if `step` is 0, the
    /// shrink factor is outside (0, 1], or the image cannot hold a single
    /// slice (`width` or `height` below `w / 2`). No partial grid is built.
    pub fn new(width: u32, height: u32, options: &GridOptions) -> RegionResult<Self> {
        let step = options.step;
        if step == 0 {
            return Err(RegionError::InvalidConfiguration(
                "grid step must be positive".to_string(),
            ));
        }
        let shrink = options.shrink;
        if !(shrink > 0.0 && shrink <= 1.0) {
            return Err(RegionError::InvalidConfiguration(format!(
                "shrink factor must be in (0, 1], got {}",
                shrink
            )));
        }

        let hex_width = hexagon_width(step);
        let half = hex_width / 2;
        if half == 0 || width < half || height < half {
            return Err(RegionError::InvalidConfiguration(format!(
                "{}x{} image is smaller than one grid slice ({} px) at step {}",
                width, height, half, step
            )));
        }
        let slices_x = width / half;
        let slices_y = height / half;

        let cells: Vec<GridCell> = (0..slices_y)
            .flat_map(|sy| (0..slices_x).map(move |sx| (sx, sy)))
            .enumerate()
            .map(|(i, (sx, sy))| GridCell::build(i, sx, sy, hex_width as i32, shrink))
            .collect();

        let lists: Vec<Vec<usize>> = cells
            .par_iter()
            .map(|cell| cell_members(cell, width, height))
            .collect();

        let mut offsets = Vec::with_capacity(cells.len() + 1);
        offsets.push(0);
        let mut members = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        for list in &lists {
            members.extend_from_slice(list);
            offsets.push(members.len());
        }

        debug!(
            "hex grid: step {}, hexagon width {}, {}x{} slices, {} cells, {} member pixels",
            step,
            hex_width,
            slices_x,
            slices_y,
            cells.len(),
            members.len()
        );

        Ok(Self {
            width,
            height,
            step,
            hex_width,
            slices_x,
            slices_y,
            cells,
            offsets,
            members,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Full hexagon width `w`
    #[inline]
    pub fn hex_width(&self) -> u32 {
        self.hex_width
    }

    /// Slice counts `(columns, rows)`
    #[inline]
    pub fn slices(&self) -> (u32, u32) {
        (self.slices_x, self.slices_y)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    /// Member pixel indices of cell `index`, ascending. Empty for an
    /// unknown cell.
    pub fn members(&self, index: usize) -> &[usize] {
        match (self.offsets.get(index), self.offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => &self.members[start..end],
            _ => &[],
        }
    }

    /// Total number of member pixels over all cells
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Cells whose inset polygon covers no pixel of the image
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&i| self.members(i).is_empty())
            .collect()
    }
}

fn cell_members(cell: &GridCell, width: u32, height: u32) -> Vec<usize> {
    let (min, max) = cell.bounding_box();
    let x0 = min.x.max(0);
    let y0 = min.y.max(0);
    let x1 = max.x.min(width as i32 - 1);
    let y1 = max.y.min(height as i32 - 1);

    let mut out = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            if cell.contains_point(x, y) {
                out.push(y as usize * width as usize + x as usize);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexagon_width() {
        assert_eq!(hexagon_width(8), 16);
        assert_eq!(hexagon_width(40), 80);
        assert_eq!(hexagon_width(1), 2);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            HexGrid::new(64, 64, &GridOptions::new(0)),
            Err(RegionError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            HexGrid::new(8, 8, &GridOptions::new(16)),
            Err(RegionError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            HexGrid::new(64, 64, &GridOptions::new(8).with_shrink(0.0)),
            Err(RegionError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            HexGrid::new(64, 64, &GridOptions::new(8).with_shrink(1.5)),
            Err(RegionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_slices_and_cell_order() {
        let grid = HexGrid::new(40, 24, &GridOptions::new(8)).unwrap();
        assert_eq!(grid.hex_width(), 16);
        assert_eq!(grid.slices(), (5, 3));
        assert_eq!(grid.cell_count(), 15);
        let cell = grid.cell(7).unwrap();
        assert_eq!(cell.index, 7);
        assert_eq!(cell.slice, (2, 1));
    }

    #[test]
    fn test_brick_offsets() {
        let grid = HexGrid::new(32, 32, &GridOptions::new(8)).unwrap();
        // Even column: centre at (x * 12, y * 16)
        assert_eq!(grid.cell(0).unwrap().centroid, Point::new(0, 0));
        // Odd column is shifted down by half a hexagon
        assert_eq!(grid.cell(1).unwrap().centroid, Point::new(12, 8));
        assert_eq!(grid.cell(2).unwrap().centroid, Point::new(24, 0));
    }

    #[test]
    fn test_inset_vertices() {
        let grid = HexGrid::new(16, 8, &GridOptions::new(8)).unwrap();
        let cell = grid.cell(0).unwrap();
        assert_eq!(
            cell.outer,
            [
                Point::new(8, 0),
                Point::new(4, -8),
                Point::new(-4, -8),
                Point::new(-8, 0),
                Point::new(-4, 8),
                Point::new(4, 8),
            ]
        );
        // 2/3 of (8, 0) is 5.33 -> 5; 2/3 of (4, -8) is (2.67, -5.33) -> (3, -5)
        assert_eq!(
            cell.inner,
            [
                Point::new(5, 0),
                Point::new(3, -5),
                Point::new(-3, -5),
                Point::new(-5, 0),
                Point::new(-3, 5),
                Point::new(3, 5),
            ]
        );
    }

    #[test]
    fn test_inset_rounds_halves_away_from_zero() {
        // w / 4 = 5 at step 10, so half of it lands on +-2.5
        let grid = HexGrid::new(40, 40, &GridOptions::new(10).with_shrink(0.5)).unwrap();
        let cell = grid.cell(0).unwrap();
        assert_eq!(
            cell.inner,
            [
                Point::new(5, 0),
                Point::new(3, -5),
                Point::new(-3, -5),
                Point::new(-5, 0),
                Point::new(-3, 5),
                Point::new(3, 5),
            ]
        );
    }

    #[test]
    fn test_polygon_even_odd_rule() {
        let square = [
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(4, 4),
            Point::new(0, 4),
        ];
        assert!(polygon_contains(&square, 0, 0));
        assert!(polygon_contains(&square, 2, 2));
        // The crossing at x = 4 is counted, so the right edge is outside
        assert!(!polygon_contains(&square, 4, 2));
        // Bottom edge: y < y2 fails
        assert!(!polygon_contains(&square, 2, 4));
        assert!(!polygon_contains(&square, -1, 2));
    }

    #[test]
    fn test_membership_sorted_and_disjoint() {
        let grid = HexGrid::new(48, 40, &GridOptions::new(8)).unwrap();
        let mut seen = vec![false; 48 * 40];
        for i in 0..grid.cell_count() {
            let m = grid.members(i);
            assert!(m.windows(2).all(|w| w[0] < w[1]));
            for &p in m {
                assert!(!seen[p], "pixel {} in two cells", p);
                seen[p] = true;
            }
        }
        assert!(grid.members(grid.cell_count()).is_empty());
    }

    #[test]
    fn test_membership_matches_brute_force() {
        let grid = HexGrid::new(30, 20, &GridOptions::new(6)).unwrap();
        for cell in grid.cells() {
            let brute: Vec<usize> = (0..20)
                .flat_map(|y| (0..30).map(move |x| (x, y)))
                .filter(|&(x, y)| cell.contains_point(x, y))
                .map(|(x, y)| (y * 30 + x) as usize)
                .collect();
            assert_eq!(grid.members(cell.index), brute.as_slice());
        }
    }
}
