//! 8-connected neighbourhood arithmetic on linear pixel indices
//!
//! Neighbours are produced in a fixed order: north, south, east, west,
//! north-east, north-west, south-east, south-west. Every candidate is
//! checked against both the row and the column bounds, so a neighbour never
//! wraps from the last column of one row onto the first column of the next.

/// Offsets `(dx, dy)` in visiting order.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, -1),
    (-1, -1),
    (1, 1),
    (-1, 1),
];

/// Valid 8-neighbours of pixel `index` in a `width` x `height` grid.
///
/// Returns an empty iterator if `index` itself is outside the grid.
///
/// # Examples
///
/// ```
/// use waterpixel_core::neighbors8;
///
/// // Top-left corner of a 3x3 grid: south, east and south-east only.
/// let n: Vec<usize> = neighbors8(3, 3, 0).collect();
/// assert_eq!(n, vec![3, 1, 4]);
/// ```
pub fn neighbors8(width: u32, height: u32, index: usize) -> impl Iterator<Item = usize> {
    let w = width as i64;
    let h = height as i64;
    let len = (w * h) as usize;
    let (x, y) = if index < len && w > 0 {
        ((index as i64) % w, (index as i64) / w)
    } else {
        (-2, -2)
    };
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x + dx as i64;
        let ny = y + dy as i64;
        if x < 0 || nx < 0 || ny < 0 || nx >= w || ny >= h {
            None
        } else {
            Some((ny * w + nx) as usize)
        }
    })
}
