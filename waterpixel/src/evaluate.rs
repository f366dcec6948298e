//! Boundary recall against a ground-truth boundary image
//!
//! For every ground-truth boundary pixel the Euclidean distance to the
//! nearest contour pixel is truncated to an integer. Boundary recall is the
//! fraction of those distances below the tolerance.
//!
//! Contour pixels are those whose first channel is 255 (the core lines of
//! a rendered contour image); ground-truth pixels are any non-zero first
//! channel.

use thiserror::Error;
use waterpixel_core::PixelBuffer;
use waterpixel_morph::squared_distance_transform;

/// Default recall tolerance in pixels
pub const DEFAULT_TOLERANCE: u32 = 3;

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("contour image has no contour pixels")]
    EmptyContours,

    #[error("ground truth has no boundary pixels")]
    EmptyGroundTruth,

    #[error("core error: {0}")]
    Core(#[from] waterpixel_core::Error),
}

/// Boundary quality scores
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryScores {
    /// Fraction of ground-truth pixels within `tolerance` of a contour
    pub boundary_recall: f64,
    /// Mean truncated distance to the nearest contour pixel
    pub mean_distance: f64,
    /// Median truncated distance (mean of the two middle values when even)
    pub median_distance: f64,
    /// Number of ground-truth boundary pixels
    pub ground_truth_pixels: usize,
}

/// Score `contours` against `ground_truth`.
///
/// # Errors
///
/// Fails if the images differ in size or either contains no boundary.
pub fn evaluate_boundaries(
    contours: &PixelBuffer,
    ground_truth: &PixelBuffer,
    tolerance: u32,
) -> Result<BoundaryScores, EvaluateError> {
    contours.check_same_size(ground_truth)?;

    let n = contours.pixel_count();
    let seeds: Vec<bool> = (0..n)
        .map(|i| contours.sample_unchecked(i, 0) == 255)
        .collect();
    if !seeds.contains(&true) {
        return Err(EvaluateError::EmptyContours);
    }

    let sq = squared_distance_transform(contours.width(), contours.height(), &seeds);
    let mut distances: Vec<u32> = (0..n)
        .filter(|&i| ground_truth.sample_unchecked(i, 0) != 0)
        .map(|i| sq[i].sqrt() as u32)
        .collect();
    if distances.is_empty() {
        return Err(EvaluateError::EmptyGroundTruth);
    }

    let total = distances.len();
    let recalled = distances.iter().filter(|&&d| d < tolerance).count();
    let mean = distances.iter().map(|&d| d as f64).sum::<f64>() / total as f64;

    distances.sort_unstable();
    let median = if total % 2 == 1 {
        distances[total / 2] as f64
    } else {
        (distances[total / 2 - 1] as f64 + distances[total / 2] as f64) / 2.0
    };

    Ok(BoundaryScores {
        boundary_recall: recalled as f64 / total as f64,
        mean_distance: mean,
        median_distance: median,
        ground_truth_pixels: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(width: u32, height: u32, x: u32, value: u8) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, 1, |px, _| if px == x { [value; 3] } else { [0; 3] })
            .unwrap()
    }

    #[test]
    fn test_perfect_overlap() {
        let c = column(10, 4, 5, 255);
        let s = evaluate_boundaries(&c, &c, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(s.boundary_recall, 1.0);
        assert_eq!(s.mean_distance, 0.0);
        assert_eq!(s.ground_truth_pixels, 4);
    }

    #[test]
    fn test_shifted_boundary() {
        let c = column(12, 4, 2, 255);
        let near = column(12, 4, 4, 1);
        let s = evaluate_boundaries(&c, &near, 3).unwrap();
        assert_eq!(s.boundary_recall, 1.0);
        assert_eq!(s.median_distance, 2.0);

        let far = column(12, 4, 9, 1);
        let s = evaluate_boundaries(&c, &far, 3).unwrap();
        assert_eq!(s.boundary_recall, 0.0);
        assert_eq!(s.mean_distance, 7.0);
    }

    #[test]
    fn test_halo_is_not_a_contour() {
        let halo = column(6, 2, 1, 10);
        let gt = column(6, 2, 1, 1);
        assert!(matches!(
            evaluate_boundaries(&halo, &gt, 3),
            Err(EvaluateError::EmptyContours)
        ));
        let c = column(6, 2, 1, 255);
        let empty = PixelBuffer::new(6, 2, 1).unwrap();
        assert!(matches!(
            evaluate_boundaries(&c, &empty, 3),
            Err(EvaluateError::EmptyGroundTruth)
        ));
    }
}
