//! Exact Euclidean distance transform
//!
//! Separable lower-envelope-of-parabolas algorithm (Felzenszwalb and
//! Huttenlocher): a 1-D squared distance transform along every column,
//! then along every row of the column result. Runs in O(width * height).
//!
//! [`distance_from_markers`] turns the transform into the spatial
//! regularization term of the waterpixel pipeline.

use crate::{KernelError, MorphResult};
use rayon::prelude::*;
use waterpixel_core::PixelBuffer;

/// Stand-in for +inf in the squared-distance domain.
const FAR: f64 = 1e20;

/// One-dimensional squared distance transform of the sampled function `f`.
fn dt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

/// Squared Euclidean distance from every pixel to the nearest seed.
///
/// `seeds` is a row-major flag per pixel. Pixels are at [`FAR`] when there
/// is no seed at all.
pub fn squared_distance_transform(width: u32, height: u32, seeds: &[bool]) -> Vec<f64> {
    let w = width as usize;
    let h = height as usize;
    debug_assert_eq!(seeds.len(), w * h);

    // Columns: stored transposed so every column is a contiguous slice.
    let mut cols = vec![0.0f64; w * h];
    cols.par_chunks_mut(h).enumerate().for_each(|(x, col)| {
        let f: Vec<f64> = (0..h)
            .map(|y| if seeds[y * w + x] { 0.0 } else { FAR })
            .collect();
        let mut v = vec![0usize; h];
        let mut z = vec![0.0f64; h + 1];
        dt_1d(&f, col, &mut v, &mut z);
    });

    let mut out = vec![0.0f64; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let f: Vec<f64> = (0..w).map(|x| cols[x * h + y]).collect();
        let mut v = vec![0usize; w];
        let mut z = vec![0.0f64; w + 1];
        dt_1d(&f, row, &mut v, &mut z);
    });

    out
}

/// Distance from every pixel to the nearest marker pixel, scaled by the
/// grid step.
///
/// The value at distance `d` is `min(255, round(k * 2 * d / step))`, where
/// `k` is the regularization weight. Pixels at half a grid step from a
/// marker therefore get `k`. With no markers every pixel is 255.
///
/// # Errors
///
/// Returns a `distance` [`KernelError`] if `step` is 0, `k` is negative or
/// not finite, or a marker index lies outside `width * height`.
pub fn distance_from_markers(
    width: u32,
    height: u32,
    step: u32,
    markers: &[usize],
    k: f32,
) -> MorphResult<PixelBuffer> {
    if step == 0 {
        return Err(KernelError::failed("distance", "grid step must be positive"));
    }
    if !k.is_finite() || k < 0.0 {
        return Err(KernelError::failed(
            "distance",
            format!("regularization weight must be finite and non-negative, got {k}"),
        ));
    }

    let len = width as usize * height as usize;
    if markers.is_empty() {
        return Ok(PixelBuffer::filled(width, height, 1, 255)?);
    }

    let mut seeds = vec![false; len];
    for &m in markers {
        let slot = seeds.get_mut(m).ok_or_else(|| {
            KernelError::failed("distance", format!("marker index {m} outside {len} pixels"))
        })?;
        *slot = true;
    }

    let sq = squared_distance_transform(width, height, &seeds);
    let scale = 2.0 * k as f64 / step as f64;
    let data: Vec<u8> = sq
        .par_iter()
        .map(|&d2| (scale * d2.sqrt()).round().min(255.0) as u8)
        .collect();

    Ok(PixelBuffer::from_vec(width, height, 1, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(width: u32, height: u32, seeds: &[bool]) -> Vec<f64> {
        assert_eq!(seeds.len(), (width * height) as usize);
        let w = width as i64;
        let pts: Vec<(i64, i64)> = seeds
            .iter()
            .enumerate()
            .filter(|(_, s)| **s)
            .map(|(i, _)| (i as i64 % w, i as i64 / w))
            .collect();
        (0..seeds.len() as i64)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                pts.iter()
                    .map(|&(sx, sy)| ((x - sx).pow(2) + (y - sy).pow(2)) as f64)
                    .fold(f64::INFINITY, f64::min)
            })
            .collect()
    }

    #[test]
    fn test_edt_matches_brute_force() {
        let (w, h) = (13u32, 9u32);
        let mut seeds = vec![false; (w * h) as usize];
        for i in [0usize, 20, 57, 58, 110] {
            seeds[i] = true;
        }
        let fast = squared_distance_transform(w, h, &seeds);
        let slow = brute_force(w, h, &seeds);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_single_marker_scaling() {
        // step 8, k 4: value = round(d)
        let d = distance_from_markers(9, 1, 8, &[0], 4.0).unwrap();
        assert_eq!(d.data(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_clamped_to_255() {
        let d = distance_from_markers(50, 1, 1, &[0], 64.0).unwrap();
        assert_eq!(d.get(0, 0), Some(0));
        assert_eq!(d.get(49, 0), Some(255));
    }

    #[test]
    fn test_no_markers_is_far() {
        let d = distance_from_markers(3, 3, 4, &[], 64.0).unwrap();
        assert!(d.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_bad_marker_is_kernel_failure() {
        let err = distance_from_markers(3, 3, 4, &[9], 64.0).unwrap_err();
        assert_eq!(err.kernel(), Some("distance"));
        assert!(distance_from_markers(3, 3, 0, &[0], 64.0).is_err());
    }
}
