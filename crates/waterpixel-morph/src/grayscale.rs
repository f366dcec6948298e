//! Grayscale morphological operations
//!
//! Erosion and dilation with a square `(2r + 1) x (2r + 1)` structuring
//! element, applied independently to every channel of a 1- or 3-channel
//! buffer. The window is clipped at the image border, so border pixels only
//! see the part of the neighbourhood that lies inside the image.
//!
//! # Algorithm
//!
//! A clipped square window is the product of a clipped row interval and a
//! clipped column interval, so the filter is computed separably: a
//! horizontal min/max pass followed by a vertical one. Both passes are
//! split across rows with rayon.
//!
//! [`outline_gray`] is the contour thickening used for rendering: it keeps
//! every non-zero pixel and paints a halo value around it.

use crate::{KernelError, MorphResult};
use rayon::prelude::*;
use waterpixel_core::{PixelBuffer, neighbors8};

/// Value written by [`outline_gray`] on pixels adjacent to a contour.
pub const HALO_VALUE: u8 = 10;

#[derive(Clone, Copy)]
enum RankOp {
    Min,
    Max,
}

impl RankOp {
    #[inline]
    fn apply(self, a: u8, b: u8) -> u8 {
        match self {
            RankOp::Min => a.min(b),
            RankOp::Max => a.max(b),
        }
    }
}

/// Erode with a square structuring element of the given radius.
///
/// Each output sample is the minimum of its channel over the clipped window.
/// A radius of 0 returns a copy of the input.
pub fn erode_gray(image: &PixelBuffer, radius: u32) -> MorphResult<PixelBuffer> {
    rank_filter(image, radius, RankOp::Min)
}

/// Dilate with a square structuring element of the given radius.
///
/// Each output sample is the maximum of its channel over the clipped window.
pub fn dilate_gray(image: &PixelBuffer, radius: u32) -> MorphResult<PixelBuffer> {
    rank_filter(image, radius, RankOp::Max)
}

fn rank_filter(image: &PixelBuffer, radius: u32, op: RankOp) -> MorphResult<PixelBuffer> {
    if radius == 0 {
        return Ok(image.clone());
    }

    let w = image.width() as usize;
    let h = image.height() as usize;
    let ch = image.channels() as usize;
    let r = radius as usize;
    let stride = image.row_stride();
    let src = image.data();

    // Horizontal pass
    let mut horiz = vec![0u8; src.len()];
    horiz
        .par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let x0 = x.saturating_sub(r);
                let x1 = (x + r).min(w - 1);
                for c in 0..ch {
                    let mut acc = in_row[x0 * ch + c];
                    for xx in x0 + 1..=x1 {
                        acc = op.apply(acc, in_row[xx * ch + c]);
                    }
                    out_row[x * ch + c] = acc;
                }
            }
        });

    // Vertical pass
    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            let y0 = y.saturating_sub(r);
            let y1 = (y + r).min(h - 1);
            out_row.copy_from_slice(&horiz[y0 * stride..(y0 + 1) * stride]);
            for yy in y0 + 1..=y1 {
                let row = &horiz[yy * stride..(yy + 1) * stride];
                for (o, &v) in out_row.iter_mut().zip(row) {
                    *o = op.apply(*o, v);
                }
            }
        });

    Ok(PixelBuffer::from_vec(
        image.width(),
        image.height(),
        image.channels(),
        out,
    )?)
}

/// Thicken a contour image by one pixel.
///
/// Pixels with any non-zero channel keep their value. A zero pixel with at
/// least one non-zero 8-neighbour becomes [`HALO_VALUE`] on every channel.
/// All other pixels stay 0.
///
/// # Errors
///
/// Fails only if the output buffer cannot be built.
pub fn outline_gray(image: &PixelBuffer) -> MorphResult<PixelBuffer> {
    let width = image.width();
    let height = image.height();
    let ch = image.channels() as usize;
    let stride = image.row_stride();
    let src = image.data();

    let is_set = |index: usize| src[index * ch..(index + 1) * ch].iter().any(|&v| v != 0);

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..width as usize {
                let index = y * width as usize + x;
                let samples = &mut out_row[x * ch..(x + 1) * ch];
                if is_set(index) {
                    samples.copy_from_slice(&src[index * ch..(index + 1) * ch]);
                } else if neighbors8(width, height, index).any(is_set) {
                    samples.fill(HALO_VALUE);
                }
            }
        });

    PixelBuffer::from_vec(width, height, image.channels(), out)
        .map_err(|e| KernelError::failed("outline", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, data: &[u8]) -> PixelBuffer {
        PixelBuffer::from_vec(width, height, 1, data.to_vec()).unwrap()
    }

    #[test]
    fn test_erode_single_bright_pixel_vanishes() {
        let mut img = PixelBuffer::filled(5, 5, 1, 0).unwrap();
        img.set(2, 2, 200).unwrap();
        let eroded = erode_gray(&img, 1).unwrap();
        assert!(eroded.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_dilate_grows_square() {
        let mut img = PixelBuffer::filled(5, 5, 1, 0).unwrap();
        img.set(2, 2, 200).unwrap();
        let dilated = dilate_gray(&img, 1).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                let inside = (1..=3).contains(&x) && (1..=3).contains(&y);
                assert_eq!(dilated.get(x, y), Some(if inside { 200 } else { 0 }));
            }
        }
    }

    #[test]
    fn test_window_is_clipped_at_border() {
        let img = gray(3, 1, &[5, 9, 7]);
        assert_eq!(erode_gray(&img, 1).unwrap().data(), &[5, 5, 7]);
        assert_eq!(dilate_gray(&img, 1).unwrap().data(), &[9, 9, 9]);
        // Radius larger than the image collapses to the global extremum
        assert_eq!(erode_gray(&img, 10).unwrap().data(), &[5, 5, 5]);
    }

    #[test]
    fn test_channels_are_independent() {
        let img = PixelBuffer::from_fn(2, 1, 3, |x, _| {
            if x == 0 { [10, 200, 30] } else { [50, 100, 0] }
        })
        .unwrap();
        let eroded = erode_gray(&img, 1).unwrap();
        assert_eq!(eroded.get_rgb(0, 0), Some((10, 100, 0)));
        let dilated = dilate_gray(&img, 1).unwrap();
        assert_eq!(dilated.get_rgb(1, 0), Some((50, 200, 30)));
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let img = gray(2, 2, &[1, 2, 3, 4]);
        assert_eq!(erode_gray(&img, 0).unwrap(), img);
    }

    #[test]
    fn test_outline_halo() {
        let mut img = PixelBuffer::filled(5, 3, 1, 0).unwrap();
        img.set(0, 1, 255).unwrap();
        let out = outline_gray(&img).unwrap();
        assert_eq!(out.get(0, 1), Some(255));
        assert_eq!(out.get(1, 0), Some(HALO_VALUE));
        assert_eq!(out.get(1, 2), Some(HALO_VALUE));
        assert_eq!(out.get(2, 1), Some(0));
        assert_eq!(out.get(4, 1), Some(0));
    }
}
