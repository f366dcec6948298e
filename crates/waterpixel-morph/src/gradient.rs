//! Perceptual color gradient
//!
//! The gradient of a pixel is the largest CIE76 color difference (ΔE)
//! between the pixel and any of its valid 8-neighbours, measured in
//! L*a*b* space. The output is a 1-channel buffer with values rounded and
//! clamped to `[0, 255]`. Flat regions therefore have gradient 0.

use crate::MorphResult;
use rayon::prelude::*;
use waterpixel_core::{Lab, PixelBuffer, neighbors8, rgb_to_lab};

/// Compute the Lab ΔE gradient magnitude of an image.
///
/// 1-channel inputs are treated as gray (`r = g = b`).
///
/// # Examples
///
/// ```
/// use waterpixel_core::PixelBuffer;
/// use waterpixel_morph::lab_gradient;
///
/// let flat = PixelBuffer::filled(4, 4, 3, 90).unwrap();
/// let g = lab_gradient(&flat).unwrap();
/// assert_eq!(g.channels(), 1);
/// assert!(g.data().iter().all(|&v| v == 0));
/// ```
pub fn lab_gradient(image: &PixelBuffer) -> MorphResult<PixelBuffer> {
    let width = image.width();
    let height = image.height();
    let n = image.pixel_count();

    let lab: Vec<Lab> = (0..n)
        .into_par_iter()
        .map(|i| {
            let (r, g, b) = image.rgb_at(i);
            rgb_to_lab(r, g, b)
        })
        .collect();

    let mut out = vec![0u8; n];
    out.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, slot) in row.iter_mut().enumerate() {
                let index = y * width as usize + x;
                let here = lab[index];
                let max = neighbors8(width, height, index)
                    .map(|j| here.delta_e(lab[j]))
                    .fold(0.0f32, f32::max);
                *slot = max.round().min(255.0) as u8;
            }
        });

    Ok(PixelBuffer::from_vec(width, height, 1, out)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_edge_is_symmetric() {
        let img =
            PixelBuffer::from_fn(6, 3, 3, |x, _| if x < 3 { [0; 3] } else { [255; 3] }).unwrap();
        let g = lab_gradient(&img).unwrap();
        for y in 0..3 {
            assert_eq!(g.get(0, y), Some(0));
            assert_eq!(g.get(1, y), Some(0));
            assert_eq!(g.get(2, y), Some(100));
            assert_eq!(g.get(3, y), Some(100));
            assert_eq!(g.get(5, y), Some(0));
        }
    }

    #[test]
    fn test_gray_input_matches_rgb() {
        let rgb = PixelBuffer::from_fn(4, 4, 3, |x, y| {
            let v = (x * 40 + y * 20) as u8;
            [v, v, v]
        })
        .unwrap();
        let gray = rgb.channel(0).unwrap();
        assert_eq!(lab_gradient(&rgb).unwrap(), lab_gradient(&gray).unwrap());
    }

    #[test]
    fn test_gradient_clamped() {
        // Pure blue against pure green is about 258 ΔE76
        let img = PixelBuffer::from_fn(2, 1, 3, |x, _| {
            if x == 0 { [0, 0, 255] } else { [0, 255, 0] }
        })
        .unwrap();
        let g = lab_gradient(&img).unwrap();
        assert_eq!(g.data(), &[255, 255]);
    }
}
