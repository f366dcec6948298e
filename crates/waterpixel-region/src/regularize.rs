//! Spatially regularized gradient
//!
//! `regularized = min(255, gradient + distance)` per sample. The distance
//! field pulls basin boundaries toward the middle between markers, which
//! keeps waterpixels close to the hexagonal grid on flat image areas.

use crate::{RegionError, RegionResult};
use rayon::prelude::*;
use waterpixel_core::PixelBuffer;

/// Combine a gradient with a marker distance field.
///
/// The output has the gradient's channel count. A 1-channel distance field
/// is added to every gradient channel; otherwise channel counts must match.
///
/// # Examples
///
/// ```
/// use waterpixel_core::PixelBuffer;
/// use waterpixel_region::regularize;
///
/// let g = PixelBuffer::from_vec(3, 1, 1, vec![0, 100, 200]).unwrap();
/// let d = PixelBuffer::from_vec(3, 1, 1, vec![10, 100, 100]).unwrap();
/// assert_eq!(regularize(&g, &d).unwrap().data(), &[10, 200, 255]);
/// ```
pub fn regularize(gradient: &PixelBuffer, distance: &PixelBuffer) -> RegionResult<PixelBuffer> {
    gradient.check_same_size(distance)?;

    let gc = gradient.channels() as usize;
    let dc = distance.channels() as usize;
    if dc != 1 && dc != gc {
        return Err(RegionError::ChannelMismatch {
            expected: "1 or the gradient's channel count",
            actual: distance.channels(),
        });
    }

    let mut out = vec![0u8; gradient.data().len()];
    out.par_chunks_mut(gradient.row_stride())
        .zip(gradient.data().par_chunks(gradient.row_stride()))
        .zip(distance.data().par_chunks(distance.row_stride()))
        .for_each(|((out_row, g_row), d_row)| {
            for (i, (o, &g)) in out_row.iter_mut().zip(g_row).enumerate() {
                let d = if dc == 1 { d_row[i / gc] } else { d_row[i] };
                *o = g.saturating_add(d);
            }
        });

    Ok(PixelBuffer::from_vec(
        gradient.width(),
        gradient.height(),
        gradient.channels(),
        out,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_over_channels() {
        let g = PixelBuffer::from_fn(2, 1, 3, |x, _| if x == 0 { [1, 2, 3] } else { [250, 0, 5] })
            .unwrap();
        let d = PixelBuffer::from_vec(2, 1, 1, vec![10, 20]).unwrap();
        let r = regularize(&g, &d).unwrap();
        assert_eq!(r.data(), &[11, 12, 13, 255, 20, 25]);
    }

    #[test]
    fn test_rejects_mismatch() {
        let g = PixelBuffer::new(2, 2, 1).unwrap();
        let d = PixelBuffer::new(2, 1, 1).unwrap();
        assert!(matches!(regularize(&g, &d), Err(RegionError::Core(_))));

        let d3 = PixelBuffer::new(2, 2, 3).unwrap();
        assert!(matches!(
            regularize(&g, &d3),
            Err(RegionError::ChannelMismatch { actual: 3, .. })
        ));
    }
}
