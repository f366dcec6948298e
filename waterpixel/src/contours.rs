//! Contour rendering
//!
//! Turns the watershed lines of a [`LabelMap`] into a 1-channel contour
//! image and paints it over the input. Rendering never changes the labels.
//!
//! With outlining enabled the raw lines are first thickened by a radius-1
//! dilation (the "core", value 255), then the backend's outline pass adds
//! a one-pixel halo around the core (value [`HALO_VALUE`]).

use waterpixel_core::{LabelMap, PixelBuffer};
use waterpixel_morph::{ComputeBackend, DilateMode, HALO_VALUE, MorphResult, dilate_gray};

/// Contour value of the core lines
pub const CORE_VALUE: u8 = 255;

/// Render the contour image of `labels`.
///
/// Returns a 1-channel buffer: [`CORE_VALUE`] on the lines, [`HALO_VALUE`]
/// around them when `outline` is set, 0 elsewhere.
pub fn render_contours<B: ComputeBackend + ?Sized>(
    backend: &B,
    step: u32,
    labels: &LabelMap,
    outline: bool,
) -> MorphResult<PixelBuffer> {
    let raw = labels.contour_mask();
    if !outline {
        return Ok(raw);
    }
    let core = dilate_gray(&raw, 1)?;
    backend.dilate(step, &core, DilateMode::Outline)
}

/// Paint a contour image over `image`.
///
/// Core pixels become white, halo pixels become `(10, 10, 10)`, the rest
/// keeps the input color. The output is always RGB.
pub fn paint_contours(image: &PixelBuffer, contours: &PixelBuffer) -> MorphResult<PixelBuffer> {
    image.check_same_size(contours)?;
    let mut out = image.to_rgb();
    for (pixel, &c) in out
        .data_mut()
        .chunks_exact_mut(3)
        .zip(contours.data().iter().step_by(contours.channels() as usize))
    {
        match c {
            CORE_VALUE => pixel.fill(CORE_VALUE),
            HALO_VALUE => pixel.fill(HALO_VALUE),
            _ => {}
        }
    }
    Ok(out)
}
