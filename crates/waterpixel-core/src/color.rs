//! sRGB to CIE L*a*b* conversion
//!
//! Uses the D65 reference white and the standard sRGB transfer curve.
//! Ranges: `l` in [0, 100], `a` and `b` roughly in [-128, 127].

/// CIE L*a*b* color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// CIE76 color difference (Euclidean distance in Lab).
    #[inline]
    pub fn delta_e(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

// D65 reference white
const XN: f32 = 0.950_47;
const YN: f32 = 1.0;
const ZN: f32 = 1.088_83;

const EPSILON: f32 = 216.0 / 24389.0;
const KAPPA: f32 = 24389.0 / 27.0;

#[inline]
fn srgb_to_linear(v: u8) -> f32 {
    let c = v as f32 / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// Convert an 8-bit sRGB color to L*a*b*.
///
/// # Examples
///
/// ```
/// use waterpixel_core::color::rgb_to_lab;
///
/// let white = rgb_to_lab(255, 255, 255);
/// assert!((white.l - 100.0).abs() < 0.01);
/// let black = rgb_to_lab(0, 0, 0);
/// assert!(black.l.abs() < 0.01);
/// ```
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let rl = srgb_to_linear(r);
    let gl = srgb_to_linear(g);
    let bl = srgb_to_linear(b);

    let x = 0.412_456_4 * rl + 0.357_576_1 * gl + 0.180_437_5 * bl;
    let y = 0.212_672_9 * rl + 0.715_152_2 * gl + 0.072_175 * bl;
    let z = 0.019_333_9 * rl + 0.119_192 * gl + 0.950_304_1 * bl;

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_has_no_chroma() {
        for v in [0u8, 64, 128, 200, 255] {
            let lab = rgb_to_lab(v, v, v);
            assert!(lab.a.abs() < 0.05, "a = {} for gray {}", lab.a, v);
            assert!(lab.b.abs() < 0.05, "b = {} for gray {}", lab.b, v);
        }
    }

    #[test]
    fn test_lightness_is_monotonic() {
        let mut prev = -1.0;
        for v in (0..=255u8).step_by(15) {
            let l = rgb_to_lab(v, v, v).l;
            assert!(l > prev);
            prev = l;
        }
    }

    #[test]
    fn test_black_white_delta() {
        let d = rgb_to_lab(0, 0, 0).delta_e(rgb_to_lab(255, 255, 255));
        assert!((d - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_red_reference() {
        // sRGB red is approximately L=53.24, a=80.09, b=67.20
        let lab = rgb_to_lab(255, 0, 0);
        assert!((lab.l - 53.24).abs() < 0.1);
        assert!((lab.a - 80.09).abs() < 0.2);
        assert!((lab.b - 67.20).abs() < 0.2);
    }
}
