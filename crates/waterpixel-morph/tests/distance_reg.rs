//! Gradient and distance field regression test
//!
//! Run with:
//! ```
//! cargo test -p waterpixel-morph --test distance_reg
//! ```

use waterpixel_core::PixelBuffer;
use waterpixel_morph::{
    ComputeBackend, CpuBackend, KernelError, distance_from_markers, lab_gradient,
    squared_distance_transform,
};
use waterpixel_test::RegParams;

#[test]
fn distance_reg() {
    let mut rp = RegParams::new("distance");

    let (width, height) = (40u32, 30u32);
    let markers = [0usize, 13 * 40 + 27, 29 * 40 + 5, 7 * 40 + 39];
    let mut seeds = vec![false; (width * height) as usize];
    for &m in &markers {
        seeds[m] = true;
    }

    // Exact squared distances against a brute-force scan
    let sq = squared_distance_transform(width, height, &seeds);
    let mut exact = true;
    for (i, &d) in sq.iter().enumerate() {
        let (x, y) = ((i % 40) as f64, (i / 40) as f64);
        let brute = markers
            .iter()
            .map(|&m| {
                let (mx, my) = ((m % 40) as f64, (m / 40) as f64);
                (x - mx).powi(2) + (y - my).powi(2)
            })
            .fold(f64::INFINITY, f64::min);
        exact &= (brute - d).abs() < 1e-9;
    }
    rp.compare_values(1.0, if exact { 1.0 } else { 0.0 }, 0.0);

    // Scaled field: 0 on markers, k at half a step, clamped at 255
    let field = distance_from_markers(width, height, 10, &markers, 64.0).expect("distance");
    rp.compare_values(1.0, field.channels() as f64, 0.0);
    rp.compare_values(0.0, field.sample(13 * 40 + 27, 0).unwrap_or(1) as f64, 0.0);
    rp.compare_values(64.0, field.get(32, 13).unwrap_or(0) as f64, 0.0);
    rp.compare_values(255.0, field.get(39, 29).unwrap_or(0) as f64, 0.0);

    let cpu = CpuBackend::new().with_regularization(64.0);
    let via_backend = cpu
        .distance_from_markers(width, height, 10, &markers)
        .expect("backend distance");
    rp.compare_buffers(&field, &via_backend);

    rp.write_buffer_and_check(&field).expect("write distance");

    // Marker outside the image is a distance kernel failure
    let err = distance_from_markers(width, height, 10, &[(width * height) as usize], 64.0);
    let failed = matches!(
        err,
        Err(KernelError::Failed {
            kernel: "distance",
            ..
        })
    );
    rp.compare_values(1.0, if failed { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "distance regression test failed");
}

#[test]
fn gradient_reg() {
    let mut rp = RegParams::new("gradient");

    // Vertical step from black to white: ΔE of 100 on both sides of the edge
    let image = PixelBuffer::from_fn(12, 6, 3, |x, _| if x < 6 { [0; 3] } else { [255; 3] })
        .expect("image");
    let g = lab_gradient(&image).expect("gradient");
    for x in 0..12 {
        let expected = if x == 5 || x == 6 { 100.0 } else { 0.0 };
        rp.compare_values(expected, g.get(x, 3).unwrap_or(0) as f64, 0.0);
    }

    let via_backend = CpuBackend::new().gradient(&image).expect("backend gradient");
    rp.compare_buffers(&g, &via_backend);

    rp.write_buffer_and_check(&g).expect("write gradient");

    assert!(rp.cleanup(), "gradient regression test failed");
}
