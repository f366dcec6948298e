//! waterpixel command line
//!
//! ```text
//! waterpixel segment photo.png --step 20 --out build/photo_20
//! waterpixel evaluate build/photo_20/contours.png photo_groundTruth.png
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use waterpixel::io::{ImageFormat, read_image, write_image};
use waterpixel::morph::CpuBackend;
use waterpixel::region::{GridOptions, MarkerOptions};
use waterpixel::{DEFAULT_TOLERANCE, SegmentOptions, Segmenter, evaluate_boundaries};

#[derive(Parser, Debug)]
#[command(name = "waterpixel", version, about = "Waterpixel superpixel segmentation")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment an image and write every stage as PNG
    Segment(SegmentArgs),
    /// Score a contour image against a ground-truth boundary image
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Input image (PNG or PNM)
    input: PathBuf,
    /// Grid step in pixels
    #[arg(long, default_value_t = 40)]
    step: u32,
    /// Hexagon shrink factor in (0, 1]
    #[arg(long, default_value_t = 2.0 / 3.0)]
    shrink: f32,
    /// Marker selection workers (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Search every component of a cell instead of stopping at 50% coverage
    #[arg(long)]
    no_early_exit: bool,
    /// Weight of the distance term in the regularized gradient
    #[arg(long, default_value_t = 64.0)]
    regularization: f32,
    /// Do not thicken contours
    #[arg(long)]
    thin: bool,
    /// Output directory
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Contour image (255 = contour)
    contours: PathBuf,
    /// Ground-truth boundary image (non-zero = boundary)
    ground_truth: PathBuf,
    /// Distance below which a boundary pixel counts as recalled
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Segment(args) => run_segment(args),
        Command::Evaluate(args) => run_evaluate(args),
    }
}

fn run_segment(args: SegmentArgs) -> Result<()> {
    let image = read_image(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let options = SegmentOptions::default()
        .with_grid(GridOptions::new(args.step).with_shrink(args.shrink))
        .with_markers(
            MarkerOptions::new()
                .with_workers(args.workers)
                .with_early_exit(!args.no_early_exit),
        )
        .with_render_outline(!args.thin);
    let backend = CpuBackend::new().with_regularization(args.regularization);
    let seg = Segmenter::new(backend, options)
        .segment(&image)
        .with_context(|| format!("failed to segment {}", args.input.display()))?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    for (name, buffer) in seg.snapshots() {
        let path = args.out.join(format!("{name}.{}", ImageFormat::Png.extension()));
        write_image(&buffer, &path, ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let d = &seg.diagnostics;
    println!(
        "{}x{} step {}: {} cells ({} degenerate), {} basins, {} marker pixels",
        image.width(),
        image.height(),
        args.step,
        d.cell_count,
        d.degenerate_cells,
        d.basin_count,
        d.marker_pixels
    );
    println!(
        "contour pixels {}, CD = {:.6}, {:.1} ms",
        d.contour_pixels,
        d.contour_density,
        d.timings.total.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let contours = read_image(&args.contours)
        .with_context(|| format!("failed to read {}", args.contours.display()))?;
    let ground_truth = read_image(&args.ground_truth)
        .with_context(|| format!("failed to read {}", args.ground_truth.display()))?;

    let scores = evaluate_boundaries(&contours, &ground_truth, args.tolerance)?;
    println!("boundary recall   {:.4}", scores.boundary_recall);
    println!("mean distance     {:.4}", scores.mean_distance);
    println!("median distance   {:.4}", scores.median_distance);
    println!("boundary pixels   {}", scores.ground_truth_pixels);
    Ok(())
}
