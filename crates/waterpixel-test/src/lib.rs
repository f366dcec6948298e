//! waterpixel-test - Regression test framework
//!
//! Every `tests/*_reg.rs` file drives one [`RegParams`], records numbered
//! checks against it and asserts on [`RegParams::cleanup`]. Three modes
//! are supported:
//!
//! - **Compare**: Check values and buffers; images are compared with golden
//!   files when a golden exists (default)
//! - **Generate**: Write golden files from the current output
//! - **Display**: Run checks and keep the rendered images in `tests/regout`
//!   for visual inspection
//!
//! # Usage
//!
//! ```ignore
//! use waterpixel_test::RegParams;
//!
//! let mut rp = RegParams::new("watershed");
//! rp.compare_values(2.0, basins as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // waterpixel-test is at crates/waterpixel-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
