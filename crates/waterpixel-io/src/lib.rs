//! waterpixel-io - Image I/O for waterpixel segmentation
//!
//! Reads and writes [`PixelBuffer`]s as PNG or binary PNM. This is the
//! presentation layer used by the command-line tool and the regression
//! tests; the segmentation crates never touch files.
//!
//! # Supported formats
//!
//! - PNG (feature `png-format`, default)
//! - PGM/PPM binary (feature `pnm`, default)

mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format_from_bytes};

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use waterpixel_core::PixelBuffer;

/// Read an image file, detecting the format from its contents
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let data = std::fs::read(path)?;
    read_image_mem(&data)
}

/// Decode an image held in memory
pub fn read_image_mem(data: &[u8]) -> IoResult<PixelBuffer> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(Cursor::new(data)),
        #[allow(unreachable_patterns)]
        format => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            format
        ))),
    }
}

/// Write an image file in the given format
pub fn write_image<P: AsRef<Path>>(
    image: &PixelBuffer,
    path: P,
    format: ImageFormat,
) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image_to(image, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into a byte vector
pub fn write_image_mem(image: &PixelBuffer, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_image_to(image, &mut out, format)?;
    Ok(out)
}

fn write_image_to<W: Write>(image: &PixelBuffer, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(image, writer),
        #[allow(unreachable_patterns)]
        format => {
            let _ = writer;
            Err(IoError::UnsupportedFormat(format!(
                "{:?} support not enabled",
                format
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_roundtrip_both_formats() {
        let img = PixelBuffer::from_fn(4, 3, 3, |x, y| [x as u8 * 60, y as u8 * 80, 7]).unwrap();
        for format in [ImageFormat::Png, ImageFormat::Pnm] {
            let bytes = write_image_mem(&img, format).unwrap();
            assert_eq!(detect_format_from_bytes(&bytes).unwrap(), format);
            assert_eq!(read_image_mem(&bytes).unwrap(), img);
        }
    }
}
