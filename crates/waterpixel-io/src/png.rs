//! PNG image format support
//!
//! Every PNG variant is normalized on read to 8 bits per sample: palettes
//! and low bit depths are expanded, 16-bit samples keep their high byte,
//! and alpha is dropped. Gray images become 1-channel buffers, everything
//! else 3-channel.

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};
use waterpixel_core::PixelBuffer;

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<PixelBuffer> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let width = reader.info().width;
    let height = reader.info().height;
    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG output depth: {:?}",
            bit_depth
        )));
    }

    let (src_spp, channels) = match color_type {
        ColorType::Grayscale => (1usize, 1u32),
        ColorType::GrayscaleAlpha => (2, 1),
        ColorType::Rgb => (3, 3),
        ColorType::Rgba => (4, 3),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unexpected PNG output color type: {:?}",
                other
            )));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let ch = channels as usize;
    let mut data = Vec::with_capacity(width as usize * height as usize * ch);
    for y in 0..height as usize {
        let row = buf
            .get(y * bytes_per_row..(y + 1) * bytes_per_row)
            .ok_or_else(|| IoError::InvalidData(format!("PNG row {} truncated", y)))?;
        for px in row.chunks_exact(src_spp).take(width as usize) {
            data.extend_from_slice(&px[..ch]);
        }
    }

    Ok(PixelBuffer::from_vec(width, height, channels, data)?)
}

/// Write a PNG image
///
/// 1-channel buffers are written as 8-bit grayscale, 3-channel buffers as
/// 8-bit RGB.
pub fn write_png<W: Write>(image: &PixelBuffer, writer: W) -> IoResult<()> {
    let color_type = match image.channels() {
        1 => ColorType::Grayscale,
        3 => ColorType::Rgb,
        n => {
            return Err(IoError::UnsupportedFormat(format!(
                "cannot write {}-channel buffer as PNG",
                n
            )));
        }
    };

    let mut encoder = Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    writer
        .write_image_data(image.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}
