//! PNM (Portable Any Map) format support
//!
//! Reads and writes PGM (P5 binary) and PPM (P6 binary) with a maximum
//! sample value of at most 255. Samples are rescaled to `0..=255` when the
//! file declares a smaller maxval.

use crate::{IoError, IoResult};
use std::io::{BufRead, Write};
use waterpixel_core::PixelBuffer;

/// Read one whitespace-delimited header token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut byte = [0u8; 1];
    let mut in_comment = false;
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        let c = byte[0];
        if in_comment {
            if c == b'\n' || c == b'\r' {
                in_comment = false;
            }
            continue;
        }
        if c == b'#' {
            in_comment = true;
            continue;
        }
        if c.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            // The single whitespace after maxval is consumed here
            break;
        }
        token.push(c as char);
    }
    if token.is_empty() {
        return Err(IoError::InvalidData("truncated PNM header".to_string()));
    }
    Ok(token)
}

fn read_number<R: BufRead>(reader: &mut R, what: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM {}: '{}'", what, token)))
}

/// Read a binary PGM (P5) or PPM (P6) image.
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<PixelBuffer> {
    let magic = read_token(&mut reader)?;
    let channels = match magic.as_str() {
        "P5" => 1u32,
        "P6" => 3,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNM variant {} (only P5 and P6 are supported)",
                other
            )));
        }
    };

    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM maxval {} (expected 1..=255)",
            maxval
        )));
    }

    let len = width as usize * height as usize * channels as usize;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).map_err(|e| {
        IoError::InvalidData(format!("PNM raster shorter than {} bytes: {}", len, e))
    })?;

    if maxval < 255 {
        for v in &mut data {
            *v = ((*v as u32).min(maxval) * 255 / maxval) as u8;
        }
    }

    Ok(PixelBuffer::from_vec(width, height, channels, data)?)
}

/// Write a buffer as P5 (1 channel) or P6 (3 channels).
pub fn write_pnm<W: Write>(image: &PixelBuffer, mut writer: W) -> IoResult<()> {
    let magic = match image.channels() {
        1 => "P5",
        3 => "P6",
        n => {
            return Err(IoError::UnsupportedFormat(format!(
                "cannot write {}-channel buffer as PNM",
                n
            )));
        }
    };
    write!(writer, "{}\n{} {}\n255\n", magic, image.width(), image.height())?;
    writer.write_all(image.data())?;
    Ok(())
}
