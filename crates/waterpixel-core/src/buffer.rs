//! PixelBuffer - the image container shared by every pipeline stage
//!
//! # Pixel layout
//!
//! - Row-major, no row padding
//! - Samples are interleaved: pixel `p` occupies `data[p * channels .. (p + 1) * channels]`
//! - Channel count is 1 (scalar stages such as gradient or distance) or 3 (color)
//!
//! A *pixel index* is the linear position `y * width + x`; a *sample index*
//! is `pixel_index * channels + channel`. Everything above the buffer layer
//! addresses pixels, never raw samples.

use crate::error::{Error, Result};

/// Owned 8-bit image buffer with 1 or 3 interleaved channels.
///
/// # Examples
///
/// ```
/// use waterpixel_core::PixelBuffer;
///
/// let mut buf = PixelBuffer::new(4, 2, 3).unwrap();
/// buf.set_rgb(1, 1, 10, 20, 30).unwrap();
/// assert_eq!(buf.get_rgb(1, 1), Some((10, 20, 30)));
/// assert_eq!(buf.pixel_count(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0 and
    /// [`Error::InvalidChannels`] unless `channels` is 1 or 3.
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self> {
        Self::filled(width, height, channels, 0)
    }

    /// Create a buffer with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u32, value: u8) -> Result<Self> {
        Self::check_geometry(width, height, channels)?;
        let len = width as usize * height as usize * channels as usize;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![value; len],
        })
    }

    /// Wrap existing interleaved sample data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if `data.len()` differs from
    /// `width * height * channels`.
    pub fn from_vec(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        Self::check_geometry(width, height, channels)?;
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// `f` returns the samples of one pixel; only the first `channels`
    /// entries are used.
    pub fn from_fn<F>(width: u32, height: u32, channels: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let mut buf = Self::new(width, height, channels)?;
        let ch = channels as usize;
        for y in 0..height {
            for x in 0..width {
                let samples = f(x, y);
                let start = buf.pixel_index(x, y) * ch;
                buf.data[start..start + ch].copy_from_slice(&samples[..ch]);
            }
        }
        Ok(buf)
    }

    /// Wrap samples whose geometry the caller has already validated.
    pub(crate) fn from_raw(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * channels as usize
        );
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    fn check_geometry(width: u32, height: u32, channels: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if channels != 1 && channels != 3 {
            return Err(Error::InvalidChannels(channels));
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Samples per row (`width * channels`).
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its raw samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Linear pixel index of `(x, y)`. The caller guarantees bounds.
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Inverse of [`pixel_index`](Self::pixel_index).
    #[inline]
    pub fn coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Check that two buffers have the same width and height.
    pub fn check_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            });
        }
        Ok(())
    }

    /// Sample `channel` of pixel `index`, or `None` if out of range.
    #[inline]
    pub fn sample(&self, index: usize, channel: u32) -> Option<u8> {
        if channel >= self.channels {
            return None;
        }
        self.data
            .get(index * self.channels as usize + channel as usize)
            .copied()
    }

    /// Sample `channel` of pixel `index` without the range check on `channel`.
    ///
    /// Panics if `index` is outside the buffer.
    #[inline]
    pub fn sample_unchecked(&self, index: usize, channel: u32) -> u8 {
        self.data[index * self.channels as usize + channel as usize]
    }

    /// Get the first-channel value at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.sample(self.pixel_index(x, y), 0)
    }

    /// Set every channel of pixel `(x, y)` to `value`.
    pub fn set(&mut self, x: u32, y: u32, value: u8) -> Result<()> {
        let index = self.checked_index(x, y)?;
        let ch = self.channels as usize;
        self.data[index * ch..(index + 1) * ch].fill(value);
        Ok(())
    }

    /// Get the color of pixel `(x, y)`. 1-channel buffers report gray.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.rgb_at(self.pixel_index(x, y)))
    }

    /// Color of pixel `index`. Panics if `index` is outside the buffer.
    #[inline]
    pub fn rgb_at(&self, index: usize) -> (u8, u8, u8) {
        if self.channels == 3 {
            let s = index * 3;
            (self.data[s], self.data[s + 1], self.data[s + 2])
        } else {
            let v = self.data[index];
            (v, v, v)
        }
    }

    /// Set the color of pixel `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChannels`] on a 1-channel buffer.
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        if self.channels != 3 {
            return Err(Error::InvalidChannels(self.channels));
        }
        let s = self.checked_index(x, y)? * 3;
        self.data[s] = r;
        self.data[s + 1] = g;
        self.data[s + 2] = b;
        Ok(())
    }

    fn checked_index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: y as usize * self.width as usize + x as usize,
                len: self.pixel_count(),
            });
        }
        Ok(self.pixel_index(x, y))
    }

    /// Fill every sample with `value`.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Extract one channel as a new 1-channel buffer.
    pub fn channel(&self, channel: u32) -> Result<PixelBuffer> {
        if channel >= self.channels {
            return Err(Error::InvalidParameter(format!(
                "channel {} of a {}-channel buffer",
                channel, self.channels
            )));
        }
        let ch = self.channels as usize;
        let data = self
            .data
            .iter()
            .skip(channel as usize)
            .step_by(ch)
            .copied()
            .collect();
        PixelBuffer::from_vec(self.width, self.height, 1, data)
    }

    /// Replicate a 1-channel buffer into 3 channels. 3-channel buffers are cloned.
    pub fn to_rgb(&self) -> PixelBuffer {
        if self.channels == 3 {
            return self.clone();
        }
        let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
        Self {
            width: self.width,
            height: self.height,
            channels: 3,
            data,
        }
    }

    /// Iterate over rows as sample slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.row_stride())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_geometry() {
        assert!(matches!(
            PixelBuffer::new(0, 4, 3),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(matches!(
            PixelBuffer::new(4, 4, 2),
            Err(Error::InvalidChannels(2))
        ));
    }

    #[test]
    fn test_from_vec_length_check() {
        assert!(PixelBuffer::from_vec(2, 2, 1, vec![0; 4]).is_ok());
        assert!(matches!(
            PixelBuffer::from_vec(2, 2, 3, vec![0; 4]),
            Err(Error::DataLength {
                expected: 12,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_index_roundtrip() {
        let buf = PixelBuffer::new(7, 5, 1).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(buf.coords(buf.pixel_index(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn test_channel_extract_and_expand() {
        let buf = PixelBuffer::from_fn(3, 1, 3, |x, _| [x as u8, 10, 20]).unwrap();
        let red = buf.channel(0).unwrap();
        assert_eq!(red.data(), &[0, 1, 2]);
        let gray = red.to_rgb();
        assert_eq!(gray.get_rgb(2, 0), Some((2, 2, 2)));
        assert!(buf.channel(3).is_err());
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut buf = PixelBuffer::new(2, 2, 1).unwrap();
        assert!(buf.set(2, 0, 1).is_err());
        assert!(buf.set_rgb(0, 0, 1, 2, 3).is_err());
        buf.set(1, 1, 9).unwrap();
        assert_eq!(buf.get(1, 1), Some(9));
        assert_eq!(buf.sample(3, 0), Some(9));
        assert_eq!(buf.sample(3, 1), None);
    }
}
