//! Label maps and marker masks
//!
//! [`LabelMap`] holds one basin label per pixel (0 = unassigned / watershed
//! line). [`MarkerMask`] holds one marker flag per pixel.

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Per-pixel basin labels. 0 means unlabeled; labels are dense from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl LabelMap {
    /// Create an all-zero label map.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            labels: vec![0; width as usize * height as usize],
        })
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
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Raw labels in row-major order.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Label at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.labels[y as usize * self.width as usize + x as usize])
    }

    /// Label of pixel `index`. Panics if out of range.
    #[inline]
    pub fn label_at(&self, index: usize) -> u32 {
        self.labels[index]
    }

    /// Assign `label` to pixel `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is outside the map.
    pub fn set_label(&mut self, index: usize, label: u32) -> Result<()> {
        let len = self.labels.len();
        let slot = self
            .labels
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = label;
        Ok(())
    }

    /// Highest label present (the number of basins for a dense labelling).
    pub fn max_label(&self) -> u32 {
        self.labels.iter().copied().max().unwrap_or(0)
    }

    /// Number of pixels left at label 0.
    pub fn unlabeled_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 0).count()
    }

    /// Pixel count per label, indexed by label (entry 0 counts unlabeled pixels).
    pub fn label_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.max_label() as usize + 1];
        for &l in &self.labels {
            sizes[l as usize] += 1;
        }
        sizes
    }

    /// 1-channel mask with 255 on every unlabeled pixel and 0 elsewhere.
    pub fn contour_mask(&self) -> PixelBuffer {
        let data = self
            .labels
            .iter()
            .map(|&l| if l == 0 { 255 } else { 0 })
            .collect();
        PixelBuffer::from_raw(self.width, self.height, 1, data)
    }
}

/// One flag per pixel: true for pixels belonging to a selected marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl MarkerMask {
    /// Create an empty mask.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flag pixel `index` as a marker pixel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] for an index outside the mask;
    /// a bad index is never silently dropped.
    pub fn mark(&mut self, index: usize) -> Result<()> {
        let len = self.bits.len();
        let slot = self
            .bits
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = true;
        Ok(())
    }

    #[inline]
    pub fn is_marker(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Number of marker pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Linear indices of all marker pixels, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    /// Render as a 3-channel image: marker pixels are pure green.
    pub fn to_buffer(&self) -> PixelBuffer {
        let data = self
            .bits
            .iter()
            .flat_map(|&b| if b { [0, 255, 0] } else { [0, 0, 0] })
            .collect();
        PixelBuffer::from_raw(self.width, self.height, 3, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_map_counts() {
        let mut map = LabelMap::new(3, 2).unwrap();
        map.set_label(0, 1).unwrap();
        map.set_label(1, 1).unwrap();
        map.set_label(5, 2).unwrap();
        assert_eq!(map.max_label(), 2);
        assert_eq!(map.unlabeled_count(), 3);
        assert_eq!(map.label_sizes(), vec![3, 2, 1]);
        assert_eq!(map.get(2, 1), Some(2));
        assert!(map.set_label(6, 1).is_err());
    }

    #[test]
    fn test_contour_mask() {
        let mut map = LabelMap::new(2, 1).unwrap();
        map.set_label(1, 4).unwrap();
        assert_eq!(map.contour_mask().data(), &[255, 0]);
    }

    #[test]
    fn test_marker_mask() {
        let mut mask = MarkerMask::new(2, 2).unwrap();
        mask.mark(3).unwrap();
        mask.mark(0).unwrap();
        assert!(mask.mark(4).is_err());
        assert_eq!(mask.indices(), vec![0, 3]);
        assert_eq!(mask.count(), 2);
        let img = mask.to_buffer();
        assert_eq!(img.get_rgb(1, 1), Some((0, 255, 0)));
        assert_eq!(img.get_rgb(1, 0), Some((0, 0, 0)));
    }
}
