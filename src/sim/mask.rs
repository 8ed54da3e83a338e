//! Pixel-precise collision masks
//!
//! A mask is the opaque silhouette of an entity's current animation frame.
//! Two entities collide only if at least one opaque pixel overlaps, which is
//! stricter than a bounding-box test.

use serde::{Deserialize, Serialize};

/// Alpha values above this count as solid
pub const ALPHA_THRESHOLD: u8 = 127;

/// Row-major bitset silhouette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: u32,
    height: u32,
    /// u64 words per row
    stride: usize,
    bits: Vec<u64>,
    /// Every pixel set (enables the bounding-box fast path)
    full: bool,
}

impl Mask {
    /// Mask with no solid pixels
    pub fn empty(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height as usize],
            full: width == 0 || height == 0,
        }
    }

    /// Fully solid mask (terrain blocks, placeholder silhouettes)
    pub fn full(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// Fully solid mask covering a rect footprint
    pub fn solid_for(size: glam::Vec2) -> Self {
        Self::full(size.x.round().max(0.0) as u32, size.y.round().max(0.0) as u32)
    }

    /// Build a mask from a per-pixel predicate
    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::empty(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask.full = mask.count() == (width as usize) * (height as usize);
        mask
    }

    /// Build a mask from row-major alpha bytes (one byte per pixel)
    ///
    /// Missing bytes are treated as transparent.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Self {
        Self::from_fn(width, height, |x, y| {
            let idx = (y * width + x) as usize;
            alpha.get(idx).is_some_and(|&a| a > ALPHA_THRESHOLD)
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
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Read one pixel (out of bounds is transparent)
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        let word = self.bits[y * self.stride + x / 64];
        word & (1u64 << (x % 64)) != 0
    }

    fn set(&mut self, x: u32, y: u32, value: bool) {
        let (x, y) = (x as usize, y as usize);
        let word = &mut self.bits[y * self.stride + x / 64];
        let bit = 1u64 << (x % 64);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Test whether `other`, placed at `offset` relative to this mask's
    /// origin, shares any solid pixel with this mask
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i32).min(dx + other.width as i32);
        let y1 = (self.height as i32).min(dy + other.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }
        if self.full && other.full {
            return true;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - dx, y - dy) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_masks_overlap_when_intersecting() {
        let a = Mask::full(10, 10);
        let b = Mask::full(10, 10);
        assert!(a.overlap(&b, (9, 9)));
        assert!(!a.overlap(&b, (10, 0)));
        assert!(!a.overlap(&b, (0, -10)));
    }

    #[test]
    fn test_transparent_pixels_do_not_collide() {
        // Only the left column is solid
        let a = Mask::from_fn(10, 10, |x, _| x == 0);
        let b = Mask::full(4, 4);
        assert!(!a.is_full());
        assert!(!a.overlap(&b, (2, 2)));
        assert!(a.overlap(&b, (-3, 2)));
    }

    #[test]
    fn test_wide_masks_span_words() {
        let a = Mask::from_fn(130, 2, |x, _| x == 129);
        assert_eq!(a.count(), 2);
        assert!(a.get(129, 1));
        assert!(!a.get(128, 1));
        let pixel = Mask::full(1, 1);
        assert!(a.overlap(&pixel, (129, 0)));
        assert!(!a.overlap(&pixel, (64, 0)));
    }

    #[test]
    fn test_from_alpha_threshold() {
        let alpha = [0, 127, 128, 255];
        let mask = Mask::from_alpha(2, 2, &alpha);
        assert!(!mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(0, 1));
        assert!(mask.get(1, 1));
    }

    #[test]
    fn test_empty_mask_never_overlaps() {
        let a = Mask::empty(8, 8);
        let b = Mask::full(8, 8);
        assert!(!a.overlap(&b, (0, 0)));
        assert!(!b.overlap(&a, (0, 0)));
    }
}
