use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice;

/// Row-major 2-D pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    /// Iterates rows top to bottom. An empty buffer yields no rows.
    #[inline]
    pub fn rows(&self) -> slice::ChunksExact<'_, T> {
        self.pixels.chunks_exact(self.width.max(1))
    }

    #[inline]
    pub fn rows_mut(&mut self) -> slice::ChunksExactMut<'_, T> {
        self.pixels.chunks_exact_mut(self.width.max(1))
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    /// Whether the `width × height` window at `(x, y)` lies inside the buffer.
    #[inline]
    pub fn contains_window(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        x.checked_add(width).is_some_and(|x1| x1 <= self.width)
            && y.checked_add(height).is_some_and(|y1| y1 <= self.height)
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T: Copy> Buffer2<T> {
    /// Copies the `width × height` window at `(x, y)` into a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if the window extends past the buffer.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Self {
        assert!(
            self.contains_window(x, y, width, height),
            "crop window {}x{} at ({}, {}) exceeds {}x{} buffer",
            width,
            height,
            x,
            y,
            self.width,
            self.height
        );

        let mut pixels = Vec::with_capacity(width * height);
        for row in self.rows().skip(y).take(height) {
            pixels.extend_from_slice(&row[x..x + width]);
        }
        Self::new(width, height, pixels)
    }

    /// Writes `src` into this buffer with its top-left pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `src` does not fit at that position.
    pub fn blit(&mut self, src: &Self, x: usize, y: usize) {
        assert!(
            self.contains_window(x, y, src.width, src.height),
            "blit of {}x{} at ({}, {}) exceeds {}x{} buffer",
            src.width,
            src.height,
            x,
            y,
            self.width,
            self.height
        );

        let width = src.width;
        for (dst_row, src_row) in self.rows_mut().skip(y).zip(src.rows()) {
            dst_row[x..x + width].copy_from_slice(src_row);
        }
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl<T> DerefMut for Buffer2<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}

impl<'a, T> IntoIterator for &'a Buffer2<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf.size(), (3, 2));
        assert_eq!(buf.len(), 6);
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_2d() {
        // row 0 = [10, 20, 30], row 1 = [40, 50, 60]
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(*buf.get(2, 0), 30);
        assert_eq!(*buf.get(0, 1), 40);
        assert_eq!(buf[(2, 1)], 60);
    }

    #[test]
    fn test_rows() {
        let buf = Buffer2::new(2, 3, vec![1, 2, 3, 4, 5, 6]);
        let rows: Vec<&[i32]> = buf.rows().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[5, 6][..]]);
        assert_eq!(buf.row(1), &[3, 4]);
    }

    #[test]
    fn test_rows_of_empty_buffer() {
        let buf: Buffer2<f32> = Buffer2::new_default(0, 0);
        assert_eq!(buf.rows().count(), 0);
    }

    #[test]
    fn test_crop_interior_window() {
        // 4x3:
        //  0  1  2  3
        //  4  5  6  7
        //  8  9 10 11
        let buf = Buffer2::new(4, 3, (0..12).collect());
        let sub = buf.crop(1, 1, 2, 2);
        assert_eq!(sub.size(), (2, 2));
        assert_eq!(sub.pixels(), &[5, 6, 9, 10]);
    }

    #[test]
    #[should_panic(expected = "exceeds 4x3 buffer")]
    fn test_crop_past_edge_panics() {
        let buf = Buffer2::new(4, 3, (0..12).collect());
        buf.crop(3, 0, 2, 1);
    }

    #[test]
    fn test_blit_writes_only_target_window() {
        let mut dst = Buffer2::new_filled(4, 3, 0);
        let src = Buffer2::new(2, 2, vec![1, 2, 3, 4]);
        dst.blit(&src, 2, 1);
        assert_eq!(dst.pixels(), &[0, 0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4]);
    }

    #[test]
    fn test_blit_then_crop_returns_source() {
        let mut dst = Buffer2::new_filled(5, 5, 0.0f32);
        let src = Buffer2::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        dst.blit(&src, 1, 3);
        assert_eq!(dst.crop(1, 3, 3, 2), src);
    }

    #[test]
    #[should_panic(expected = "exceeds 2x2 buffer")]
    fn test_blit_overflow_panics() {
        let mut dst = Buffer2::new_filled(2, 2, 0);
        let src = Buffer2::new_filled(2, 2, 1);
        dst.blit(&src, 1, 0);
    }

    #[test]
    fn test_contains_window_rejects_overflowing_offsets() {
        let buf = Buffer2::new_filled(4, 4, 0u8);
        assert!(buf.contains_window(0, 0, 4, 4));
        assert!(!buf.contains_window(usize::MAX, 0, 1, 1));
        assert!(!buf.contains_window(0, 3, 1, 2));
    }
}
