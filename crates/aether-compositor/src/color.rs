//! Linear HDR color target stored as row-major RGBA floats.

use std::path::Path;

use crate::error::CompositorError;

/// A 2D color target. Row 0 is the top of the image.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl ColorBuffer {
    /// Create a transparent black buffer with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0; 4])
    }

    /// Create a buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[self.index(x, y)]
    }

    /// Set a single pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set(&mut self, x: u32, y: u32, color: [f32; 4]) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }

    /// Copy every pixel of `other` into this buffer (a blit between targets of
    /// identical size).
    pub fn copy_from(&mut self, other: &ColorBuffer) -> Result<(), CompositorError> {
        if self.dimensions() != other.dimensions() {
            return Err(CompositorError::SizeMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }

    /// Reshape to new dimensions, reusing the allocation. Contents are cleared.
    pub(crate) fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, [0.0; 4]);
    }

    pub(crate) fn into_storage(self) -> Vec<[f32; 4]> {
        self.pixels
    }

    pub(crate) fn from_storage(storage: Vec<[f32; 4]>) -> Self {
        let mut buffer = Self {
            width: 0,
            height: 0,
            pixels: storage,
        };
        buffer.reset(0, 0);
        buffer
    }

    /// Quantize to 8-bit RGBA with an exponential exposure curve
    /// `1 - exp(-c * exposure)` on the color channels. Alpha is clamped.
    pub fn to_rgba8(&self, exposure: f32) -> Vec<u8> {
        let tonemap = |c: f32| {
            let mapped = 1.0 - (-c.max(0.0) * exposure).exp();
            (mapped.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                [
                    tonemap(r),
                    tonemap(g),
                    tonemap(b),
                    (a.clamp(0.0, 1.0) * 255.0).round() as u8,
                ]
            })
            .collect()
    }

    /// Write the buffer as a PNG after tonemapping with `exposure`.
    pub fn save_png(&self, path: &Path, exposure: f32) -> Result<(), CompositorError> {
        let bytes = self.to_rgba8(exposure);
        let image = image::RgbaImage::from_raw(self.width, self.height, bytes).ok_or(
            CompositorError::InvalidBuffer {
                width: self.width,
                height: self.height,
            },
        )?;
        image.save(path)?;
        tracing::info!(path = %path.display(), width = self.width, height = self.height, "wrote color buffer");
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_buffer_correct_dimensions() {
        let buffer = ColorBuffer::new(256, 128);
        assert_eq!(buffer.dimensions(), (256, 128));
        assert_eq!(buffer.pixels().len(), 256 * 128);
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut buffer = ColorBuffer::new(4, 4);
        buffer.set(3, 2, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(buffer.get(3, 2), [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(buffer.get(2, 3), [0.0; 4]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        let buffer = ColorBuffer::new(4, 4);
        buffer.get(4, 0);
    }

    #[test]
    fn test_copy_from_requires_matching_size() {
        let mut a = ColorBuffer::new(2, 2);
        let b = ColorBuffer::filled(2, 2, [1.0; 4]);
        a.copy_from(&b).unwrap();
        assert_eq!(a, b);

        let c = ColorBuffer::new(3, 2);
        assert!(matches!(
            a.copy_from(&c),
            Err(CompositorError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_rgba8_tonemaps() {
        let buffer = ColorBuffer::filled(1, 1, [0.0, 1000.0, -1.0, 0.5]);
        assert_eq!(buffer.to_rgba8(1.0), vec![0, 255, 0, 128]);
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        ColorBuffer::filled(8, 4, [0.1, 0.2, 0.3, 1.0])
            .save_png(&path, 1.0)
            .unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn test_reset_reuses_storage() {
        let mut buffer = ColorBuffer::filled(4, 4, [1.0; 4]);
        buffer.reset(2, 3);
        assert_eq!(buffer.dimensions(), (2, 3));
        assert!(buffer.pixels().iter().all(|p| *p == [0.0; 4]));
    }
}
