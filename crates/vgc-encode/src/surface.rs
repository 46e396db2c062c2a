//! In-memory image surface
//!
//! Bitmap staged for encoding: RGBA8, stride = width * 4. Created per
//! encode request from a [`Capture`] and dropped as soon as the
//! encoded bytes exist.

use crate::capture::Capture;

#[derive(Debug)]
pub struct ImageSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageSurface {
    /// Create a zeroed surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Build a surface from a capture by remapping every pixel from
    /// the captured `[x, b, g, r]` channel order into RGBA. Explicit
    /// per-pixel swizzle; the orders differ, so no bulk
    /// reinterpretation is possible. No vertical flip.
    pub fn from_capture(capture: &Capture) -> Self {
        let mut surface = Self::new(capture.width(), capture.height());
        let src = capture.pixels();

        for y in 0..capture.height() {
            for x in 0..capture.width() {
                let i = (y as usize * capture.width() as usize + x as usize) * 4;
                surface.set_pixel(x, y, src[i + 3], src[i + 2], src[i + 1], src[i]);
            }
        }

        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGBA bytes, 4-byte-aligned scanlines.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        if x < self.width && y < self.height {
            let idx = (y as usize * self.width as usize + x as usize) * 4;
            self.data[idx] = r;
            self.data[idx + 1] = g;
            self.data[idx + 2] = b;
            self.data[idx + 3] = a;
        }
    }

    /// Copy of the pixel data with alpha dropped, for codecs that
    /// expect RGB.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for pixel in self.data.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
        }
        rgb
    }
}
