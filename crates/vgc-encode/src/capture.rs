//! Surface pixel capture
//!
//! Synchronous readback from the rendering surface. Capture must run
//! on the surface's rendering thread; the resulting buffer is plain
//! bytes and safe to hand to an encode worker.

use vgc_backend::{Backend, ReadFormat};

use crate::EncodeError;

/// A full-surface snapshot in `Rgbx8888` byte order (`[x, b, g, r]`
/// per pixel, stride = width * 4), in the rasterizer's native vertical
/// orientation.
#[derive(Debug, Clone)]
pub struct Capture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Capture {
    /// Read back the entire rendering surface.
    pub fn from_backend<B: Backend>(backend: &mut B) -> Result<Self, EncodeError> {
        let width = backend.surface_width();
        let height = backend.surface_height();
        let stride = width as usize * 4;

        let mut pixels = vec![0u8; stride * height as usize];
        backend.read_pixels(&mut pixels, stride, ReadFormat::Rgbx8888, 0, 0, width, height)?;

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Read back a rectangle as packed RGBA bytes, with `y` measured from
/// the top of the surface. The rasterizer's origin is bottom-left, so
/// the row offset is flipped before the readback.
pub fn image_data<B: Backend>(
    backend: &mut B,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, EncodeError> {
    let stride = width as usize * 4;
    let mut buf = vec![0u8; stride * height as usize];

    let src_y = backend.surface_height().saturating_sub(y + height);
    backend.read_pixels(&mut buf, stride, ReadFormat::Abgr8888, x, src_y, width, height)?;

    Ok(buf)
}
