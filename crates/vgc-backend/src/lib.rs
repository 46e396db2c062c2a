//! vgc Backend Contract
//!
//! The drawing core talks to an OpenVG-class rasterizer through the
//! [`Backend`] trait: paint object management, current-path
//! construction, draw calls, surface readback, and the off-surface
//! blur pass used for shadows. A hardware implementation wraps the
//! native API; [`HeadlessBackend`] records everything in memory and is
//! used for tests and CI rendering.

mod headless;

pub use headless::{DrawCall, HeadlessBackend, PaintRecord, PathCmd};

/// Handle to a native paint object owned by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaintHandle(pub(crate) u32);

/// Which pipeline a paint binding or draw call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Fill,
    Stroke,
}

/// Paint variants understood by the rasterizer. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintType {
    Color,
    LinearGradient,
    RadialGradient,
}

/// Vector-valued paint parameters.
///
/// `Color` carries 4 values, `LinearGradient` 4 (x1, y1, x2, y2),
/// `RadialGradient` 5 (cx, cy, fx, fy, r), and `ColorRampStops` a
/// multiple of 5 (position, r, g, b, a per stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintValues {
    Color,
    LinearGradient,
    RadialGradient,
    ColorRampStops,
}

/// Gradient behaviour outside the [0, 1] ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    #[default]
    Pad,
    Repeat,
    Reflect,
}

/// Pixel layouts understood by [`Backend::read_pixels`].
///
/// Both are 4 bytes per pixel. `Rgbx8888` delivers the little-endian
/// byte view of an sRGBX_8888 word, `[x, b, g, r]`; `Abgr8888`
/// delivers `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFormat {
    Rgbx8888,
    Abgr8888,
}

/// Rasterizer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("rasterizer is out of paint handles")]
    PaintAllocation,

    #[error("pixel readback rejected: {0}")]
    ReadPixels(String),

    #[error("failed to allocate blur pass surface")]
    BlurSurface,
}

/// Contract between the drawing core and the rasterizer.
///
/// All methods must be called from the owning surface's rendering
/// thread; implementations perform no internal locking.
pub trait Backend {
    // Paint objects

    fn create_paint(&mut self) -> Result<PaintHandle, BackendError>;
    fn destroy_paint(&mut self, handle: PaintHandle);
    fn set_paint_type(&mut self, handle: PaintHandle, paint_type: PaintType);
    fn set_paint_values(&mut self, handle: PaintHandle, which: PaintValues, values: &[f32]);
    fn set_ramp_spread(&mut self, handle: PaintHandle, spread: SpreadMode);
    fn set_ramp_premultiplied(&mut self, handle: PaintHandle, premultiplied: bool);

    /// Bind a paint as the active paint for the given mode. The
    /// binding lasts until the next `bind_paint` call for that mode.
    fn bind_paint(&mut self, handle: PaintHandle, mode: DrawMode);

    // Current path (winding rule is owned by the path object)

    /// Reset the current path to empty.
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn close_path(&mut self);

    /// Draw the current path with the active paint for `mode`.
    fn draw_current_path(&mut self, mode: DrawMode);

    // Surface

    fn surface_width(&self) -> u32;
    fn surface_height(&self) -> u32;

    /// Read back a rectangle of the rendering surface into `buf`.
    ///
    /// `stride` is the byte distance between destination scanlines.
    /// Scanlines are delivered in the rasterizer's native vertical
    /// orientation; no flip is performed.
    fn read_pixels(
        &mut self,
        buf: &mut [u8],
        stride: usize,
        format: ReadFormat,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError>;

    // Shadow compositing pass

    /// Redirect subsequent draws to an off-surface pass.
    fn blur_pass_begin(&mut self) -> Result<(), BackendError>;

    /// End the off-surface pass and composite it back onto the main
    /// surface, offset by (`offset_x`, `offset_y`) and blurred by
    /// `blur`.
    fn blur_pass_end(&mut self, blur: f32, offset_x: f32, offset_y: f32);
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn create_paint(&mut self) -> Result<PaintHandle, BackendError> {
        (**self).create_paint()
    }

    fn destroy_paint(&mut self, handle: PaintHandle) {
        (**self).destroy_paint(handle)
    }

    fn set_paint_type(&mut self, handle: PaintHandle, paint_type: PaintType) {
        (**self).set_paint_type(handle, paint_type)
    }

    fn set_paint_values(&mut self, handle: PaintHandle, which: PaintValues, values: &[f32]) {
        (**self).set_paint_values(handle, which, values)
    }

    fn set_ramp_spread(&mut self, handle: PaintHandle, spread: SpreadMode) {
        (**self).set_ramp_spread(handle, spread)
    }

    fn set_ramp_premultiplied(&mut self, handle: PaintHandle, premultiplied: bool) {
        (**self).set_ramp_premultiplied(handle, premultiplied)
    }

    fn bind_paint(&mut self, handle: PaintHandle, mode: DrawMode) {
        (**self).bind_paint(handle, mode)
    }

    fn begin_path(&mut self) {
        (**self).begin_path()
    }

    fn move_to(&mut self, x: f32, y: f32) {
        (**self).move_to(x, y)
    }

    fn line_to(&mut self, x: f32, y: f32) {
        (**self).line_to(x, y)
    }

    fn close_path(&mut self) {
        (**self).close_path()
    }

    fn draw_current_path(&mut self, mode: DrawMode) {
        (**self).draw_current_path(mode)
    }

    fn surface_width(&self) -> u32 {
        (**self).surface_width()
    }

    fn surface_height(&self) -> u32 {
        (**self).surface_height()
    }

    fn read_pixels(
        &mut self,
        buf: &mut [u8],
        stride: usize,
        format: ReadFormat,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        (**self).read_pixels(buf, stride, format, x, y, width, height)
    }

    fn blur_pass_begin(&mut self) -> Result<(), BackendError> {
        (**self).blur_pass_begin()
    }

    fn blur_pass_end(&mut self, blur: f32, offset_x: f32, offset_y: f32) {
        (**self).blur_pass_end(blur, offset_x, offset_y)
    }
}
