//! Headless recording backend
//!
//! In-memory [`Backend`] implementation. Records every uploaded paint
//! parameter, the bound paints, the current path command stream, and
//! all draw calls, and owns a plain RGBA framebuffer whose pixels can
//! be seeded directly. Serves as the test double for the drawing core
//! and as a CI rendering target.

use std::collections::HashMap;

use crate::{
    Backend, BackendError, DrawMode, PaintHandle, PaintType, PaintValues, ReadFormat, SpreadMode,
};

/// Recorded state of one native paint object.
#[derive(Debug, Clone, Default)]
pub struct PaintRecord {
    pub paint_type: Option<PaintType>,
    /// Last uploaded RGBA 4-tuple.
    pub color: Vec<f32>,
    pub linear_gradient: Vec<f32>,
    pub radial_gradient: Vec<f32>,
    /// Last uploaded color ramp, 5 values per stop.
    pub ramp_stops: Vec<f32>,
    pub ramp_spread: Option<SpreadMode>,
    pub ramp_premultiplied: Option<bool>,
}

/// One path construction command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    Close,
}

/// One recorded draw call.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub mode: DrawMode,
    /// Paint bound for `mode` at draw time.
    pub paint: Option<PaintHandle>,
    /// Snapshot of the current path at draw time.
    pub path: Vec<PathCmd>,
    /// Whether the draw happened inside a blur pass.
    pub in_blur_pass: bool,
}

/// In-memory rasterizer.
#[derive(Debug)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    /// RGBA8, stride = width * 4.
    framebuffer: Vec<u8>,
    paints: HashMap<u32, PaintRecord>,
    next_paint: u32,
    destroyed: Vec<PaintHandle>,
    bound: [Option<PaintHandle>; 2],
    path: Vec<PathCmd>,
    draws: Vec<DrawCall>,
    in_blur_pass: bool,
    blur_composites: Vec<(f32, f32, f32)>,
    fail_blur_pass: bool,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            framebuffer: vec![0u8; width as usize * height as usize * 4],
            paints: HashMap::new(),
            next_paint: 1,
            destroyed: Vec::new(),
            bound: [None, None],
            path: Vec::new(),
            draws: Vec::new(),
            in_blur_pass: false,
            blur_composites: Vec::new(),
            fail_blur_pass: false,
        }
    }

    /// Recorded state for a live paint object.
    pub fn paint_record(&self, handle: PaintHandle) -> Option<&PaintRecord> {
        self.paints.get(&handle.0)
    }

    /// Number of paint objects currently alive.
    pub fn live_paints(&self) -> usize {
        self.paints.len()
    }

    /// Every handle whose `destroy_paint` was called, in order.
    pub fn destroyed_paints(&self) -> &[PaintHandle] {
        &self.destroyed
    }

    pub fn bound_paint(&self, mode: DrawMode) -> Option<PaintHandle> {
        self.bound[mode_index(mode)]
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Blur composites performed so far, as (blur, offset_x, offset_y).
    pub fn blur_composites(&self) -> &[(f32, f32, f32)] {
        &self.blur_composites
    }

    /// Make the next `blur_pass_begin` fail, simulating blur surface
    /// allocation failure.
    pub fn set_blur_pass_failure(&mut self, fail: bool) {
        self.fail_blur_pass = fail;
    }

    /// Seed a framebuffer pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        if x < self.width && y < self.height {
            let idx = (y as usize * self.width as usize + x as usize) * 4;
            self.framebuffer[idx] = r;
            self.framebuffer[idx + 1] = g;
            self.framebuffer[idx + 2] = b;
            self.framebuffer[idx + 3] = a;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some((
            self.framebuffer[idx],
            self.framebuffer[idx + 1],
            self.framebuffer[idx + 2],
            self.framebuffer[idx + 3],
        ))
    }
}

fn mode_index(mode: DrawMode) -> usize {
    match mode {
        DrawMode::Fill => 0,
        DrawMode::Stroke => 1,
    }
}

impl Backend for HeadlessBackend {
    fn create_paint(&mut self) -> Result<PaintHandle, BackendError> {
        let handle = PaintHandle(self.next_paint);
        self.next_paint = self
            .next_paint
            .checked_add(1)
            .ok_or(BackendError::PaintAllocation)?;
        self.paints.insert(handle.0, PaintRecord::default());
        Ok(handle)
    }

    fn destroy_paint(&mut self, handle: PaintHandle) {
        self.paints.remove(&handle.0);
        self.destroyed.push(handle);
        for bound in &mut self.bound {
            if *bound == Some(handle) {
                *bound = None;
            }
        }
    }

    fn set_paint_type(&mut self, handle: PaintHandle, paint_type: PaintType) {
        if let Some(record) = self.paints.get_mut(&handle.0) {
            record.paint_type = Some(paint_type);
        }
    }

    fn set_paint_values(&mut self, handle: PaintHandle, which: PaintValues, values: &[f32]) {
        if let Some(record) = self.paints.get_mut(&handle.0) {
            let slot = match which {
                PaintValues::Color => &mut record.color,
                PaintValues::LinearGradient => &mut record.linear_gradient,
                PaintValues::RadialGradient => &mut record.radial_gradient,
                PaintValues::ColorRampStops => &mut record.ramp_stops,
            };
            slot.clear();
            slot.extend_from_slice(values);
        }
    }

    fn set_ramp_spread(&mut self, handle: PaintHandle, spread: SpreadMode) {
        if let Some(record) = self.paints.get_mut(&handle.0) {
            record.ramp_spread = Some(spread);
        }
    }

    fn set_ramp_premultiplied(&mut self, handle: PaintHandle, premultiplied: bool) {
        if let Some(record) = self.paints.get_mut(&handle.0) {
            record.ramp_premultiplied = Some(premultiplied);
        }
    }

    fn bind_paint(&mut self, handle: PaintHandle, mode: DrawMode) {
        self.bound[mode_index(mode)] = Some(handle);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(PathCmd::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.push(PathCmd::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.path.push(PathCmd::Close);
    }

    fn draw_current_path(&mut self, mode: DrawMode) {
        self.draws.push(DrawCall {
            mode,
            paint: self.bound[mode_index(mode)],
            path: self.path.clone(),
            in_blur_pass: self.in_blur_pass,
        });
    }

    fn surface_width(&self) -> u32 {
        self.width
    }

    fn surface_height(&self) -> u32 {
        self.height
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
        if x + width > self.width || y + height > self.height {
            return Err(BackendError::ReadPixels(format!(
                "rect ({}, {}) {}x{} exceeds surface {}x{}",
                x, y, width, height, self.width, self.height
            )));
        }
        let needed = (height as usize - 1) * stride + width as usize * 4;
        if height > 0 && buf.len() < needed {
            return Err(BackendError::ReadPixels(format!(
                "buffer of {} bytes too small, need {}",
                buf.len(),
                needed
            )));
        }

        for row in 0..height as usize {
            for col in 0..width as usize {
                let src = ((y as usize + row) * self.width as usize + x as usize + col) * 4;
                let dst = row * stride + col * 4;
                let (r, g, b, a) = (
                    self.framebuffer[src],
                    self.framebuffer[src + 1],
                    self.framebuffer[src + 2],
                    self.framebuffer[src + 3],
                );
                match format {
                    ReadFormat::Rgbx8888 => {
                        buf[dst] = a;
                        buf[dst + 1] = b;
                        buf[dst + 2] = g;
                        buf[dst + 3] = r;
                    }
                    ReadFormat::Abgr8888 => {
                        buf[dst] = r;
                        buf[dst + 1] = g;
                        buf[dst + 2] = b;
                        buf[dst + 3] = a;
                    }
                }
            }
        }
        Ok(())
    }

    fn blur_pass_begin(&mut self) -> Result<(), BackendError> {
        if self.fail_blur_pass {
            return Err(BackendError::BlurSurface);
        }
        self.in_blur_pass = true;
        Ok(())
    }

    fn blur_pass_end(&mut self, blur: f32, offset_x: f32, offset_y: f32) {
        self.in_blur_pass = false;
        self.blur_composites.push((blur, offset_x, offset_y));
    }
}
