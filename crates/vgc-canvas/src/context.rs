//! Canvas rendering context
//!
//! The render state and the fill/stroke renderer. One context per
//! rendering surface; every call must come from the surface's
//! rendering thread, the context performs no locking of its own.

use vgc_backend::{Backend, DrawMode};

use crate::CanvasError;
use crate::paint::{Paint, PaintId, PaintStore};
use crate::style::{self, StyleSlot};

/// Shadow parameters. Shadows apply to `fill()` only; `stroke()`
/// intentionally skips the shadow pass.
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    pub enabled: bool,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Canvas 2D rendering context over a rasterizer backend.
///
/// Owns the backend, every paint created through it, the active
/// fill/stroke styles, global alpha, and the shadow state.
pub struct Canvas2d<B: Backend> {
    backend: B,
    paints: PaintStore,
    fill: StyleSlot,
    stroke: StyleSlot,
    shadow_paint: PaintId,
    shadow: Shadow,
    global_alpha: f32,
}

impl<B: Backend> Canvas2d<B> {
    /// Create a context with opaque black fill and stroke styles and a
    /// disabled, transparent-black shadow.
    pub fn new(mut backend: B) -> Result<Self, CanvasError> {
        let mut paints = PaintStore::default();
        let fill = paints.insert(Paint::color(&mut backend, 0.0, 0.0, 0.0, 1.0)?);
        let stroke = paints.insert(Paint::color(&mut backend, 0.0, 0.0, 0.0, 1.0)?);
        let shadow_paint = paints.insert(Paint::color(&mut backend, 0.0, 0.0, 0.0, 0.0)?);

        tracing::debug!(
            "canvas context created: {}x{}",
            backend.surface_width(),
            backend.surface_height()
        );

        Ok(Self {
            backend,
            paints,
            fill: StyleSlot::owned(fill),
            stroke: StyleSlot::owned(stroke),
            shadow_paint,
            shadow: Shadow {
                enabled: false,
                blur: 0.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            global_alpha: 1.0,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn width(&self) -> u32 {
        self.backend.surface_width()
    }

    pub fn height(&self) -> u32 {
        self.backend.surface_height()
    }

    // Paint creation. Gradients created here are caller-owned: the
    // caller is responsible for `destroy_paint`, even while a style
    // slot references them.

    pub fn create_linear_gradient(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) -> Result<PaintId, CanvasError> {
        let paint = Paint::linear_gradient(&mut self.backend, x1, y1, x2, y2)?;
        Ok(self.paints.insert(paint))
    }

    pub fn create_radial_gradient(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        fx: f32,
        fy: f32,
    ) -> Result<PaintId, CanvasError> {
        let paint = Paint::radial_gradient(&mut self.backend, cx, cy, r, fx, fy)?;
        Ok(self.paints.insert(paint))
    }

    /// Append a color stop to a gradient paint.
    pub fn add_color_stop(
        &mut self,
        id: PaintId,
        position: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Result<(), CanvasError> {
        let paint = self.paints.get_mut(id).ok_or(CanvasError::UnknownPaint)?;
        paint.add_color_stop(position, r, g, b, a);
        Ok(())
    }

    pub fn paint(&self, id: PaintId) -> Option<&Paint> {
        self.paints.get(id)
    }

    /// Destroy a caller-owned paint, releasing its native handle.
    /// Destroying an already destroyed paint is a guarded no-op.
    pub fn destroy_paint(&mut self, id: PaintId) {
        match self.paints.remove(id) {
            Some(mut paint) => paint.destroy(&mut self.backend),
            None => tracing::warn!("destroy_paint called with unknown paint id"),
        }
    }

    // Style binding

    pub fn set_fill_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<(), CanvasError> {
        style::set_color(&mut self.fill, &mut self.paints, &mut self.backend, r, g, b, a)?;
        Ok(())
    }

    pub fn set_stroke_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<(), CanvasError> {
        style::set_color(&mut self.stroke, &mut self.paints, &mut self.backend, r, g, b, a)?;
        Ok(())
    }

    /// Bind an externally owned paint as the fill style. The context
    /// stores a non-owning reference; disposal stays with the caller.
    pub fn set_fill_paint(&mut self, id: PaintId) -> Result<(), CanvasError> {
        if self.paints.get(id).is_none() {
            return Err(CanvasError::UnknownPaint);
        }
        style::set_paint(&mut self.fill, &mut self.paints, &mut self.backend, id);
        Ok(())
    }

    /// Bind an externally owned paint as the stroke style.
    pub fn set_stroke_paint(&mut self, id: PaintId) -> Result<(), CanvasError> {
        if self.paints.get(id).is_none() {
            return Err(CanvasError::UnknownPaint);
        }
        style::set_paint(&mut self.stroke, &mut self.paints, &mut self.backend, id);
        Ok(())
    }

    pub fn fill_style(&self) -> PaintId {
        self.fill.paint
    }

    pub fn stroke_style(&self) -> PaintId {
        self.stroke.paint
    }

    // Global alpha

    /// Set the global alpha, clamped to [0, 1]. Applied to every
    /// paint's alpha channel(s) at activation time; stored paint data
    /// is never modified.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    // Shadow state

    /// Set the shadow color. The shadow is enabled while the color has
    /// a non-zero alpha.
    pub fn set_shadow_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if let Some(paint) = self.paints.get_mut(self.shadow_paint) {
            paint.set_rgba(r, g, b, a);
        }
        self.shadow.enabled = a > 0.0;
    }

    pub fn set_shadow_blur(&mut self, blur: f32) {
        self.shadow.blur = blur;
    }

    pub fn set_shadow_offset_x(&mut self, offset_x: f32) {
        self.shadow.offset_x = offset_x;
    }

    pub fn set_shadow_offset_y(&mut self, offset_y: f32) {
        self.shadow.offset_y = offset_y;
    }

    pub fn shadow(&self) -> Shadow {
        self.shadow
    }

    // Path passthrough. Rectangle synthesis in fill_rect/stroke_rect
    // goes through these as well.

    pub fn begin_path(&mut self) {
        self.backend.begin_path();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.backend.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.backend.line_to(x, y);
    }

    pub fn close_path(&mut self) {
        self.backend.close_path();
    }

    // Renderer

    /// Fill the current path with the current fill style, using the
    /// winding rule configured on the path. When the shadow is enabled
    /// the path is first drawn into an off-surface pass with the
    /// shadow paint, then composited back offset and blurred.
    pub fn fill(&mut self) -> Result<(), CanvasError> {
        if self.shadow.enabled {
            self.backend.blur_pass_begin()?;
            self.activate(self.shadow_paint, DrawMode::Fill)?;
            self.backend.draw_current_path(DrawMode::Fill);
            self.backend
                .blur_pass_end(self.shadow.blur, self.shadow.offset_x, self.shadow.offset_y);
        }

        self.activate(self.fill.paint, DrawMode::Fill)?;
        self.backend.draw_current_path(DrawMode::Fill);
        Ok(())
    }

    /// Stroke the current path with the current stroke style. No
    /// shadow pass.
    pub fn stroke(&mut self) -> Result<(), CanvasError> {
        self.activate(self.stroke.paint, DrawMode::Stroke)?;
        self.backend.draw_current_path(DrawMode::Stroke);
        Ok(())
    }

    /// Fill an axis-aligned rectangle with the current fill style.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), CanvasError> {
        self.activate(self.fill.paint, DrawMode::Fill)?;
        self.rect_path(x, y, width, height);
        self.backend.draw_current_path(DrawMode::Fill);
        Ok(())
    }

    /// Stroke an axis-aligned rectangle with the current stroke style.
    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), CanvasError> {
        self.activate(self.stroke.paint, DrawMode::Stroke)?;
        self.rect_path(x, y, width, height);
        self.backend.draw_current_path(DrawMode::Stroke);
        Ok(())
    }

    /// Replace the current path with a closed 4-vertex rectangle.
    fn rect_path(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.backend.begin_path();
        self.backend.move_to(x, y);
        self.backend.line_to(x + width, y);
        self.backend.line_to(x + width, y + height);
        self.backend.line_to(x, y + height);
        self.backend.close_path();
    }

    fn activate(&mut self, id: PaintId, mode: DrawMode) -> Result<(), CanvasError> {
        let paint = self.paints.get(id).ok_or(CanvasError::UnknownPaint)?;
        paint.activate(&mut self.backend, mode, self.global_alpha);
        Ok(())
    }
}

impl<B: Backend> Drop for Canvas2d<B> {
    /// Release every native paint handle still owned by the store,
    /// including the default style paints and the shadow paint.
    fn drop(&mut self) {
        let paints = std::mem::take(&mut self.paints);
        for mut paint in paints.into_paints() {
            paint.destroy(&mut self.backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgc_backend::{HeadlessBackend, PathCmd};

    fn canvas() -> Canvas2d<HeadlessBackend> {
        Canvas2d::new(HeadlessBackend::new(64, 64)).unwrap()
    }

    #[test]
    fn test_fill_uploads_alpha_scaled_color() {
        let mut canvas = canvas();
        canvas.set_fill_color(1.0, 0.0, 0.0, 1.0).unwrap();
        canvas.set_global_alpha(0.5);
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 0.0);
        canvas.close_path();
        canvas.fill().unwrap();

        let backend = canvas.backend();
        let handle = backend.bound_paint(DrawMode::Fill).unwrap();
        assert_eq!(
            backend.paint_record(handle).unwrap().color,
            vec![1.0, 0.0, 0.0, 0.5]
        );
        // stored style data keeps its full alpha
        let paint = canvas.paint(canvas.fill_style()).unwrap();
        assert_eq!(paint.stop_data(), &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_gradient_fill_uploads_pad_spread_and_scaled_stops() {
        let mut canvas = canvas();
        let gradient = canvas.create_linear_gradient(0.0, 0.0, 64.0, 0.0).unwrap();
        canvas.add_color_stop(gradient, 0.0, 1.0, 0.0, 0.0, 1.0).unwrap();
        canvas.add_color_stop(gradient, 1.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        canvas.set_fill_paint(gradient).unwrap();
        canvas.set_global_alpha(0.25);
        canvas.fill().unwrap();

        let backend = canvas.backend();
        let handle = backend.bound_paint(DrawMode::Fill).unwrap();
        let record = backend.paint_record(handle).unwrap();
        assert_eq!(
            record.ramp_stops,
            vec![0.0, 1.0, 0.0, 0.0, 0.25, 1.0, 0.0, 0.0, 1.0, 0.25]
        );
        assert_eq!(record.ramp_premultiplied, Some(false));
    }

    #[test]
    fn test_set_fill_color_reuses_native_handle() {
        let mut canvas = canvas();
        canvas.set_fill_color(1.0, 0.0, 0.0, 1.0).unwrap();
        let before = canvas.paint(canvas.fill_style()).unwrap().stop_data().to_vec();
        assert_eq!(before, vec![1.0, 0.0, 0.0, 1.0]);

        let id_before = canvas.fill_style();
        canvas.set_fill_color(0.0, 1.0, 0.0, 1.0).unwrap();
        assert_eq!(canvas.fill_style(), id_before);
        assert!(canvas.backend().destroyed_paints().is_empty());
    }

    #[test]
    fn test_external_gradient_replaces_owned_default() {
        let mut canvas = canvas();
        let default_paint = canvas.paint(canvas.fill_style()).unwrap();
        let default_handle = default_paint.handle().unwrap();

        let gradient = canvas.create_linear_gradient(0.0, 0.0, 64.0, 0.0).unwrap();
        canvas.set_fill_paint(gradient).unwrap();

        // the owned default color paint was released, the gradient was not
        assert_eq!(canvas.backend().destroyed_paints(), &[default_handle]);
        assert_eq!(canvas.fill_style(), gradient);
    }

    #[test]
    fn test_color_after_gradient_leaves_gradient_alive() {
        let mut canvas = canvas();
        let gradient = canvas.create_linear_gradient(0.0, 0.0, 64.0, 0.0).unwrap();
        canvas.add_color_stop(gradient, 0.0, 1.0, 1.0, 1.0, 1.0).unwrap();
        canvas.set_fill_paint(gradient).unwrap();

        canvas.set_fill_color(0.0, 0.0, 1.0, 1.0).unwrap();

        // a fresh color paint was installed, the gradient stays usable
        assert_ne!(canvas.fill_style(), gradient);
        let gradient_paint = canvas.paint(gradient).unwrap();
        assert!(!gradient_paint.is_destroyed());
        assert_eq!(gradient_paint.stop_data(), &[0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_fill_rect_matches_manual_path() {
        let mut canvas = canvas();
        canvas.fill_rect(10.0, 20.0, 30.0, 40.0).unwrap();

        canvas.begin_path();
        canvas.move_to(10.0, 20.0);
        canvas.line_to(40.0, 20.0);
        canvas.line_to(40.0, 60.0);
        canvas.line_to(10.0, 60.0);
        canvas.close_path();
        canvas.fill().unwrap();

        let draws = canvas.backend().draw_calls();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].path, draws[1].path);
        assert_eq!(draws[0].mode, DrawMode::Fill);
        assert_eq!(
            draws[0].path,
            vec![
                PathCmd::MoveTo(10.0, 20.0),
                PathCmd::LineTo(40.0, 20.0),
                PathCmd::LineTo(40.0, 60.0),
                PathCmd::LineTo(10.0, 60.0),
                PathCmd::Close,
            ]
        );
    }

    #[test]
    fn test_stroke_rect_matches_manual_path() {
        let mut canvas = canvas();
        canvas.stroke_rect(1.0, 2.0, 3.0, 4.0).unwrap();

        canvas.begin_path();
        canvas.move_to(1.0, 2.0);
        canvas.line_to(4.0, 2.0);
        canvas.line_to(4.0, 6.0);
        canvas.line_to(1.0, 6.0);
        canvas.close_path();
        canvas.stroke().unwrap();

        let draws = canvas.backend().draw_calls();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].path, draws[1].path);
        assert_eq!(draws[0].mode, DrawMode::Stroke);
    }

    #[test]
    fn test_fill_with_shadow_draws_blur_pass_first() {
        let mut canvas = canvas();
        canvas.set_shadow_color(0.0, 0.0, 0.0, 0.5);
        canvas.set_shadow_blur(4.0);
        canvas.set_shadow_offset_x(2.0);
        canvas.set_shadow_offset_y(3.0);
        canvas.set_fill_color(1.0, 0.0, 0.0, 1.0).unwrap();
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 10.0);
        canvas.close_path();
        canvas.fill().unwrap();

        let backend = canvas.backend();
        let draws = backend.draw_calls();
        assert_eq!(draws.len(), 2);
        assert!(draws[0].in_blur_pass);
        assert!(!draws[1].in_blur_pass);
        assert_ne!(draws[0].paint, draws[1].paint);
        assert_eq!(backend.blur_composites(), &[(4.0, 2.0, 3.0)]);
        // shadow alpha is also scaled by global alpha at activation
        let shadow_handle = draws[0].paint.unwrap();
        assert_eq!(
            backend.paint_record(shadow_handle).unwrap().color,
            vec![0.0, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_stroke_skips_shadow_pass() {
        let mut canvas = canvas();
        canvas.set_shadow_color(0.0, 0.0, 0.0, 1.0);
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 10.0);
        canvas.stroke().unwrap();

        let backend = canvas.backend();
        assert_eq!(backend.draw_calls().len(), 1);
        assert!(!backend.draw_calls()[0].in_blur_pass);
        assert!(backend.blur_composites().is_empty());
    }

    #[test]
    fn test_transparent_shadow_color_disables_shadow() {
        let mut canvas = canvas();
        canvas.set_shadow_color(1.0, 0.0, 0.0, 1.0);
        assert!(canvas.shadow().enabled);
        canvas.set_shadow_color(1.0, 0.0, 0.0, 0.0);
        assert!(!canvas.shadow().enabled);
    }

    #[test]
    fn test_blur_surface_failure_is_recoverable() {
        let mut canvas = canvas();
        canvas.set_shadow_color(0.0, 0.0, 0.0, 1.0);
        canvas.backend_mut().set_blur_pass_failure(true);

        let result = canvas.fill();
        assert!(matches!(
            result,
            Err(CanvasError::Backend(vgc_backend::BackendError::BlurSurface))
        ));
        // nothing was drawn
        assert!(canvas.backend().draw_calls().is_empty());
    }

    #[test]
    fn test_global_alpha_is_clamped() {
        let mut canvas = canvas();
        canvas.set_global_alpha(1.5);
        assert_eq!(canvas.global_alpha(), 1.0);
        canvas.set_global_alpha(-0.5);
        assert_eq!(canvas.global_alpha(), 0.0);
    }

    #[test]
    fn test_destroy_paint_twice_is_guarded() {
        let mut canvas = canvas();
        let gradient = canvas.create_radial_gradient(32.0, 32.0, 16.0, 32.0, 32.0).unwrap();
        let handle = canvas.paint(gradient).unwrap().handle().unwrap();

        canvas.destroy_paint(gradient);
        canvas.destroy_paint(gradient);

        assert_eq!(canvas.backend().destroyed_paints(), &[handle]);
    }

    #[test]
    fn test_drop_releases_all_owned_handles() {
        let mut backend = HeadlessBackend::new(8, 8);
        {
            let mut canvas = Canvas2d::new(&mut backend).unwrap();
            let _gradient = canvas.create_linear_gradient(0.0, 0.0, 1.0, 1.0).unwrap();
            assert_eq!(canvas.backend().live_paints(), 4); // fill, stroke, shadow, gradient
        }
        assert_eq!(backend.live_paints(), 0);
        assert_eq!(backend.destroyed_paints().len(), 4);
    }
}
