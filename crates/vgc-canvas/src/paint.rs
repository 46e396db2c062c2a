//! Paint objects
//!
//! A [`Paint`] owns one native rasterizer paint handle plus the color
//! or color-ramp data needed to re-activate it. Activation scales
//! alpha by the current global alpha on a copy; the stored data is
//! never mutated by drawing.

use std::collections::HashMap;

use vgc_backend::{Backend, BackendError, DrawMode, PaintHandle, PaintType, PaintValues, SpreadMode};

/// Identifies a paint inside a context's paint store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaintId(pub(crate) u32);

/// Paint variant. A paint never changes kind after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintKind {
    Color,
    LinearGradient,
    RadialGradient,
}

/// One fill/stroke source bound to a native rasterizer handle.
#[derive(Debug)]
pub struct Paint {
    kind: PaintKind,
    /// Taken exactly once on destroy.
    handle: Option<PaintHandle>,
    /// Color paints hold one RGBA 4-tuple; gradients hold 5-tuples of
    /// (position, r, g, b, a) in insertion order.
    data: Vec<f32>,
}

impl Paint {
    /// Create a solid color paint. RGBA components are in [0, 1].
    pub fn color(
        backend: &mut impl Backend,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Result<Self, BackendError> {
        let handle = backend.create_paint()?;
        backend.set_paint_type(handle, PaintType::Color);

        let mut paint = Self {
            kind: PaintKind::Color,
            handle: Some(handle),
            data: Vec::new(),
        };
        paint.set_rgba(r, g, b, a);
        Ok(paint)
    }

    /// Create a linear gradient paint with an empty stop list. The
    /// gradient axis is uploaded to the native handle immediately.
    pub fn linear_gradient(
        backend: &mut impl Backend,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) -> Result<Self, BackendError> {
        let handle = backend.create_paint()?;
        backend.set_paint_type(handle, PaintType::LinearGradient);
        backend.set_paint_values(handle, PaintValues::LinearGradient, &[x1, y1, x2, y2]);

        Ok(Self {
            kind: PaintKind::LinearGradient,
            handle: Some(handle),
            data: Vec::new(),
        })
    }

    /// Create a radial gradient paint with an empty stop list. The
    /// geometry is uploaded immediately; the focal point goes in the
    /// middle of the parameter vector, the radius last.
    pub fn radial_gradient(
        backend: &mut impl Backend,
        cx: f32,
        cy: f32,
        r: f32,
        fx: f32,
        fy: f32,
    ) -> Result<Self, BackendError> {
        let handle = backend.create_paint()?;
        backend.set_paint_type(handle, PaintType::RadialGradient);
        backend.set_paint_values(handle, PaintValues::RadialGradient, &[cx, cy, fx, fy, r]);

        Ok(Self {
            kind: PaintKind::RadialGradient,
            handle: Some(handle),
            data: Vec::new(),
        })
    }

    pub fn kind(&self) -> PaintKind {
        self.kind
    }

    pub fn is_gradient(&self) -> bool {
        matches!(
            self.kind,
            PaintKind::LinearGradient | PaintKind::RadialGradient
        )
    }

    /// Stored color or stop data, untouched by activation.
    pub fn stop_data(&self) -> &[f32] {
        &self.data
    }

    /// Replace the RGBA 4-tuple of a color paint.
    ///
    /// # Panics
    /// Panics if this is not a color paint; that is a caller bug.
    pub fn set_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        assert_eq!(
            self.kind,
            PaintKind::Color,
            "set_rgba is only valid for color paints"
        );
        self.data.clear();
        self.data.extend_from_slice(&[r, g, b, a]);
    }

    /// Append a color stop to a gradient paint. Stops render in
    /// insertion order along the gradient axis.
    ///
    /// # Panics
    /// Panics if this is not a gradient paint; that is a caller bug.
    pub fn add_color_stop(&mut self, position: f32, r: f32, g: f32, b: f32, a: f32) {
        assert!(
            self.is_gradient(),
            "add_color_stop is only valid for gradient paints"
        );
        self.data.extend_from_slice(&[position, r, g, b, a]);
    }

    /// Upload the alpha-scaled parameters and bind this paint as the
    /// active paint for `mode`. The alpha scaling happens on a copy;
    /// `stop_data` is left unchanged.
    pub fn activate(&self, backend: &mut impl Backend, mode: DrawMode, global_alpha: f32) {
        let handle = self
            .handle
            .expect("activate called on a destroyed paint");

        match self.kind {
            PaintKind::Color => {
                let mut color = [0.0f32; 4];
                color.copy_from_slice(&self.data);
                color[3] *= global_alpha;
                backend.set_paint_values(handle, PaintValues::Color, &color);
            }
            PaintKind::LinearGradient | PaintKind::RadialGradient => {
                debug_assert_eq!(self.data.len() % 5, 0);

                let mut stops = self.data.clone();
                for alpha in stops.iter_mut().skip(4).step_by(5) {
                    *alpha *= global_alpha;
                }
                backend.set_paint_values(handle, PaintValues::ColorRampStops, &stops);
                backend.set_ramp_spread(handle, SpreadMode::Pad);
                backend.set_ramp_premultiplied(handle, false);
            }
        }

        backend.bind_paint(handle, mode);
    }

    /// Release the native handle and free the stop data. The handle is
    /// released exactly once; further calls are no-ops.
    pub fn destroy(&mut self, backend: &mut impl Backend) {
        if let Some(handle) = self.handle.take() {
            backend.destroy_paint(handle);
            self.data = Vec::new();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.handle.is_none()
    }

    pub(crate) fn handle(&self) -> Option<PaintHandle> {
        self.handle
    }
}

/// Owns every [`Paint`] of a context, keyed by copyable ids so style
/// slots and callers never hold references into the store.
#[derive(Debug, Default)]
pub(crate) struct PaintStore {
    paints: HashMap<u32, Paint>,
    next: u32,
}

impl PaintStore {
    pub fn insert(&mut self, paint: Paint) -> PaintId {
        let id = PaintId(self.next);
        self.next += 1;
        self.paints.insert(id.0, paint);
        id
    }

    pub fn get(&self, id: PaintId) -> Option<&Paint> {
        self.paints.get(&id.0)
    }

    pub fn get_mut(&mut self, id: PaintId) -> Option<&mut Paint> {
        self.paints.get_mut(&id.0)
    }

    pub fn remove(&mut self, id: PaintId) -> Option<Paint> {
        self.paints.remove(&id.0)
    }

    pub fn into_paints(self) -> impl Iterator<Item = Paint> {
        self.paints.into_values()
    }
}
