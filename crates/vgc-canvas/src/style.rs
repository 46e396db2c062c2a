//! Fill/stroke style binding
//!
//! Each style slot tracks the paint it references and whether the slot
//! owns that paint. Context-created color paints are owned and get
//! destroyed when replaced; gradient/pattern paints supplied by the
//! caller are borrowed and remain the caller's to destroy.

use vgc_backend::{Backend, BackendError};

use crate::paint::{Paint, PaintId, PaintKind, PaintStore};

/// One style slot (fill or stroke).
#[derive(Debug, Clone, Copy)]
pub(crate) struct StyleSlot {
    pub paint: PaintId,
    pub owned: bool,
}

impl StyleSlot {
    pub fn owned(paint: PaintId) -> Self {
        Self { paint, owned: true }
    }
}

/// Set a slot to a plain color. Reuses the existing native handle when
/// the slot already holds a color paint; otherwise installs a fresh
/// context-owned color paint, destroying the old paint only if the
/// slot owned it.
pub(crate) fn set_color<B: Backend>(
    slot: &mut StyleSlot,
    store: &mut PaintStore,
    backend: &mut B,
    r: f32,
    g: f32,
    b: f32,
    a: f32,
) -> Result<(), BackendError> {
    if let Some(paint) = store.get_mut(slot.paint) {
        if paint.kind() == PaintKind::Color {
            paint.set_rgba(r, g, b, a);
            return Ok(());
        }
    }

    if slot.owned {
        if let Some(mut old) = store.remove(slot.paint) {
            old.destroy(backend);
        }
    }

    let id = store.insert(Paint::color(backend, r, g, b, a)?);
    *slot = StyleSlot::owned(id);
    Ok(())
}

/// Set a slot to an externally owned paint. The previous paint is
/// destroyed only if the slot owned it; the new paint is stored as a
/// non-owning reference.
pub(crate) fn set_paint<B: Backend>(
    slot: &mut StyleSlot,
    store: &mut PaintStore,
    backend: &mut B,
    id: PaintId,
) {
    if slot.owned {
        if let Some(mut old) = store.remove(slot.paint) {
            old.destroy(backend);
        }
    }

    *slot = StyleSlot {
        paint: id,
        owned: false,
    };
}
