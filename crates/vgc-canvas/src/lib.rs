//! vgc Canvas 2D Core
//!
//! HTML5-Canvas-like drawing state on top of an OpenVG-class
//! rasterizer: paint objects (solid color, linear/radial gradient),
//! fill/stroke style binding with explicit ownership tracking, global
//! alpha compositing, and the fill renderer with its optional shadow
//! pre-pass. Path construction beyond what `fill_rect` needs, text,
//! and transforms live elsewhere.

mod context;
mod paint;
mod style;

pub use context::{Canvas2d, Shadow};
pub use paint::{Paint, PaintId, PaintKind};

/// Canvas error
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("rasterizer error: {0}")]
    Backend(#[from] vgc_backend::BackendError),

    #[error("unknown paint id")]
    UnknownPaint,
}
