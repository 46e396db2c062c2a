//! vgc Image Encode Bridge
//!
//! Reads back the rendered surface and serializes it to PNG or JPEG,
//! as a `data:<mime>;base64,` URL or as a raw blob. The pixel
//! readback always happens synchronously on the rendering thread; for
//! blob export the conversion and encoding can then run on a worker
//! thread.

mod base64;
mod capture;
mod codec;
mod export;
mod surface;

pub use base64::{encode as base64_encode, encode_with_prefix as base64_encode_with_prefix};
pub use capture::{Capture, image_data};
pub use codec::{DEFAULT_JPEG_QUALITY, MimeType, encode};
pub use export::{Blob, PendingBlob, dispatch_blob, encode_blob, to_data_url};
pub use surface::ImageSurface;

/// Encode error
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("pixel capture failed: {0}")]
    Capture(#[from] vgc_backend::BackendError),

    #[error("image encoding failed: {0}")]
    Codec(#[from] image::ImageError),

    #[error("encode worker disappeared before delivering a result")]
    WorkerGone,
}
