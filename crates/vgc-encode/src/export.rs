//! Data-URL and blob export
//!
//! Output shaping on top of the codec: `to_data_url` is synchronous;
//! blob export is a two-phase operation where the capture happens on
//! the rendering thread and `dispatch_blob` moves conversion and
//! encoding onto a worker thread. Once dispatched, an export runs to
//! completion or failure; there is no cancellation and no retry.

use std::sync::mpsc;
use std::thread;

use crate::EncodeError;
use crate::base64;
use crate::capture::Capture;
use crate::codec::{self, MimeType};
use crate::surface::ImageSurface;

/// Serialize a capture to `data:<mime>;base64,<payload>`.
pub fn to_data_url(
    capture: &Capture,
    mime: &str,
    encoder_options: f32,
) -> Result<String, EncodeError> {
    let mime = MimeType::parse(mime);
    let surface = ImageSurface::from_capture(capture);
    let encoded = codec::encode(&surface, mime, encoder_options)?;

    let prefix = format!("data:{};base64,", mime.as_str());
    Ok(base64::encode_with_prefix(&prefix, &encoded))
}

/// Raw encoded image bytes plus their length. No envelope.
#[derive(Debug)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Serialize a capture to an encoded blob on the calling thread.
pub fn encode_blob(
    capture: &Capture,
    mime: &str,
    encoder_options: f32,
) -> Result<Blob, EncodeError> {
    let mime = MimeType::parse(mime);
    let surface = ImageSurface::from_capture(capture);
    let data = codec::encode(&surface, mime, encoder_options)?;
    Ok(Blob { data })
}

/// An in-flight asynchronous blob export.
pub struct PendingBlob {
    rx: mpsc::Receiver<Result<Blob, EncodeError>>,
}

impl PendingBlob {
    /// Block until the worker delivers its result.
    pub fn wait(self) -> Result<Blob, EncodeError> {
        self.rx.recv().unwrap_or(Err(EncodeError::WorkerGone))
    }

    /// Non-blocking poll; `None` while the worker is still encoding.
    pub fn try_wait(&self) -> Option<Result<Blob, EncodeError>> {
        self.rx.try_recv().ok()
    }
}

/// Hand an already captured frame to a worker thread for conversion
/// and encoding. The capture itself must have happened on the
/// rendering thread; from here on only plain buffers move.
pub fn dispatch_blob(capture: Capture, mime: String, encoder_options: f32) -> PendingBlob {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = encode_blob(&capture, &mime, encoder_options);
        if let Err(err) = &result {
            tracing::error!("blob export failed: {}", err);
        }
        // receiver may be gone; the export is fire-and-forget then
        let _ = tx.send(result);
    });

    PendingBlob { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgc_backend::HeadlessBackend;

    fn capture_4x4() -> Capture {
        let mut backend = HeadlessBackend::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                backend.set_pixel(x, y, (x * 60) as u8, (y * 60) as u8, 128, 255);
            }
        }
        Capture::from_backend(&mut backend).unwrap()
    }

    #[test]
    fn test_data_url_png_prefix() {
        let url = to_data_url(&capture_4x4(), "image/png", 0.0).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn test_data_url_jpeg_prefix() {
        let url = to_data_url(&capture_4x4(), "image/jpeg", 0.8).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_unsupported_mime_downgrades_to_png_data_url() {
        let url = to_data_url(&capture_4x4(), "image/bmp", 0.0).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_blob_is_raw_container_bytes() {
        let blob = encode_blob(&capture_4x4(), "image/png", 0.0).unwrap();
        assert!(blob.data().starts_with(&[0x89, 0x50, 0x4E, 0x47]));
        assert_eq!(blob.len(), blob.data().len());
    }

    #[test]
    fn test_jpeg_blob_signature() {
        let blob = encode_blob(&capture_4x4(), "image/jpeg", 0.5).unwrap();
        assert!(blob.data().starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_dispatched_blob_matches_sync_encode() {
        let capture = capture_4x4();
        let sync = encode_blob(&capture, "image/png", 0.0).unwrap();

        let pending = dispatch_blob(capture, "image/png".to_string(), 0.0);
        let blob = pending.wait().unwrap();

        // PNG encoding is deterministic, both paths must agree
        assert_eq!(blob.data(), sync.data());
    }

    #[test]
    fn test_data_url_payload_decodes_as_png() {
        let url = to_data_url(&capture_4x4(), "image/png", 0.0).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();

        // strict standard alphabet with '=' padding only at the end
        assert!(payload.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
        }));
        assert_eq!(payload.len() % 4, 0);
    }
}
