//! Attachment transcoding boundary
//!
//! The gateway never inspects image bytes itself: uploads pass through the
//! [`Transcoder`] trait, which takes the raw upload and hands back the
//! bytes to distribute (or an error the uploader is told about). Only the
//! framing around those bytes is gateway logic.

use thiserror::Error;

/// MIME types accepted for attachment uploads
pub const ALLOWED_IMAGE_TYPES: [&str; 7] = [
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/svg+xml",
    "image/webp",
];

/// Check an upload's declared MIME type against the allow-list
#[must_use]
pub fn is_allowed_image_type(mime: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime)
}

/// Errors from the transcoding collaborator
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("image transcoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Converts uploaded image bytes into the single format clients receive
///
/// Implementations are CPU-bound and synchronous; callers run them on a
/// blocking thread.
pub trait Transcoder: Send + Sync + 'static {
    /// Transcode raw upload bytes
    ///
    /// # Errors
    /// Returns an error if the bytes cannot be decoded or re-encoded; the
    /// caller reports this to the uploader only.
    fn transcode(&self, data: &[u8], mime: &str) -> Result<Vec<u8>, TranscodeError>;
}

/// Transcoder backed by the `image` crate, re-encoding everything to PNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTranscoder;

impl Transcoder for ImageTranscoder {
    fn transcode(&self, data: &[u8], _mime: &str) -> Result<Vec<u8>, TranscodeError> {
        let decoded = image::load_from_memory(data)?;
        let mut out = std::io::Cursor::new(Vec::new());
        decoded.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}
