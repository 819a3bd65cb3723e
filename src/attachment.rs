use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;

use crate::error::AttachmentError;
use crate::gemini::Part;

/// The image staged for the next outgoing turn. Holds at most one path.
#[derive(Debug, Default)]
pub struct PendingAttachment {
    path: Option<PathBuf>,
}

impl PendingAttachment {
    /// Stages `path`, replacing whatever was staged before.
    pub fn set(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn clear(&mut self) {
        self.path = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub fn is_set(&self) -> bool {
        self.path.is_some()
    }

    /// Removes and returns the staged path.
    pub fn take(&mut self) -> Option<PathBuf> {
        self.path.take()
    }
}

/// Reads and validates an image file, producing an inline data part.
///
/// Formats the service accepts directly are forwarded byte for byte, anything
/// else that decodes is re-encoded as PNG.
pub fn load_image(path: &Path) -> Result<Part, AttachmentError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AttachmentError::NotFound(path.to_path_buf()),
        _ => AttachmentError::Io(e),
    })?;

    let format = image::guess_format(&bytes)?;
    let decoded = image::load_from_memory_with_format(&bytes, format)?;

    let (mime_type, data) = match passthrough_mime(format) {
        Some(mime_type) => (mime_type, bytes),
        None => {
            let mut png = Vec::new();
            decoded.write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)?;
            ("image/png", png)
        }
    };

    tracing::debug!(
        path = %path.display(),
        mime_type,
        width = decoded.width(),
        height = decoded.height(),
        "image loaded"
    );

    Ok(Part::image(mime_type, general_purpose::STANDARD.encode(data)))
}

fn passthrough_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
