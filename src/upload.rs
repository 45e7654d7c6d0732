//! Validation of user-supplied images before they are forwarded to the
//! classification backend.
//!
//! The backend does its own decoding and resizing; here the bytes are only
//! sniffed so obviously wrong uploads (text files, empty bodies, oversized
//! files) are refused locally with a readable message.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::UploadError;

/// An image accepted for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    /// `(width, height)` when the format's decoder is compiled in.
    pub dimensions: Option<(u32, u32)>,
}

impl ImageUpload {
    /// Checks size and format of `bytes`.
    ///
    /// An empty `file_name` is replaced with `upload.<ext>`.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(UploadError::TooLarge { size: bytes.len(), limit: max_bytes });
        }

        let format = image::guess_format(&bytes).map_err(|_| UploadError::UnrecognizedFormat)?;
        if mime_for(format).is_none() {
            return Err(UploadError::UnrecognizedFormat);
        }

        let dimensions = image::io::Reader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()
            .ok();

        let mut file_name = file_name.into();
        if file_name.trim().is_empty() {
            let ext = format.extensions_str().first().copied().unwrap_or("img");
            file_name = format!("upload.{}", ext);
        }

        Ok(ImageUpload { file_name, bytes, format, dimensions })
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for(self.format).unwrap_or("application/octet-stream")
    }

    /// Short label such as `PNG` for display next to the preview.
    pub fn format_label(&self) -> &'static str {
        match self.format {
            ImageFormat::Png  => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif  => "GIF",
            ImageFormat::Bmp  => "BMP",
            ImageFormat::WebP => "WebP",
            ImageFormat::Tiff => "TIFF",
            _                 => "image",
        }
    }
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png  => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif  => Some("image/gif"),
        ImageFormat::Bmp  => Some("image/bmp"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}
