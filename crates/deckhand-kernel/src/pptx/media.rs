//! Picture loading: format detection and pixel dimensions.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::error::{DeckError, Result};

/// An image embedded in the package.
#[derive(Clone, Debug)]
pub(crate) struct MediaPart {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

impl MediaPart {
    /// Read and sniff an image file.
    ///
    /// A missing file is `ResourceNotFound`; an unreadable or unsupported one
    /// is a backend failure.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DeckError::ResourceNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => DeckError::ResourceNotFound(path.to_path_buf()),
            _ => DeckError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        if extension(format).is_none() {
            return Err(DeckError::backend(format!(
                "unsupported image format {format:?}"
            )));
        }
        let (width_px, height_px) = ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()?;
        if width_px == 0 || height_px == 0 {
            return Err(DeckError::backend("image has zero size"));
        }
        Ok(Self {
            bytes,
            format,
            width_px,
            height_px,
        })
    }

    /// Part-name extension.
    pub fn ext(&self) -> &'static str {
        extension(self.format).unwrap_or("bin")
    }

    /// Height over width of the source pixels.
    pub fn aspect(&self) -> f64 {
        self.height_px as f64 / self.width_px as f64
    }
}

fn extension(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpeg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::Bmp => Some("bmp"),
        _ => None,
    }
}

pub(crate) fn content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Resolve the picture box from optional caller dimensions.
pub(crate) fn fit(width: Option<f64>, height: Option<f64>, aspect: f64) -> (f64, f64) {
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * aspect),
        (None, Some(h)) => (h / aspect, h),
        (None, None) => (4.0, 3.0),
    }
}
