//! Editor session owning the currently loaded image
//!
//! The session is an explicit object rather than ambient mutable state:
//! created when an image is uploaded, replaced wholesale on each successful
//! transform, dropped on reset. At most one image is being edited at a
//! time.

use crate::{
    config::{EncodeSettings, OutputFormat, Quality},
    error::Result,
    services::ImageCodec,
    transform::{self, ResizeTarget},
};
use image::DynamicImage;
use std::path::Path;
use tracing::info;

/// The currently loaded image plus everything needed to export it
#[derive(Debug, Clone)]
pub struct EditorSession {
    image: DynamicImage,
    format: OutputFormat,
    file_stem: String,
}

impl EditorSession {
    /// Create a session from uploaded bytes
    ///
    /// Decodes the image, detects its container format and derives the
    /// download file stem from the original name.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the bytes are not a decodable supported image.
    pub fn load(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let (image, format) = ImageCodec::decode(bytes)?;
        let file_stem = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("image")
            .to_string();

        info!(
            file = file_name,
            %format,
            width = image.width(),
            height = image.height(),
            "loaded image into session"
        );

        Ok(Self {
            image,
            format,
            file_stem,
        })
    }

    /// The decoded image currently held by the session
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The format the session will export under
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Current pixel dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Filename for downloading the current result, derived from the
    /// original file stem and the current format's extension
    #[must_use]
    pub fn download_filename(&self) -> String {
        format!("{}_edited.{}", self.file_stem, self.format.extension())
    }

    /// Resize the image in place, replacing the session contents
    pub fn resize(&mut self, target: &ResizeTarget) -> Result<()> {
        self.image = transform::resize(&self.image, target)?;
        Ok(())
    }

    /// Re-encode at the given quality, replacing the session contents
    ///
    /// The encode-then-decode round trip makes lossy compression observable
    /// in subsequent operations on the session.
    pub fn compress(&mut self, quality: Quality) -> Result<()> {
        let bytes = transform::compress(&self.image, self.format, quality)?;
        let (image, _) = ImageCodec::decode(&bytes)?;
        self.image = image;
        Ok(())
    }

    /// Convert to another format, replacing the session contents
    pub fn convert(&mut self, settings: &EncodeSettings) -> Result<()> {
        let bytes = transform::convert(&self.image, settings)?;
        let (image, format) = ImageCodec::decode(&bytes)?;
        self.image = image;
        self.format = format;
        Ok(())
    }

    /// Replace the session contents with externally processed bytes
    ///
    /// Used after a successful background-removal relay round trip, which
    /// always returns PNG.
    pub fn replace_with_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let (image, format) = ImageCodec::decode(bytes)?;
        self.image = image;
        self.format = format;
        Ok(())
    }

    /// Export the current image as encoded bytes in the session format
    pub fn export(&self, quality: Quality) -> Result<Vec<u8>> {
        ImageCodec::encode(
            &self.image,
            &EncodeSettings {
                format: self.format,
                quality,
            },
        )
    }
}
