//! Image byte codec service
//!
//! This module separates byte-level decoding and encoding from business
//! logic, making the system more testable and maintainable. Everything that
//! turns bytes into pixels or pixels into bytes goes through here: the
//! session, the transforms, the relay envelopes and the CLI all share it.

use crate::{
    config::{EncodeSettings, OutputFormat},
    error::{PicforgeError, Result},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::DynamicImage;

/// Service for decoding and encoding image bytes
pub struct ImageCodec;

impl ImageCodec {
    /// Decode an image from raw bytes, detecting the container format
    ///
    /// # Arguments
    /// * `bytes` - Encoded image data (PNG, JPEG or WebP)
    ///
    /// # Returns
    /// * `Ok((DynamicImage, OutputFormat))` - Decoded pixels plus the detected format
    /// * `Err(PicforgeError)` - Undecodable bytes or an unsupported container
    pub fn decode(bytes: &[u8]) -> Result<(DynamicImage, OutputFormat)> {
        let detected = image::guess_format(bytes)
            .map_err(|e| PicforgeError::decode_error(bytes.len(), &e))?;

        let format = match detected {
            image::ImageFormat::Png => OutputFormat::Png,
            image::ImageFormat::Jpeg => OutputFormat::Jpeg,
            image::ImageFormat::WebP => OutputFormat::WebP,
            other => {
                return Err(PicforgeError::invalid_input(format!(
                    "Unsupported image container {other:?}. Supported formats: PNG, JPEG, WebP"
                )))
            },
        };

        let image = image::load_from_memory_with_format(bytes, detected)
            .map_err(|e| PicforgeError::decode_error(bytes.len(), &e))?;

        tracing::debug!(
            format = %format,
            width = image.width(),
            height = image.height(),
            "decoded image"
        );

        Ok((image, format))
    }

    /// Encode an image to bytes in the requested format
    ///
    /// PNG and WebP are encoded losslessly; JPEG uses the quality setting
    /// and drops the alpha channel.
    pub fn encode(image: &DynamicImage, settings: &EncodeSettings) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        match settings.format {
            OutputFormat::Png => {
                image.write_to(&mut cursor, image::ImageFormat::Png)?;
            },
            OutputFormat::Jpeg => {
                let rgb_image = image.to_rgb8();
                let mut jpeg_encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut cursor,
                    settings.quality.as_percent(),
                );
                jpeg_encoder.encode_image(&rgb_image)?;
            },
            OutputFormat::WebP => {
                // The image crate's WebP encoder is lossless; the quality
                // setting does not apply.
                image.write_to(&mut cursor, image::ImageFormat::WebP)?;
            },
        }

        Ok(buffer)
    }

    /// Encode image bytes as a `data:` URI
    #[must_use]
    pub fn encode_data_uri(format: OutputFormat, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", format.mime_type(), BASE64.encode(bytes))
    }

    /// Parse a `data:<mime>;base64,<payload>` URI into its MIME type and bytes
    ///
    /// # Errors
    /// Returns `InvalidInput` when the URI scheme, encoding marker or base64
    /// payload is malformed, or when the MIME type is not an image type.
    pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
        let rest = uri.strip_prefix("data:").ok_or_else(|| {
            PicforgeError::invalid_input("Expected a data URI starting with 'data:'")
        })?;

        let (mediatype, payload) = rest.split_once(',').ok_or_else(|| {
            PicforgeError::invalid_input("Malformed data URI: missing ',' separator")
        })?;

        let mime = mediatype.strip_suffix(";base64").ok_or_else(|| {
            PicforgeError::invalid_input("Malformed data URI: only base64 encoding is supported")
        })?;

        if !mime.starts_with("image/") {
            return Err(PicforgeError::invalid_input(format!(
                "Expected an image data URI, got MIME type '{mime}'"
            )));
        }

        let bytes = BASE64.decode(payload).map_err(|e| {
            PicforgeError::invalid_input(format!("Invalid base64 payload in data URI: {e}"))
        })?;

        Ok((mime.to_string(), bytes))
    }
}
