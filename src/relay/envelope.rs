//! Relay request and response envelopes
//!
//! Input side: a multipart form with one file field, or a JSON body carrying
//! a base64 data URI. Output side: raw `image/png` bytes for multipart
//! callers, a JSON-wrapped base64 data URI for JSON callers. Exactly one
//! image per request; zero or multiple images are rejected.

use crate::{
    config::OutputFormat,
    error::{PicforgeError, Result},
    relay::client::ImagePayload,
    services::ImageCodec,
};
use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Field names treated as the image part of a multipart upload
const IMAGE_FIELD_NAMES: &[&str] = &["image_file", "image", "file"];

/// JSON request body: `{"image": "data:<mime>;base64,<payload>"}`
#[derive(Debug, Deserialize)]
pub struct RemoveBackgroundRequest {
    /// Base64 data URI of the image to process
    pub image: String,
}

/// JSON success body: `{"result": "data:image/png;base64,<payload>"}`
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveBackgroundResponse {
    /// Base64 data URI of the processed PNG
    pub result: String,
}

/// Output-encoding strategy, chosen by the inbound envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseEnvelope {
    /// Raw `image/png` bytes (multipart callers)
    Binary,
    /// JSON-wrapped base64 data URI (JSON callers)
    JsonBase64,
}

impl ResponseEnvelope {
    /// Wrap processed PNG bytes in this envelope
    #[must_use]
    pub fn wrap(self, png_bytes: Vec<u8>) -> Response {
        match self {
            Self::Binary => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, OutputFormat::Png.mime_type())],
                png_bytes,
            )
                .into_response(),
            Self::JsonBase64 => {
                let result = ImageCodec::encode_data_uri(OutputFormat::Png, &png_bytes);
                Json(RemoveBackgroundResponse { result }).into_response()
            },
        }
    }
}

/// Decode the single image out of a multipart upload
///
/// A field counts as the image when it carries a filename, an `image/*`
/// content type, or one of the conventional upload field names.
///
/// # Errors
/// Returns `InvalidInput` when the form holds zero or more than one image,
/// or when reading a part fails.
pub(crate) async fn decode_multipart(mut multipart: Multipart) -> Result<ImagePayload> {
    let mut payload: Option<ImagePayload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PicforgeError::invalid_input(format!("Failed to parse multipart request: {e}"))
    })? {
        let is_image = field.file_name().is_some()
            || field
                .content_type()
                .is_some_and(|ct| ct.starts_with("image/"))
            || field
                .name()
                .is_some_and(|name| IMAGE_FIELD_NAMES.contains(&name));

        if !is_image {
            continue;
        }

        if payload.is_some() {
            return Err(PicforgeError::invalid_input(
                "Request contains multiple image fields; exactly one is expected",
            ));
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("image.png")
            .to_string();

        let bytes = field.bytes().await.map_err(|e| {
            PicforgeError::invalid_input(format!("Failed to read uploaded image: {e}"))
        })?;

        payload = Some(ImagePayload::with_file_name(bytes.to_vec(), file_name));
    }

    payload.ok_or_else(|| {
        PicforgeError::invalid_input("No image field found in multipart request")
    })
}

/// Decode the image out of a JSON data-URI body
///
/// # Errors
/// Returns `InvalidInput` for malformed data URIs or non-image MIME types.
pub(crate) fn decode_json(request: &RemoveBackgroundRequest) -> Result<ImagePayload> {
    let (mime, bytes) = ImageCodec::parse_data_uri(&request.image)?;

    // Filename extension mirrors the declared MIME subtype
    let file_name = match OutputFormat::from_mime(&mime) {
        Ok(format) => format!("image.{}", format.extension()),
        Err(_) => "image.png".to_string(),
    };

    Ok(ImagePayload::with_file_name(bytes, file_name))
}
