//! Outbound client for the upstream background-removal service

use crate::{
    error::{PicforgeError, Result},
    relay::config::{RelayConfig, CREDENTIAL_ENV_VAR},
};
use reqwest::{multipart, Client};
use tracing::{debug, info, warn};

/// One inbound image, decoded out of whichever envelope carried it
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw encoded image bytes
    pub bytes: Vec<u8>,
    /// Filename forwarded to the upstream service
    pub file_name: String,
}

impl ImagePayload {
    /// Create a payload with the upstream's default filename
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "image.png".to_string(),
        }
    }

    /// Create a payload with an explicit filename
    #[must_use]
    pub fn with_file_name(bytes: Vec<u8>, file_name: String) -> Self {
        Self { bytes, file_name }
    }
}

/// Client that forwards images to the upstream removal service
///
/// Makes exactly one outbound call per invocation: no retries, no caching,
/// no persistence.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    config: RelayConfig,
}

impl RelayClient {
    /// Create a new relay client
    ///
    /// # Errors
    /// - Failed to create the HTTP client
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PicforgeError::network_error("create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// The configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Forward an image to the upstream service and return the processed bytes
    ///
    /// The credential check happens before anything leaves the server: a
    /// missing key produces a deterministic error rather than an
    /// unauthenticated upstream call.
    ///
    /// # Errors
    /// - `MissingCredential` when no API key is configured
    /// - `InvalidInput` for an empty payload
    /// - `Upstream` when the service responds with a non-success status
    /// - `Network` for transport failures
    pub async fn remove_background(&self, payload: ImagePayload) -> Result<Vec<u8>> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            PicforgeError::missing_credential(format!(
                "{CREDENTIAL_ENV_VAR} is not configured on the server"
            ))
        })?;

        if payload.bytes.is_empty() {
            return Err(PicforgeError::invalid_input("Uploaded image is empty"));
        }

        debug!(
            bytes = payload.bytes.len(),
            file = %payload.file_name,
            "forwarding image to upstream"
        );

        let form = multipart::Form::new()
            .part(
                "image_file",
                multipart::Part::bytes(payload.bytes).file_name(payload.file_name),
            )
            .text("size", "auto");

        let response = self
            .client
            .post(&self.config.upstream_url)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PicforgeError::network_error("reach background removal service", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "upstream rejected request");
            let message = if body.trim().is_empty() {
                format!("upstream returned status {status}")
            } else {
                body
            };
            return Err(PicforgeError::upstream(status.as_u16(), message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PicforgeError::network_error("read upstream response", e))?;

        info!(bytes = bytes.len(), "background removal completed");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_is_rejected_locally() {
        let client = RelayClient::new(RelayConfig::default()).unwrap();
        let err = client
            .remove_background(ImagePayload::new(vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, PicforgeError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected_locally() {
        let config = RelayConfig::builder().api_key("key").build().unwrap();
        let client = RelayClient::new(config).unwrap();
        let err = client
            .remove_background(ImagePayload::new(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, PicforgeError::InvalidInput(_)));
    }
}
