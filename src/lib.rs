#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Picforge
//!
//! An image editing toolkit in Rust: resize, compress and format-convert
//! images in memory, and relay uploads to an external background-removal
//! service through a server-side proxy that holds the credential.
//!
//! The relay never exposes the credential to clients: the key is sourced
//! only from server-held configuration (`REMOVE_BG_API_KEY`), and its
//! absence produces a deterministic configuration error instead of an
//! unauthenticated upstream call.
//!
//! ## Features
//!
//! - **Transforms**: resize (Lanczos3), quality re-encode, PNG/JPEG/WebP
//!   conversion with opaque background fill for alpha-less targets
//! - **Editor session**: explicit owner of the loaded image, replaced on
//!   each successful transform
//! - **Relay server**: one axum endpoint accepting multipart or JSON
//!   base64 envelopes, answering in kind
//! - **CLI integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ### Local transforms
//!
//! ```rust,no_run
//! use picforge::{EditorSession, ResizeTarget, Quality};
//!
//! # fn example(upload_bytes: Vec<u8>) -> picforge::Result<()> {
//! let mut session = EditorSession::load("photo.png", &upload_bytes)?;
//! session.resize(&ResizeTarget::exact(800, 600))?;
//! let png_bytes = session.export(Quality::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Background removal relay
//!
//! ```rust,no_run
//! use picforge::{remove_background_from_bytes, RelayConfig};
//!
//! # async fn example(upload_bytes: Vec<u8>) -> picforge::Result<()> {
//! let config = RelayConfig::from_env();
//! let png_bytes = remove_background_from_bytes(&upload_bytes, config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Serving the relay
//!
//! ```rust,no_run
//! use picforge::{relay, RelayClient, RelayConfig};
//!
//! # async fn example() -> picforge::Result<()> {
//! let client = RelayClient::new(RelayConfig::from_env())?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! relay::start_server(listener, client).await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod relay;
pub mod services;
pub mod session;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod transform;

// Public API exports
pub use config::{EncodeSettings, OutputFormat, Quality};
pub use error::{PicforgeError, Result};
pub use relay::{
    ImagePayload, RelayClient, RelayConfig, RelayConfigBuilder, RemoveBackgroundRequest,
    RemoveBackgroundResponse, ResponseEnvelope, CREDENTIAL_ENV_VAR, DEFAULT_UPSTREAM_URL,
};
pub use services::ImageCodec;
pub use session::EditorSession;
pub use transform::ResizeTarget;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove the background from an image provided as bytes
///
/// Convenience wrapper for one-shot processing: builds a [`RelayClient`]
/// from the given configuration and makes a single upstream call. Servers
/// handling many requests should construct one client and reuse it.
///
/// # Arguments
///
/// * `image_bytes` - Raw encoded image data (PNG, JPEG, WebP)
/// * `config` - Relay configuration including the credential
///
/// # Returns
///
/// The processed image as PNG bytes.
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    config: RelayConfig,
) -> Result<Vec<u8>> {
    let client = RelayClient::new(config)?;
    client
        .remove_background(ImagePayload::new(image_bytes.to_vec()))
        .await
}
