//! Background-removal relay
//!
//! The relay is a stateless protocol adapter: it accepts one image upload
//! from a trusted client, reattaches the server-held credential, forwards
//! the bytes to the external removal service and returns the processed
//! image (or a normalized error) to the caller. The credential never leaves
//! the server.
//!
//! One handler serves every caller. It is parameterized by an
//! input-decoding strategy (multipart vs base64 data URI) and an
//! output-encoding strategy (raw bytes vs JSON-wrapped base64), chosen per
//! request from the inbound content type.

mod client;
mod config;
mod envelope;
mod server;

pub use client::{ImagePayload, RelayClient};
pub use config::{RelayConfig, RelayConfigBuilder, CREDENTIAL_ENV_VAR, DEFAULT_UPSTREAM_URL};
pub use envelope::{RemoveBackgroundRequest, RemoveBackgroundResponse, ResponseEnvelope};
pub use server::{router, start_server};
