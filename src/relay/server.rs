//! Axum HTTP surface for the relay

use crate::{
    error::PicforgeError,
    relay::{
        client::RelayClient,
        envelope::{self, RemoveBackgroundRequest, ResponseEnvelope},
    },
};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Shared state behind every relay handler
struct RelayState {
    client: RelayClient,
}

type AppState = Arc<RelayState>;

/// Structured error body: `{"error": "<reason>"}`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the relay router
///
/// Routes:
/// - `POST /relay/remove-background` - multipart or JSON envelope
/// - `GET /health` - liveness probe
#[must_use]
pub fn router(client: RelayClient) -> Router {
    let max_upload_bytes = client.config().max_upload_bytes;
    let state: AppState = Arc::new(RelayState { client });

    Router::new()
        .route("/relay/remove-background", post(remove_background))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Bind the router to a listener and serve until the task is stopped
///
/// # Errors
/// Returns an error when the server fails to start or serve.
pub async fn start_server(
    listener: tokio::net::TcpListener,
    client: RelayClient,
) -> crate::error::Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| PicforgeError::internal(format!("Invalid TCP listener: {e}")))?;
    info!("Starting relay server at http://{addr}");

    axum::serve(listener, router(client).into_make_service())
        .await
        .map_err(|e| PicforgeError::internal(format!("Relay server failed: {e}")))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Single remove-background handler, dispatching on the request content type
///
/// The inbound envelope picks the outbound one: multipart uploads get raw
/// PNG bytes back, JSON bodies get a JSON-wrapped data URI.
async fn remove_background(State(state): State<AppState>, request: Request) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = if content_type.starts_with("multipart/form-data") {
        handle_multipart(&state, request)
            .await
            .map(|png| (ResponseEnvelope::Binary, png))
    } else if content_type.starts_with("application/json") {
        handle_json(&state, request)
            .await
            .map(|png| (ResponseEnvelope::JsonBase64, png))
    } else {
        Err(PicforgeError::invalid_input(format!(
            "Unsupported content type '{content_type}'. \
             Expected multipart/form-data or application/json"
        )))
    };

    match result {
        Ok((response_envelope, png_bytes)) => response_envelope.wrap(png_bytes),
        Err(err) => error_response(&err),
    }
}

async fn handle_multipart(state: &AppState, request: Request) -> crate::error::Result<Vec<u8>> {
    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| PicforgeError::invalid_input(format!("Invalid multipart request: {e}")))?;

    let payload = envelope::decode_multipart(multipart).await?;
    state.client.remove_background(payload).await
}

async fn handle_json(state: &AppState, request: Request) -> crate::error::Result<Vec<u8>> {
    let Json(body) = Json::<RemoveBackgroundRequest>::from_request(request, &())
        .await
        .map_err(|e| PicforgeError::invalid_input(format!("Invalid JSON request: {e}")))?;

    let payload = envelope::decode_json(&body)?;
    state.client.remove_background(payload).await
}

/// Map an error to its HTTP response
///
/// Bad input maps to 400; configuration, upstream and transport failures map
/// to 500. Upstream status codes are not preserved, and the credential never
/// appears in any message.
fn error_response(err: &PicforgeError) -> Response {
    let status = match err {
        PicforgeError::InvalidInput(_) | PicforgeError::Image(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(%err, "relay request failed");
    } else {
        warn!(%err, "rejected relay request");
    }

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic message".to_string()
    };

    error!("PANIC occurred in request: {message}");

    // Never surface the raw panic message to the client
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal error: request handler panicked".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::config::RelayConfig;

    #[test]
    fn test_router_builds() {
        let client = RelayClient::new(RelayConfig::default()).unwrap();
        let _router = router(client);
    }

    #[test]
    fn test_error_response_status_mapping() {
        let response = error_response(&PicforgeError::invalid_input("no image"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&PicforgeError::missing_credential("key unset"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error_response(&PicforgeError::upstream(402, "quota exceeded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
