//! Webhook intake endpoint
//!
//! Validates the routing header and resolves the target instance
//! synchronously, then dispatches the processing pipeline as a
//! detached task. The HTTP response never waits on the pipeline;
//! remediation outcomes are observable only in the logs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::error;

use crate::AppState;

/// Header carrying the routing credential that selects an instance
pub const ROUTING_HEADER: &str = "warden-key";

/// POST /webhook
///
/// 400 for a missing routing header or unknown routing key; 204 once
/// the pipeline has been dispatched, regardless of its outcome.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let routing_key = headers
        .get(ROUTING_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if routing_key.is_empty() {
        error!("missing header: {ROUTING_HEADER}");
        return Err((
            StatusCode::BAD_REQUEST,
            format!("missing header: {ROUTING_HEADER}"),
        ));
    }

    let Some(instance) = state.store.resolve(routing_key) else {
        error!(routing_key = %routing_key, "no instance associated with routing key");
        return Err((
            StatusCode::BAD_REQUEST,
            format!("no associated instance was found for key {routing_key}"),
        ));
    };

    let Some(client) = instance.client() else {
        // The load path initializes clients eagerly; hitting this
        // means the instance was built outside it.
        error!(routing_key = %routing_key, "instance client was not initialized");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "instance client was not initialized".to_string(),
        ));
    };

    let key = routing_key.to_string();
    tokio::spawn(async move {
        if let Err(e) = client.process_webhook(&body).await {
            error!(routing_key = %key, error = %e, "error processing webhook");
        }
    });

    Ok(StatusCode::NO_CONTENT)
}
