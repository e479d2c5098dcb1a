//! Kick handlers.

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

use woof_core::TriggerKind;
use woof_watch::WatchError;

use crate::AppState;

/// ANY /{endpoint}
pub async fn kick_endpoint(
    State(state): State<AppState>,
    method: Method,
    Path(endpoint): Path<String>,
) -> Response {
    let watch = match state.registry.dispatch(&endpoint) {
        Ok(watch) => watch,
        Err(e) => return watch_error_response(&e),
    };

    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "POST")],
            "Method Not Allowed\n",
        )
            .into_response();
    }

    if !watch.trigger().accepts_kicks() {
        return (StatusCode::FORBIDDEN, "Forbidden\n").into_response();
    }

    if let Err(e) = watch.kick().await {
        warn!(%endpoint, error = %e, "kick failed");
        return watch_error_response(&e);
    }
    debug!(%endpoint, "kick accepted");

    match watch.trigger() {
        // Manual kicks come from the status page button; send the browser back.
        TriggerKind::Manual => Redirect::to("/").into_response(),
        _ => (StatusCode::OK, "Watchdog kicked\n").into_response(),
    }
}

fn watch_error_response(e: &WatchError) -> Response {
    let status = match e {
        WatchError::NotFound(_) => StatusCode::NOT_FOUND,
        WatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        WatchError::Closed(_) => StatusCode::SERVICE_UNAVAILABLE,
        WatchError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, format!("{e}\n")).into_response()
}
