//! Status page handler.
//!
//! Queries every watch in registry order, builds view rows, and renders
//! an Askama template.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{Local, Utc};
use tracing::{error, warn};

use crate::AppState;
use crate::views::WatchView;

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    listen_address: String,
    watches: Vec<WatchView>,
}

/// ANY /
pub async fn status_page(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    let mut watches = Vec::with_capacity(state.registry.len());

    for watch in state.registry.iter() {
        let status = match watch.query().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(endpoint = %watch.endpoint(), error = %e, "status page query failed");
                None
            }
        };
        watches.push(WatchView::from_status(watch, status.as_ref(), now, &Local));
    }

    let page = StatusTemplate {
        listen_address: state.server.listen_address.clone(),
        watches,
    };
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "status page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal server fault\n").into_response()
        }
    }
}
