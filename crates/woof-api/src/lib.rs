//! woof-api — HTTP surface for woof.
//!
//! Every registered endpoint is addressed by its name as the URL path.
//! The root path renders the status page.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | any | `/` | Status page (Manual watches get a kick button) |
//! | POST | `/{endpoint}` | Kick a watch |
//!
//! # Kick responses
//!
//! | Case | Status |
//! |---|---|
//! | unknown endpoint | 404 Not Found |
//! | method other than POST | 405 Method Not Allowed |
//! | Periodic watch | 403 Forbidden |
//! | Manual watch | 303 See Other → `/` |
//! | Post watch | 200 `Watchdog kicked` |
//! | watch did not answer in time | 504 Gateway Timeout |

pub mod handlers;
pub mod pages;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use woof_core::ServerConfig;
use woof_watch::WatchRegistry;

/// Shared state for all handlers, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WatchRegistry>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(registry: WatchRegistry, server: ServerConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            server: Arc::new(server),
        }
    }
}

/// Build the complete router (status page + kick endpoints).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(pages::status_page))
        .route("/{*endpoint}", any(handlers::kick_endpoint))
        .with_state(state)
}
