//! Daemon startup, serving and signal handling.
//!
//! 1. Load the configuration (fatal on error)
//! 2. Load the status file, if configured (non-fatal on error)
//! 3. Spawn one watch actor per configured endpoint
//! 4. Serve the HTTP surface until Ctrl-C / SIGTERM
//! 5. On SIGHUP, and once more at shutdown, write a status snapshot

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tracing::{error, info, warn};

use woof_api::{AppState, build_router};
use woof_core::status::load_status;
use woof_core::{ConfigFile, ServerConfig, StatusFile};
use woof_watch::{SnapshotWriter, SystemClock, WatchRegistry};

/// Run the daemon until a shutdown signal arrives.
pub async fn run(config_path: &Path, listen_override: Option<String>) -> anyhow::Result<()> {
    info!(config = %config_path.display(), "woofd starting");

    let config = ConfigFile::from_file(config_path).context("loading configuration")?;
    if config.watches.is_empty() {
        bail!("no watches configured (malformed config file?)");
    }

    let mut server = config.server.clone();
    if let Some(listen) = listen_override {
        server.listen_address = listen;
    }

    let baseline = load_baseline(&server);
    let registry = WatchRegistry::spawn_from_config(&config, &baseline, Arc::new(SystemClock));
    let state = AppState::new(registry, server);

    // ── Snapshot trigger ───────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let snapshots = state
        .server
        .state_file
        .as_ref()
        .map(|path| Arc::new(SnapshotWriter::with_baseline(path, baseline.clone())));

    let hangup_handle = snapshots.clone().map(|writer| {
        let registry = Arc::clone(&state.registry);
        tokio::spawn(snapshot_on_hangup(writer, registry, shutdown_rx))
    });

    // ── HTTP server ────────────────────────────────────────────

    let addr = bind_address(&state.server.listen_address);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(handle) = hangup_handle {
        let _ = handle.await;
    }
    if let Some(writer) = snapshots {
        save_snapshot(&writer, &state.registry).await;
    }

    info!("woofd stopped");
    Ok(())
}

/// Load persisted status; on any failure start every watch fresh.
fn load_baseline(server: &ServerConfig) -> StatusFile {
    let Some(path) = &server.state_file else {
        return StatusFile::new();
    };
    match load_status(path) {
        Ok(status) => {
            info!(path = %path.display(), entries = status.len(), "resuming from status file");
            status
        }
        Err(e) => {
            warn!(error = %e, "continuing without previous state");
            StatusFile::new()
        }
    }
}

/// `":8080"` listens on every interface.
fn bind_address(listen: &str) -> String {
    if listen.starts_with(':') {
        format!("0.0.0.0{listen}")
    } else {
        listen.to_string()
    }
}

async fn save_snapshot(writer: &SnapshotWriter, registry: &WatchRegistry) {
    if let Err(e) = writer.write(registry).await {
        error!(path = %writer.path().display(), error = %e, "status snapshot failed");
    }
}

async fn snapshot_on_hangup(
    writer: Arc<SnapshotWriter>,
    registry: Arc<WatchRegistry>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot install SIGHUP handler; snapshots only at shutdown");
            return;
        }
    };

    loop {
        tokio::select! {
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                info!("SIGHUP received, writing status snapshot");
                save_snapshot(&writer, &registry).await;
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
}
