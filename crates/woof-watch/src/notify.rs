//! Expiry actions.
//!
//! When a watch expires the actor hands an [`ExpiryContext`] to its
//! [`ExpiryNotifier`]. The command notifier launches the configured
//! command on a detached task, so a slow or hung command never holds up
//! the actor or anyone waiting on it.

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::actor::WatchStatus;

/// Values exported to the expiry command's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryContext {
    pub pid: u32,
    pub endpoint: String,
    /// Epoch seconds of the last kick, 0 if never kicked.
    pub last_seen: i64,
    /// Epoch seconds of the next due time.
    pub due: i64,
    pub missed_reports: u32,
}

impl ExpiryContext {
    pub fn new(endpoint: &str, status: &WatchStatus) -> Self {
        Self {
            pid: std::process::id(),
            endpoint: endpoint.to_string(),
            last_seen: status.last_seen.map(|t| t.timestamp()).unwrap_or(0),
            due: status.due.timestamp(),
            missed_reports: status.missed_reports,
        }
    }

    /// The complete environment handed to the command.
    pub fn env_vars(&self) -> [(&'static str, String); 5] {
        [
            ("WOOF_PID", self.pid.to_string()),
            ("WOOF_ENDPOINT", self.endpoint.clone()),
            ("WOOF_LASTSEEN", self.last_seen.to_string()),
            ("WOOF_DUE", self.due.to_string()),
            ("WOOF_MISSEDREPORTS", self.missed_reports.to_string()),
        ]
    }
}

/// Receives expiry events from a watch actor.
///
/// `notify` is called from inside the actor's turn and must not block.
pub trait ExpiryNotifier: Send + Sync + 'static {
    fn notify(&self, ctx: ExpiryContext);
}

/// Runs `exec_args… on_expiry` for every expiry.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    argv: Vec<String>,
}

impl CommandNotifier {
    /// Returns `None` unless both the prefix and the command are non-empty.
    pub fn new(exec_args: &[String], on_expiry: &str) -> Option<Self> {
        if exec_args.is_empty() || on_expiry.is_empty() {
            return None;
        }
        let mut argv = exec_args.to_vec();
        argv.push(on_expiry.to_string());
        Some(Self { argv })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Run the command to completion. Output is discarded and the child
    /// sees only the `WOOF_*` variables.
    pub async fn run(&self, ctx: &ExpiryContext) -> std::io::Result<ExitStatus> {
        Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .env_clear()
            .envs(ctx.env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
    }
}

impl ExpiryNotifier for CommandNotifier {
    fn notify(&self, ctx: ExpiryContext) {
        let notifier = self.clone();
        tokio::spawn(async move {
            match notifier.run(&ctx).await {
                Ok(status) if status.success() => {
                    debug!(endpoint = %ctx.endpoint, "expiry command finished");
                }
                Ok(status) => {
                    warn!(endpoint = %ctx.endpoint, %status, "expiry command failed");
                }
                Err(e) => {
                    warn!(endpoint = %ctx.endpoint, error = %e, command = ?notifier.argv, "expiry command could not be launched");
                }
            }
        });
    }
}
