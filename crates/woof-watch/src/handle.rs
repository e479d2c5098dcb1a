//! Cheap-to-clone interface for talking to a watch actor.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use woof_core::TriggerKind;

use crate::actor::{WatchCommand, WatchSpec, WatchStatus};
use crate::error::{WatchError, WatchResult};

/// Sends commands to one watch actor.
///
/// The immutable parts of the watch (endpoint, trigger, interval) are
/// copied into the handle, so dispatch and rendering never need a round
/// trip to the actor.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    spec: WatchSpec,
    reply_timeout: Duration,
    tx: mpsc::Sender<WatchCommand>,
}

impl WatchHandle {
    pub(crate) fn new(
        spec: &WatchSpec,
        tx: mpsc::Sender<WatchCommand>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            spec: spec.clone(),
            reply_timeout,
            tx,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.spec.endpoint
    }

    pub fn trigger(&self) -> TriggerKind {
        self.spec.trigger
    }

    pub fn interval(&self) -> Duration {
        self.spec.interval
    }

    /// Record a liveness signal "now" and wait for the actor to apply it.
    pub async fn kick(&self) -> WatchResult<()> {
        self.request(|reply| WatchCommand::Kick { reply }).await
    }

    /// Fetch a settled snapshot of the watch's status.
    pub async fn query(&self) -> WatchResult<WatchStatus> {
        self.request(|reply| WatchCommand::Query { reply }).await
    }

    /// The whole exchange, handing over the command and receiving the
    /// reply, is bounded by `reply_timeout`. A command the actor already
    /// accepted still takes effect after a timeout.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> WatchCommand,
    ) -> WatchResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.tx
                .send(command(reply_tx))
                .await
                .map_err(|_| WatchError::Closed(self.spec.endpoint.clone()))?;
            reply_rx
                .await
                .map_err(|_| WatchError::Closed(self.spec.endpoint.clone()))
        };

        tokio::time::timeout(self.reply_timeout, exchange)
            .await
            .map_err(|_| WatchError::Timeout {
                endpoint: self.spec.endpoint.clone(),
                after: self.reply_timeout,
            })?
    }
}
