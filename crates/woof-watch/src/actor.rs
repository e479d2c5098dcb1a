//! Watch actor — the task that owns one endpoint's liveness state.
//!
//! The actor multiplexes three events in a single loop: its own timer
//! firing, a kick, and a status query. Nothing else can read or write
//! the status, so every caller sees a settled state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use woof_core::{PersistedStatus, TriggerKind, WatchConfig};

use crate::clock::{Clock, after};
use crate::handle::WatchHandle;
use crate::notify::{ExpiryContext, ExpiryNotifier};
use crate::stats::IntervalStats;

/// Immutable identity and schedule of a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSpec {
    pub endpoint: String,
    pub trigger: TriggerKind,
    pub interval: Duration,
}

impl WatchSpec {
    pub fn from_config(endpoint: &str, config: &WatchConfig) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            trigger: config.trigger,
            interval: config.effective_interval(),
        }
    }
}

/// Point-in-time view of a watch, as returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchStatus {
    /// Last kick (or last expiry, for periodic watches). `None` = never.
    pub last_seen: Option<DateTime<Utc>>,
    pub interval_mean: Duration,
    pub interval_std_dev: Duration,
    /// When the next kick is expected.
    pub due: DateTime<Utc>,
    /// Expiries since the last kick.
    pub missed_reports: u32,
}

impl WatchStatus {
    /// The part of the status that survives a restart.
    pub fn to_persisted(&self) -> PersistedStatus {
        PersistedStatus {
            last_seen: self.last_seen,
            interval_mean: self.interval_mean,
            interval_std_dev: self.interval_std_dev,
        }
    }

    pub fn is_late(&self) -> bool {
        self.missed_reports > 0
    }
}

#[derive(Debug)]
pub(crate) enum WatchCommand {
    Kick { reply: oneshot::Sender<()> },
    Query { reply: oneshot::Sender<WatchStatus> },
}

/// Per-endpoint actor state.
pub struct WatchActor {
    spec: WatchSpec,
    status: WatchStatus,
    stats: IntervalStats,
    first_deadline: Instant,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn ExpiryNotifier>>,
    rx: mpsc::Receiver<WatchCommand>,
}

impl WatchActor {
    /// Build an actor and the handle used to talk to it.
    ///
    /// With a persisted `last_seen` the first expiry is scheduled for
    /// `last_seen + interval`, which fires immediately if that has already
    /// passed. Otherwise the first expiry is one full interval from now.
    /// `reply_timeout` bounds how long handle calls wait for the actor.
    pub fn create(
        spec: WatchSpec,
        baseline: PersistedStatus,
        clock: Arc<dyn Clock>,
        notifier: Option<Arc<dyn ExpiryNotifier>>,
        reply_timeout: Duration,
    ) -> (WatchHandle, Self) {
        let now = clock.now();
        let (due, first_deadline) = match baseline.last_seen {
            Some(last_seen) => {
                let due = after(last_seen, spec.interval);
                let remaining = (due - now).to_std().unwrap_or(Duration::ZERO);
                (due, Instant::now() + remaining)
            }
            None => (after(now, spec.interval), Instant::now() + spec.interval),
        };

        let status = WatchStatus {
            last_seen: baseline.last_seen,
            interval_mean: baseline.interval_mean,
            interval_std_dev: baseline.interval_std_dev,
            due,
            missed_reports: 0,
        };
        let stats = IntervalStats::resume(baseline.interval_mean, baseline.interval_std_dev);

        // Capacity 1: a sender waits until the actor has taken the previous command.
        let (tx, rx) = mpsc::channel(1);
        let handle = WatchHandle::new(&spec, tx, reply_timeout);
        let actor = Self {
            spec,
            status,
            stats,
            first_deadline,
            clock,
            notifier,
            rx,
        };
        (handle, actor)
    }

    /// Create the actor and run it on its own task.
    pub fn spawn(
        spec: WatchSpec,
        baseline: PersistedStatus,
        clock: Arc<dyn Clock>,
        notifier: Option<Arc<dyn ExpiryNotifier>>,
        reply_timeout: Duration,
    ) -> WatchHandle {
        let (handle, actor) = Self::create(spec, baseline, clock, notifier, reply_timeout);
        tokio::spawn(actor.run());
        handle
    }

    /// The event loop. Returns once every handle has been dropped.
    pub async fn run(mut self) {
        let endpoint = self.spec.endpoint.clone();
        debug!(%endpoint, trigger = %self.spec.trigger, due = %self.status.due, "watch started");

        let timer = tokio::time::sleep_until(self.first_deadline);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = &mut timer => {
                    timer.as_mut().reset(Instant::now() + self.spec.interval);
                    self.expire();
                }
                cmd = self.rx.recv() => match cmd {
                    Some(WatchCommand::Kick { reply }) => {
                        self.kick();
                        // Resetting also discards a firing that elapsed but was
                        // not yet observed, so it is never handled twice.
                        timer.as_mut().reset(Instant::now() + self.spec.interval);
                        let _ = reply.send(());
                    }
                    Some(WatchCommand::Query { reply }) => {
                        let _ = reply.send(self.status.clone());
                    }
                    None => break,
                },
            }
        }

        debug!(%endpoint, "watch stopped");
    }

    fn kick(&mut self) {
        let now = self.clock.now();
        if let Some(last_seen) = self.status.last_seen {
            // A clock stepped backwards counts as a zero gap.
            let measured = (now - last_seen).to_std().unwrap_or(Duration::ZERO);
            self.stats.record(measured);
            self.status.interval_mean = self.stats.mean();
            self.status.interval_std_dev = self.stats.std_dev();
        }

        self.status.last_seen = Some(now);
        self.status.missed_reports = 0;
        self.status.due = after(now, self.spec.interval);

        debug!(endpoint = %self.spec.endpoint, due = %self.status.due, "watch kicked");
    }

    fn expire(&mut self) {
        let fired_at = self.clock.now();
        self.status.due = after(fired_at, self.spec.interval);

        if self.spec.trigger == TriggerKind::Periodic {
            self.status.last_seen = Some(fired_at);
            info!(endpoint = %self.spec.endpoint, "periodic watch fired");
        } else {
            self.status.missed_reports += 1;
            warn!(
                endpoint = %self.spec.endpoint,
                missed = self.status.missed_reports,
                "watch expired without a kick"
            );
        }

        if let Some(notifier) = &self.notifier {
            notifier.notify(ExpiryContext::new(&self.spec.endpoint, &self.status));
        }
    }
}
