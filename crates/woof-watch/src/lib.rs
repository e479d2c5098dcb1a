//! woof-watch — per-endpoint liveness tracking for woof.
//!
//! Every configured endpoint gets one actor task that owns its status.
//! Callers never touch that status directly; they send commands through
//! a cheap-to-clone [`WatchHandle`] and wait (bounded) for the reply.
//!
//! # Architecture
//!
//! ```text
//! WatchRegistry (sorted by trigger kind, then endpoint)
//!   └── WatchHandle ──mpsc──▶ WatchActor task
//!                               ├── timer: expire → missed_reports / last_seen
//!                               ├── Kick  → IntervalStats (EWMA), rearm
//!                               ├── Query → WatchStatus snapshot
//!                               └── ExpiryNotifier (detached command)
//!
//! SnapshotWriter ── query every handle ──▶ status file
//! ```

pub mod actor;
pub mod clock;
pub mod error;
pub mod handle;
pub mod notify;
pub mod registry;
pub mod snapshot;
pub mod stats;

pub use actor::{WatchActor, WatchSpec, WatchStatus};
pub use clock::{Clock, SystemClock, TokioClock};
pub use error::{WatchError, WatchResult};
pub use handle::WatchHandle;
pub use notify::{CommandNotifier, ExpiryContext, ExpiryNotifier};
pub use registry::WatchRegistry;
pub use snapshot::{SnapshotWriter, collect_status};
pub use stats::IntervalStats;
