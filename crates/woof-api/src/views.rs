//! View types for the status page.
//!
//! These are flattened, display-ready projections of watch status.

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use woof_core::{TriggerKind, format_duration};
use woof_watch::{WatchHandle, WatchStatus};

/// One row of the status table.
#[derive(Debug, Clone)]
pub struct WatchView {
    pub endpoint: String,
    /// Percent-encoded form action for the kick button.
    pub kick_path: String,
    pub trigger: String,
    /// Manual watches render a kick button instead of a label.
    pub kickable_from_page: bool,
    pub interval: String,
    /// Tooltip text with the check-in statistics.
    pub stats: String,
    pub last_seen: String,
    pub due: String,
    pub late: bool,
}

impl WatchView {
    /// Build a row. `status` is `None` when the watch did not answer.
    pub fn from_status<Tz: TimeZone>(
        watch: &WatchHandle,
        status: Option<&WatchStatus>,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        let (stats, last_seen, due, late) = match status {
            Some(s) => (
                format_stats(s.interval_mean, s.interval_std_dev),
                friendly_time(s.last_seen, now, tz),
                friendly_time(Some(s.due), now, tz),
                s.is_late(),
            ),
            None => ("no answer".to_string(), "?".to_string(), "?".to_string(), false),
        };

        Self {
            endpoint: watch.endpoint().to_string(),
            kick_path: kick_path(watch.endpoint()),
            trigger: watch.trigger().to_string(),
            kickable_from_page: watch.trigger() == TriggerKind::Manual,
            interval: format_duration(watch.interval()),
            stats,
            last_seen,
            due,
            late,
        }
    }
}

// ── Format Helpers ──────────────────────────────────────────────

/// URL path that kicks `endpoint`. Each segment is encoded on its own so
/// nested endpoints keep their slashes.
pub fn kick_path(endpoint: &str) -> String {
    let segments: Vec<_> = endpoint.split('/').map(urlencoding::encode).collect();
    format!("/{}", segments.join("/"))
}

pub fn format_stats(mean: Duration, std_dev: Duration) -> String {
    format!(
        "Mean interval: {}\nstddev: {}",
        format_duration(mean),
        format_duration(std_dev)
    )
}

/// Render a timestamp relative to `now`, coarser the further away it is.
///
/// Within half an hour it is a signed duration until `t` (negative for
/// the past), truncated to whole seconds.
pub fn friendly_time<Tz: TimeZone>(t: Option<DateTime<Utc>>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let Some(t) = t else {
        return "-".to_string();
    };

    let until = t - now;
    let distance = until.abs().to_std().unwrap_or(Duration::MAX);
    let local = t.with_timezone(tz);

    if distance <= Duration::from_secs(30 * 60) {
        let whole = Duration::from_secs(distance.as_secs());
        if until < chrono::Duration::zero() && !whole.is_zero() {
            format!("-{}", format_duration(whole))
        } else {
            format_duration(whole)
        }
    } else if distance <= Duration::from_secs(12 * 3600) {
        local.format("%H:%M").to_string()
    } else if distance <= Duration::from_secs(3 * 86_400) {
        local.format("%a %H:%M").to_string()
    } else if distance <= Duration::from_secs(182 * 86_400) {
        local.format("%a, %d %b").to_string()
    } else {
        local.to_rfc3339()
    }
}
