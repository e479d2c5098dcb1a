//! The ordered set of watches.

use std::sync::Arc;

use tracing::{debug, info};
use woof_core::{ConfigFile, StatusFile};

use crate::actor::{WatchActor, WatchSpec};
use crate::clock::Clock;
use crate::error::{WatchError, WatchResult};
use crate::handle::WatchHandle;
use crate::notify::{CommandNotifier, ExpiryNotifier};

/// All watches, kept sorted by trigger kind and then endpoint.
///
/// That order drives both the status page and snapshot iteration. The
/// sort is stable, so entries with equal keys keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    watches: Vec<WatchHandle>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn one actor per configured watch.
    ///
    /// `baseline` seeds each actor with its persisted status, if any.
    /// Must be called from within a tokio runtime.
    pub fn spawn_from_config(
        config: &ConfigFile,
        baseline: &StatusFile,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut registry = Self::new();
        for (endpoint, watch_config) in &config.watches {
            let spec = WatchSpec::from_config(endpoint, watch_config);
            let notifier = CommandNotifier::new(&config.server.exec_args, &watch_config.on_expiry)
                .map(|n| Arc::new(n) as Arc<dyn ExpiryNotifier>);
            let persisted = baseline.get(endpoint).cloned().unwrap_or_default();

            debug!(
                %endpoint,
                trigger = %spec.trigger,
                interval = ?spec.interval,
                resumed = persisted.last_seen.is_some(),
                has_action = notifier.is_some(),
                "spawning watch"
            );
            let handle = WatchActor::spawn(
                spec,
                persisted,
                Arc::clone(&clock),
                notifier,
                config.server.query_timeout,
            );
            registry.insert(handle);
        }
        info!(count = registry.len(), "watches started");
        registry
    }

    pub fn insert(&mut self, watch: WatchHandle) {
        self.watches.push(watch);
        self.watches
            .sort_by(|a, b| (a.trigger(), a.endpoint()).cmp(&(b.trigger(), b.endpoint())));
    }

    pub fn get(&self, endpoint: &str) -> Option<&WatchHandle> {
        self.watches.iter().find(|w| w.endpoint() == endpoint)
    }

    /// Like [`get`](Self::get), but a miss is a [`WatchError::NotFound`].
    pub fn dispatch(&self, endpoint: &str) -> WatchResult<&WatchHandle> {
        self.get(endpoint)
            .ok_or_else(|| WatchError::NotFound(endpoint.to_string()))
    }

    /// Watches in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, WatchHandle> {
        self.watches.iter()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

impl<'a> IntoIterator for &'a WatchRegistry {
    type Item = &'a WatchHandle;
    type IntoIter = std::slice::Iter<'a, WatchHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use woof_core::{PersistedStatus, TriggerKind, WatchConfig};

    use crate::clock::TokioClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(TokioClock::starting_at(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn watch(endpoint: &str, trigger: TriggerKind) -> WatchHandle {
        let spec = WatchSpec {
            endpoint: endpoint.to_string(),
            trigger,
            interval: Duration::from_secs(30),
        };
        WatchActor::spawn(
            spec,
            PersistedStatus::default(),
            clock(),
            None,
            Duration::from_secs(1),
        )
    }

    fn order(registry: &WatchRegistry) -> Vec<(TriggerKind, String)> {
        registry
            .iter()
            .map(|w| (w.trigger(), w.endpoint().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn groups_by_trigger_then_endpoint() {
        let mut registry = WatchRegistry::new();
        registry.insert(watch("nightly", TriggerKind::Periodic));
        registry.insert(watch("zeta", TriggerKind::Post));
        registry.insert(watch("button", TriggerKind::Manual));
        registry.insert(watch("alpha", TriggerKind::Post));

        assert_eq!(
            order(&registry),
            vec![
                (TriggerKind::Post, "alpha".to_string()),
                (TriggerKind::Post, "zeta".to_string()),
                (TriggerKind::Manual, "button".to_string()),
                (TriggerKind::Periodic, "nightly".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn equal_keys_keep_insertion_order() {
        let mut registry = WatchRegistry::new();
        let first = watch("dup", TriggerKind::Post);
        let second = WatchActor::spawn(
            WatchSpec {
                endpoint: "dup".to_string(),
                trigger: TriggerKind::Post,
                interval: Duration::from_secs(99),
            },
            PersistedStatus::default(),
            clock(),
            None,
            Duration::from_secs(1),
        );
        registry.insert(first);
        registry.insert(watch("a", TriggerKind::Manual));
        registry.insert(second);

        let intervals: Vec<u64> = registry
            .iter()
            .filter(|w| w.endpoint() == "dup")
            .map(|w| w.interval().as_secs())
            .collect();
        assert_eq!(intervals, vec![30, 99]);
    }

    #[tokio::test]
    async fn dispatch_finds_or_reports_missing() {
        let mut registry = WatchRegistry::new();
        registry.insert(watch("api", TriggerKind::Post));

        assert_eq!(registry.dispatch("api").unwrap().endpoint(), "api");
        assert!(matches!(
            registry.dispatch("nope"),
            Err(WatchError::NotFound(ep)) if ep == "nope"
        ));
        assert!(registry.get("nope").is_none());
    }

    #[tokio::test]
    async fn spawn_from_config_merges_baseline() {
        let config = ConfigFile::from_toml_str(
            r#"
[watches.cron]
trigger = "periodic"
interval = "1h"

[watches.api]
trigger = "post"
"#,
        )
        .unwrap();

        let mut baseline = StatusFile::new();
        baseline.insert(
            "api".to_string(),
            PersistedStatus {
                last_seen: Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 50).unwrap()),
                interval_mean: Duration::from_secs(12),
                interval_std_dev: Duration::from_secs(3),
            },
        );
        baseline.insert("retired".to_string(), PersistedStatus::default());

        let registry = WatchRegistry::spawn_from_config(&config, &baseline, clock());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().next().unwrap().endpoint(), "api");

        let api = registry.dispatch("api").unwrap().query().await.unwrap();
        assert_eq!(api.interval_mean, Duration::from_secs(12));
        assert_eq!(
            api.due,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 20).unwrap()
        );

        let cron = registry.dispatch("cron").unwrap();
        assert_eq!(cron.interval(), Duration::from_secs(3600));
        assert_eq!(cron.query().await.unwrap().last_seen, None);
    }
}
