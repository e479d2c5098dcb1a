//! Shared types used across woof crates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How a watch expects to be fed.
///
/// The variant order is the display order: `Post < Manual < Periodic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TriggerKind {
    /// Kicked by an API call (`curl -X POST`), answered with a plain ack.
    #[default]
    Post,
    /// Kicked from the status page button, answered with a redirect.
    Manual,
    /// Never kicked; the elapsed interval itself is the expected signal.
    Periodic,
}

impl TriggerKind {
    /// Parse a configuration value, case-insensitively.
    ///
    /// Anything unrecognized becomes `Manual`.
    pub fn from_config_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "post" => TriggerKind::Post,
            "manual" => TriggerKind::Manual,
            "periodic" => TriggerKind::Periodic,
            _ => TriggerKind::Manual,
        }
    }

    /// Lowercase name as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Post => "post",
            TriggerKind::Manual => "manual",
            TriggerKind::Periodic => "periodic",
        }
    }

    /// Whether an external request may kick this watch.
    pub fn accepts_kicks(&self) -> bool {
        !matches!(self, TriggerKind::Periodic)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriggerKind::Post => "Post",
            TriggerKind::Manual => "Manual",
            TriggerKind::Periodic => "Periodic",
        };
        f.write_str(label)
    }
}

impl Serialize for TriggerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TriggerKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TriggerKind::from_config_str(&raw))
    }
}
