//! Persisted status snapshot format.
//!
//! A JSON object keyed by endpoint. Only the baseline needed to resume
//! tracking is stored: when the endpoint was last seen and the interval
//! statistics. The next due time and the missed-report counter are
//! recomputed at load.
//!
//! ```json
//! {
//!   "backup": {
//!     "LastSeen": "2024-05-01T10:00:00Z",
//!     "IntervalMean": "24h0m3s",
//!     "IntervalStdDev": "1m2s"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration;
use crate::error::{CoreError, CoreResult};

/// Persisted state of a single watch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistedStatus {
    #[serde(default, with = "last_seen")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, with = "duration::text", skip_serializing_if = "Duration::is_zero")]
    pub interval_mean: Duration,
    #[serde(default, with = "duration::text", skip_serializing_if = "Duration::is_zero")]
    pub interval_std_dev: Duration,
}

/// Endpoint → persisted status, ordered by endpoint.
pub type StatusFile = BTreeMap<String, PersistedStatus>;

/// Read a status file.
pub fn load_status(path: &Path) -> CoreResult<StatusFile> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let status: StatusFile = serde_json::from_str(&content).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), entries = status.len(), "status file loaded");
    Ok(status)
}

/// Replace the status file with `status`.
///
/// Writes a sibling `.tmp` file and renames it over the target, so a
/// reader never sees a half-written file.
pub fn write_status(path: &Path, status: &StatusFile) -> CoreResult<()> {
    let mut body = serde_json::to_vec_pretty(status)?;
    body.push(b'\n');

    let tmp_path = tmp_sibling(path);
    std::fs::write(&tmp_path, &body).map_err(|source| CoreError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| CoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// RFC 3339 timestamps; the zero time `0001-01-01T00:00:00Z` means "never".
mod last_seen {
    use chrono::{DateTime, Datelike, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NEVER: &str = "0001-01-01T00:00:00Z";

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_str(NEVER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)?;
        let utc = parsed.with_timezone(&Utc);
        if utc.year() <= 1 {
            return Ok(None);
        }
        Ok(Some(utc))
    }
}
