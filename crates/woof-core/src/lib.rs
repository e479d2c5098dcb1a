//! woof-core — shared types and file formats for the woof heartbeat monitor.
//!
//! Holds everything that is pure data: trigger kinds, the duration
//! grammar used in configuration and status files, the configuration
//! file itself, and the persisted status snapshot format.
//!
//! # Files
//!
//! | File | Format | Written by |
//! |---|---|---|
//! | configuration | TOML (or JSON by `.json` extension) | operator |
//! | status | JSON, endpoint → last seen + interval statistics | `woofd` on SIGHUP |

pub mod config;
pub mod duration;
pub mod error;
pub mod status;
pub mod types;

pub use config::{ConfigFile, ServerConfig, WatchConfig};
pub use duration::{format_duration, parse_duration};
pub use error::{CoreError, CoreResult};
pub use status::{PersistedStatus, StatusFile};
pub use types::TriggerKind;
