//! Periodic version polling for display surfaces
//!
//! A [`VersionMonitor`] drives one or more trackers (the primary branch plus
//! optional fallback branches) and publishes a [`VersionInfo`] snapshot that a
//! UI or CLI can render.
//!
//! # Modules
//!
//! - [`poller`]: `VersionMonitor` and the `MonitorHandle` of a spawned poll loop
//! - [`state`]: `VersionInfo` snapshot published to consumers

pub mod poller;
pub mod state;

pub use poller::{MonitorHandle, VersionMonitor};
pub use state::VersionInfo;
