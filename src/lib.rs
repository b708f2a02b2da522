pub mod config;
pub mod monitor;
pub mod version;

pub use config::{AppConfig, MonitorOptions, TrackerConfig, TrackerOptions};
pub use monitor::{MonitorHandle, VersionInfo, VersionMonitor};
pub use version::error::TrackerError;
pub use version::semver::UpdateType;
pub use version::tracker::VersionTracker;
pub use version::types::{PackageInfo, UpdateCheckResult};
