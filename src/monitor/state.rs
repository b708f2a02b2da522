use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::version::semver::UpdateType;

/// Snapshot of what a display should show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Last successfully resolved version
    pub version: Option<String>,
    /// Retrieval time of `version`
    pub last_checked: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared on success
    pub error: Option<String>,
    /// Branch the version was read from
    pub active_branch: Option<String>,
    pub used_fallback: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_update: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_type: Option<UpdateType>,
}

impl VersionInfo {
    /// Describes the fallback branch in use, if any
    pub fn fallback_note(&self) -> Option<String> {
        match (&self.active_branch, self.used_fallback) {
            (Some(branch), true) => Some(format!("using fallback branch '{}'", branch)),
            _ => None,
        }
    }
}
