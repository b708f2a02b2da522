//! Values produced by the tracker

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::version::semver::UpdateType;

/// Version information retrieved from a repository manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Validated semantic version declared in the manifest
    pub current_version: String,
    /// When the manifest was retrieved (not when it was committed)
    pub last_updated: DateTime<Utc>,
    /// Canonical `owner/repo`
    pub repository: String,
    pub name: Option<String>,
    pub dependencies: Option<IndexMap<String, String>>,
    pub dev_dependencies: Option<IndexMap<String, String>>,
}

/// Outcome of comparing a caller-supplied version against the remote one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckResult {
    pub has_update: bool,
    pub latest_version: String,
    pub current_version: String,
    /// Only set when `has_update` is true and a numeric component increased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_type: Option<UpdateType>,
}
