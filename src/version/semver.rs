use std::cmp::Ordering;

use semver::Version;
use serde::Serialize;

use crate::version::error::TrackerError;

/// Which numeric component of a version increased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Major,
    Minor,
    Patch,
}

impl UpdateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Major => "major",
            UpdateType::Minor => "minor",
            UpdateType::Patch => "patch",
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a strict semantic version (`major.minor.patch[-pre][+build]`).
///
/// Unlike the lenient parsing used for tags, partial versions ("1.2") and
/// `v` prefixes are rejected.
pub fn parse_version(version: &str) -> Result<Version, TrackerError> {
    Version::parse(version).map_err(|_| TrackerError::invalid_version(version))
}

pub fn is_valid(version: &str) -> bool {
    Version::parse(version).is_ok()
}

/// Compare two versions by semver precedence.
///
/// Build metadata is ignored, and a version without pre-release is greater
/// than the same version with one.
pub fn compare(a: &str, b: &str) -> Result<Ordering, TrackerError> {
    let a = parse_version(a)?;
    let b = parse_version(b)?;
    Ok(compare_parsed(&a, &b))
}

pub fn major(version: &str) -> Result<u64, TrackerError> {
    parse_version(version).map(|v| v.major)
}

pub fn minor(version: &str) -> Result<u64, TrackerError> {
    parse_version(version).map(|v| v.minor)
}

pub fn patch(version: &str) -> Result<u64, TrackerError> {
    parse_version(version).map(|v| v.patch)
}

/// Classify the increase from `current` to `latest`.
///
/// Returns `None` when `latest` is not newer, or when the two differ only in
/// pre-release or build metadata.
pub fn classify_update(current: &str, latest: &str) -> Result<Option<UpdateType>, TrackerError> {
    let current = parse_version(current)?;
    let latest = parse_version(latest)?;

    if compare_parsed(&latest, &current) != Ordering::Greater {
        return Ok(None);
    }

    let update_type = if latest.major != current.major {
        Some(UpdateType::Major)
    } else if latest.minor != current.minor {
        Some(UpdateType::Minor)
    } else if latest.patch != current.patch {
        Some(UpdateType::Patch)
    } else {
        None
    };

    Ok(update_type)
}

fn compare_parsed(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}
