//! Repository reference normalization
//!
//! Accepts either a bare `owner/repo` shorthand or a GitHub URL and produces
//! the canonical `owner/repo` form used for API requests and cache keys.

use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::TrackerError;

static GITHUB_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://github\.com/").expect("valid regex"));

/// Normalize a repository reference into `owner/repo`
///
/// Examples:
/// - "owner/repo" -> "owner/repo"
/// - "https://github.com/owner/repo" -> "owner/repo"
/// - "https://github.com/owner/repo.git" -> "owner/repo"
pub fn normalize_repository(input: &str) -> Result<String, TrackerError> {
    let trimmed = input.trim();
    let without_host: &str = &GITHUB_URL_PREFIX.replace(trimmed, "");
    let without_slash = without_host.strip_suffix('/').unwrap_or(without_host);
    let normalized = without_slash.strip_suffix(".git").unwrap_or(without_slash);

    let mut segments = normalized.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) if is_segment(owner) && is_segment(repo) => {
            Ok(normalized.to_string())
        }
        _ => Err(TrackerError::InvalidRepositoryFormat {
            input: input.to_string(),
        }),
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.chars().any(char::is_whitespace)
}
