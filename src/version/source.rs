//! Source trait for retrieving file contents from a repository

#[cfg(test)]
use mockall::automock;

use crate::version::error::TrackerError;

/// Trait for fetching a file from a hosted repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the response body for a file at a given ref
    ///
    /// # Arguments
    /// * `repository` - Canonical `owner/repo`
    /// * `branch` - Branch (or any ref) to read from
    /// * `path` - File path inside the repository
    ///
    /// # Returns
    /// * `Ok(String)` - The raw file, or a JSON envelope wrapping it
    /// * `Err(TrackerError)` - Timeout, HTTP status or transport failure
    async fn fetch_content(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<String, TrackerError>;
}
