//! Version retrieval, caching and update comparison for one repository file

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{TrackerConfig, TrackerOptions};
use crate::version::cache::VersionCache;
use crate::version::clock::{Clock, SystemClock};
use crate::version::error::TrackerError;
use crate::version::payload::decode_manifest;
use crate::version::semver::{classify_update, compare, is_valid, parse_version};
use crate::version::source::ContentSource;
use crate::version::sources::GitHubContentSource;
use crate::version::types::{PackageInfo, UpdateCheckResult};

pub struct VersionTracker {
    config: TrackerConfig,
    source: Arc<dyn ContentSource>,
    clock: Arc<dyn Clock>,
    cache: VersionCache,
}

impl VersionTracker {
    /// Creates a tracker that reads from the GitHub contents API
    pub fn new(options: &TrackerOptions) -> Result<Self, TrackerError> {
        let config = TrackerConfig::from_options(options)?;
        let source = Arc::new(GitHubContentSource::new(&config)?);
        Ok(Self::build(config, source, Arc::new(SystemClock)))
    }

    /// Creates a tracker with a custom content source and clock
    pub fn with_source(
        options: &TrackerOptions,
        source: Arc<dyn ContentSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TrackerError> {
        let config = TrackerConfig::from_options(options)?;
        Ok(Self::build(config, source, clock))
    }

    fn build(config: TrackerConfig, source: Arc<dyn ContentSource>, clock: Arc<dyn Clock>) -> Self {
        let cache = VersionCache::new(config.cache_ttl());
        Self {
            config,
            source,
            clock,
            cache,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn shares_source_with(&self, other: &VersionTracker) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }

    pub fn cache_key(&self) -> String {
        VersionCache::cache_key(
            self.config.repository(),
            self.config.branch(),
            self.config.path(),
        )
    }

    /// Returns the version declared in the tracked file
    ///
    /// A cached result younger than the cache TTL is returned without a
    /// network call unless `skip_cache` is set. A failed fetch leaves any
    /// cached entry untouched.
    pub async fn get_version(&self, skip_cache: bool) -> Result<PackageInfo, TrackerError> {
        let key = self.cache_key();

        if !skip_cache {
            if let Some(entry) = self.cache.get_fresh(&key, self.clock.now()) {
                if is_valid(&entry.info.current_version) {
                    debug!("Cache hit for {}", key);
                    return Ok(entry.info);
                }
                warn!(
                    "Evicting cached entry {} with invalid version {:?}",
                    key, entry.info.current_version
                );
                self.cache.remove(&key);
            } else {
                debug!("Cache miss for {}", key);
            }
        }

        let info = self.fetch().await?;
        self.cache.insert(key, info.clone(), info.last_updated);
        Ok(info)
    }

    async fn fetch(&self) -> Result<PackageInfo, TrackerError> {
        let repository = self.config.repository();
        let branch = self.config.branch();
        let path = self.config.path();

        let body = self
            .source
            .fetch_content(repository, branch, path)
            .await
            .inspect_err(|e| warn!("Failed to fetch {}/{}@{}: {}", repository, path, branch, e))?;

        let manifest = decode_manifest(&body).map_err(|reason| TrackerError::InvalidPackageFormat {
            repository: repository.to_string(),
            path: path.to_string(),
            reason,
        })?;

        let version = manifest
            .version
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TrackerError::MissingVersionField {
                repository: repository.to_string(),
                path: path.to_string(),
            })?;

        parse_version(&version)?;

        info!("Fetched version {} for {}/{}@{}", version, repository, path, branch);

        Ok(PackageInfo {
            current_version: version,
            last_updated: self.clock.now(),
            repository: repository.to_string(),
            name: manifest.name,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
        })
    }

    /// Compares `current_version` against a freshly fetched remote version
    pub async fn check_for_updates(
        &self,
        current_version: &str,
    ) -> Result<UpdateCheckResult, TrackerError> {
        parse_version(current_version)?;

        let latest = self
            .get_version(true)
            .await
            .map_err(|e| TrackerError::UpdateCheckFailed {
                source: Box::new(e),
            })?;
        let latest_version = latest.current_version;

        let has_update = compare(&latest_version, current_version)?.is_gt();
        let update_type = if has_update {
            classify_update(current_version, &latest_version)?
        } else {
            None
        };

        Ok(UpdateCheckResult {
            has_update,
            latest_version,
            current_version: current_version.to_string(),
            update_type,
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
