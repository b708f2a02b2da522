//! Polling loop around one or more version trackers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{MonitorOptions, TrackerConfig, TrackerOptions};
use crate::monitor::state::VersionInfo;
use crate::version::clock::{Clock, SystemClock};
use crate::version::error::TrackerError;
use crate::version::semver::is_valid;
use crate::version::source::ContentSource;
use crate::version::sources::GitHubContentSource;
use crate::version::tracker::VersionTracker;
use crate::version::types::PackageInfo;

type VersionCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Resolves the tracked version on demand or on an interval
///
/// Trackers are tried in order; a tracker is skipped only when its file is
/// not found, so the first entry is the primary branch and the rest are
/// fallbacks.
pub struct VersionMonitor {
    trackers: Vec<VersionTracker>,
    update_baseline: Option<String>,
    refresh_interval: Option<Duration>,
    on_change: Option<VersionCallback>,
    state: watch::Sender<VersionInfo>,
}

impl VersionMonitor {
    /// Builds trackers for the primary branch and each fallback branch
    pub fn new(
        tracker_options: &TrackerOptions,
        monitor_options: &MonitorOptions,
    ) -> Result<Self, TrackerError> {
        let config = TrackerConfig::from_options(tracker_options)?;
        let source: Arc<dyn ContentSource> = Arc::new(GitHubContentSource::new(&config)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let mut branches = vec![config.branch().to_string()];
        let mut trackers = vec![VersionTracker::with_source(
            tracker_options,
            source.clone(),
            clock.clone(),
        )?];

        for branch in &monitor_options.fallback_branches {
            let branch = branch.trim();
            if branch.is_empty() || branches.iter().any(|b| b == branch) {
                continue;
            }
            let options = tracker_options.clone().branch(branch);
            trackers.push(VersionTracker::with_source(
                &options,
                source.clone(),
                clock.clone(),
            )?);
            branches.push(branch.to_string());
        }

        Self::with_trackers(trackers, monitor_options)
    }

    /// Builds a monitor over pre-built trackers (primary first)
    ///
    /// `fallback_branches` in `monitor_options` is ignored here.
    pub fn with_trackers(
        trackers: Vec<VersionTracker>,
        monitor_options: &MonitorOptions,
    ) -> Result<Self, TrackerError> {
        if trackers.is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                field: "trackers",
                reason: "at least one tracker is required".to_string(),
            });
        }

        let update_baseline = if monitor_options.show_update_check {
            match monitor_options.current_version.as_deref().map(str::trim) {
                Some(version) if is_valid(version) => Some(version.to_string()),
                Some(version) => {
                    return Err(TrackerError::InvalidConfiguration {
                        field: "currentVersion",
                        reason: format!("{:?} is not a semantic version", version),
                    });
                }
                None => {
                    return Err(TrackerError::InvalidConfiguration {
                        field: "currentVersion",
                        reason: "required when update checks are enabled".to_string(),
                    });
                }
            }
        } else {
            None
        };

        let (state, _) = watch::channel(VersionInfo::default());

        Ok(Self {
            trackers,
            update_baseline,
            refresh_interval: monitor_options.refresh_interval(),
            on_change: None,
            state,
        })
    }

    /// Registers a callback invoked after a refresh that resolved a new version
    pub fn on_version_change(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> VersionInfo {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VersionInfo> {
        self.state.subscribe()
    }

    /// Runs one refresh cycle and publishes the result
    pub async fn refresh(&self) -> VersionInfo {
        self.state.send_modify(|state| state.is_loading = true);

        let previous = self.state();
        let next = match self.resolve().await {
            Ok((tracker, package, used_fallback)) => {
                self.notify_if_changed(previous.version.as_deref(), &package.current_version);
                self.resolved_state(tracker, package, used_fallback).await
            }
            Err(e) => {
                warn!("Version refresh failed: {}", e);
                VersionInfo {
                    error: Some(e.to_string()),
                    is_loading: false,
                    ..previous
                }
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    async fn resolve(&self) -> Result<(&VersionTracker, PackageInfo, bool), TrackerError> {
        let mut trackers = self.trackers.iter().enumerate().peekable();

        while let Some((index, tracker)) = trackers.next() {
            match tracker.get_version(false).await {
                Ok(package) => {
                    if index > 0 {
                        info!(
                            "Resolved {} from fallback branch {}",
                            package.repository,
                            tracker.config().branch()
                        );
                    }
                    return Ok((tracker, package, index > 0));
                }
                Err(e) if e.is_not_found() && trackers.peek().is_some() => {
                    debug!("{}; trying next branch", e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(TrackerError::InvalidConfiguration {
            field: "trackers",
            reason: "at least one tracker is required".to_string(),
        })
    }

    async fn resolved_state(
        &self,
        tracker: &VersionTracker,
        package: PackageInfo,
        used_fallback: bool,
    ) -> VersionInfo {
        let mut next = VersionInfo {
            version: Some(package.current_version),
            last_checked: Some(package.last_updated),
            error: None,
            active_branch: Some(tracker.config().branch().to_string()),
            used_fallback,
            is_loading: false,
            has_update: None,
            latest_version: None,
            update_type: None,
        };

        if let Some(baseline) = &self.update_baseline {
            match tracker.check_for_updates(baseline).await {
                Ok(result) => {
                    next.has_update = Some(result.has_update);
                    next.latest_version = Some(result.latest_version);
                    next.update_type = result.update_type;
                }
                Err(e) => {
                    warn!("Update check failed: {}", e);
                    next.error = Some(e.to_string());
                }
            }
        }

        next
    }

    fn notify_if_changed(&self, previous: Option<&str>, current: &str) {
        if previous == Some(current) {
            return;
        }
        if let Some(callback) = &self.on_change {
            callback(current);
        }
    }

    /// Starts polling in the background
    ///
    /// The first refresh runs immediately. With a refresh interval, the next
    /// refresh starts one interval after the previous one completed, so
    /// refreshes never overlap. Without one, the task ends after the first
    /// refresh.
    pub fn spawn(self) -> MonitorHandle {
        let state = self.subscribe();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = self.refresh() => {}
                    _ = &mut shutdown_rx => break,
                }

                let Some(interval) = self.refresh_interval else {
                    break;
                };

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut shutdown_rx => break,
                }
            }
            debug!("Version monitor stopped");
        });

        MonitorHandle {
            state,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle to a spawned [`VersionMonitor`]
///
/// Dropping the handle aborts the polling task.
pub struct MonitorHandle {
    state: watch::Receiver<VersionInfo>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn state(&self) -> VersionInfo {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VersionInfo> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the polling task to end on its own (one-shot mode)
    pub async fn wait(mut self) -> VersionInfo {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.state()
    }

    /// Stops polling, cancelling any in-flight refresh
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
