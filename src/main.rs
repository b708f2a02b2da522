use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use package_track::config::AppConfig;
use package_track::{MonitorHandle, VersionInfo, VersionMonitor};

#[derive(Parser)]
#[command(name = "package-track")]
#[command(version, about = "Track the version declared in a GitHub repository manifest")]
struct Cli {
    /// Repository as `owner/repo` or a GitHub URL
    repository: Option<String>,

    /// Branch to read the manifest from [default: main]
    #[arg(short, long)]
    branch: Option<String>,

    /// Manifest path inside the repository [default: package.json]
    #[arg(short, long)]
    path: Option<String>,

    /// GitHub token for private repositories and higher rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<i64>,

    /// Poll every N milliseconds; 0 or less checks once and exits
    #[arg(short, long)]
    refresh_interval_ms: Option<i64>,

    /// Branch to try when the manifest is not found (repeatable, in order)
    #[arg(long = "fallback-branch")]
    fallback_branches: Vec<String>,

    /// Report whether the remote version is newer than this one
    #[arg(short, long)]
    current_version: Option<String>,

    /// Config file [default: $XDG_CONFIG_HOME/package-track/config.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each state as a JSON line
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(AppConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::load_default()?,
        };

        if let Some(repository) = self.repository {
            config.tracker.repository = repository;
        }
        if self.branch.is_some() {
            config.tracker.branch = self.branch;
        }
        if self.path.is_some() {
            config.tracker.path = self.path;
        }
        if self.token.is_some() {
            config.tracker.auth_token = self.token;
        }
        if self.timeout_ms.is_some() {
            config.tracker.timeout_ms = self.timeout_ms;
        }
        if let Some(interval) = self.refresh_interval_ms {
            config.monitor.refresh_interval_ms = interval;
        }
        if !self.fallback_branches.is_empty() {
            config.monitor.fallback_branches = self.fallback_branches;
        }
        if self.current_version.is_some() {
            config.monitor.current_version = self.current_version;
            config.monitor.show_update_check = true;
        }

        Ok((config, self.json))
    }
}

fn init_logging(json: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("package_track=warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    guard
}

fn render(info: &VersionInfo, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(info)?);
    }

    if info.is_loading {
        return Ok("Checking version...".to_string());
    }

    let mut line = match (&info.version, &info.error) {
        (Some(version), _) => format!("Version: {}", version),
        (None, Some(error)) => format!("Error: {}", error),
        (None, None) => "Version: unknown".to_string(),
    };

    if let Some(branch) = &info.active_branch {
        line.push_str(&format!(" (branch: {})", branch));
    }
    if let Some(note) = info.fallback_note() {
        line.push_str(&format!(" [{}]", note));
    }
    if let Some(checked) = info.last_checked {
        line.push_str(&format!(" | last checked {}", checked.to_rfc3339()));
    }
    match (info.has_update, &info.latest_version) {
        (Some(true), Some(latest)) => {
            let kind = info.update_type.map(|t| format!("{} ", t)).unwrap_or_default();
            line.push_str(&format!(" | {}update available: {}", kind, latest));
        }
        (Some(false), _) => line.push_str(" | up to date"),
        _ => {}
    }
    if let (Some(_), Some(error)) = (&info.version, &info.error) {
        line.push_str(&format!(" | error: {}", error));
    }

    Ok(line)
}

async fn run(handle: MonitorHandle, json: bool, polling: bool) -> anyhow::Result<bool> {
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    // Monitor finished (one-shot mode)
                    break;
                }
                let info = updates.borrow_and_update().clone();
                println!("{}", render(&info, json)?);
                if !polling && !info.is_loading {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }

    let failed = handle.state().error.is_some();
    handle.shutdown().await;
    Ok(failed)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let guard = init_logging(cli.log_json);
    let (config, json) = cli.into_config()?;

    let polling = config.monitor.refresh_interval().is_some();
    let failed = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let monitor = VersionMonitor::new(&config.tracker, &config.monitor)
                .context("Invalid tracker configuration")?;
            run(monitor.spawn(), json, polling).await
        })?;

    if failed && !polling {
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
