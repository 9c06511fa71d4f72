//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save by writing a new file and renaming it over the old one would otherwise
//! detach the watch after the first save.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::ReplayConfig;

/// Watches the configuration file and forwards every configuration that
/// loads and validates. A broken edit is logged and skipped.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ReplayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ReplayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(OsString::from);
        let path = self.path.clone();
        let tx = self.update_tx;
        // Contents of the last forwarded file, so repeated events for one save
        // produce one update.
        let mut last = fs::read_to_string(&path).ok();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if concerns(&event, file_name.as_deref()) => {
                    if let Some(config) = reload(&path, &mut last) {
                        let _ = tx.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` is a write to the watched file.
fn concerns(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|name| Some(name) == file_name))
}

/// Load the file if it changed since the last forwarded version.
fn reload(path: &Path, last: &mut Option<String>) -> Option<ReplayConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Config file unreadable, keeping current configuration");
            return None;
        }
    };
    if last.as_deref() == Some(content.as_str()) {
        return None;
    }

    tracing::info!(path = ?path, "Config file change detected, reloading");
    match parse_config(&content) {
        Ok(config) => {
            *last = Some(content);
            Some(config)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_only_writes_to_the_file_count() {
        let name = Some(std::ffi::OsStr::new("replay.toml"));
        assert!(concerns(&event(EventKind::Modify(ModifyKind::Any), "/etc/replay/replay.toml"), name));
        assert!(concerns(&event(EventKind::Create(CreateKind::File), "/etc/replay/replay.toml"), name));
        assert!(!concerns(&event(EventKind::Modify(ModifyKind::Any), "/etc/replay/other.toml"), name));
        assert!(!concerns(&event(EventKind::Access(notify::event::AccessKind::Any), "/etc/replay/replay.toml"), name));
    }

    #[test]
    fn test_reload_skips_unchanged_and_invalid_files() {
        let path = std::env::temp_dir().join(format!("memento-replay-watch-{}.toml", std::process::id()));
        let valid = "[engine]\nurim_template = \"https://archive.example/m/<datetime>/<urir>\"\n";
        fs::write(&path, valid).unwrap();

        let mut last = None;
        let config = reload(&path, &mut last).unwrap();
        assert_eq!(config.engine.urim_template, "https://archive.example/m/<datetime>/<urir>");
        assert!(reload(&path, &mut last).is_none());

        fs::write(&path, "[engine]\nurim_template = \"https://archive.example/<urir>\"\n").unwrap();
        assert!(reload(&path, &mut last).is_none());
        assert_eq!(last.as_deref(), Some(valid));

        fs::remove_file(&path).unwrap();
        assert!(reload(&path, &mut last).is_none());
    }
}
