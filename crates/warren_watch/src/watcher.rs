//! Single-file change watcher
//!
//! Watches the directory containing one configuration file, so the
//! not-yet-created case works. The `notify` callback thread only enqueues
//! into a channel; all filtering, debouncing and signaling happens in
//! [`ConfigWatcher::poll`] on the cooperative main loop.

use crossbeam_channel::Receiver;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

/// Watcher setup errors
#[derive(Debug, Error)]
pub enum WatchError {
    /// The OS watcher could not be created
    #[error("failed to create file watcher: {0}")]
    Create(String),
    /// The directory could not be watched
    #[error("failed to watch {path:?}: {reason}")]
    Watch { path: PathBuf, reason: String },
}

/// Change notification for the watched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileEvent {
    /// The watched file changed on disk and the settle delay elapsed
    FileChanged(PathBuf),
}

struct WatchedFile {
    path: PathBuf,
    dir: PathBuf,
    /// Last-modified timestamp of the previous accepted event
    last_mtime: Option<SystemTime>,
}

/// Watches a single configuration file for changes.
///
/// An event is accepted only when the file's last-modified timestamp
/// strictly advanced since the previous accepted event, and is signaled
/// only after a short settle delay so a file is never read mid-write.
pub struct ConfigWatcher {
    watcher: Option<RecommendedWatcher>,
    rx: Option<Receiver<notify::Result<Event>>>,
    watched: Option<WatchedFile>,
    settle_delay: Duration,
    pending_since: Option<Instant>,
    restart_attempted: bool,
}

impl ConfigWatcher {
    /// Create an idle watcher
    pub fn new() -> Self {
        Self {
            watcher: None,
            rx: None,
            watched: None,
            settle_delay: Duration::from_millis(100),
            pending_since: None,
            restart_attempted: false,
        }
    }

    /// Start watching a file path. Any previous watch is released first.
    pub fn start_watching(&mut self, path: impl AsRef<Path>) -> bool {
        self.stop_watching();
        let path = path.as_ref().to_path_buf();
        match self.try_start(&path) {
            Ok(()) => {
                log::info!("watching {:?} for changes", path);
                true
            }
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    fn try_start(&mut self, path: &Path) -> Result<(), WatchError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |result| {
            let _ = tx.send(result);
        })
        .map_err(|e| WatchError::Create(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch {
                path: dir.clone(),
                reason: e.to_string(),
            })?;

        let last_mtime = std::fs::metadata(path).and_then(|m| m.modified()).ok();

        self.watcher = Some(watcher);
        self.rx = Some(rx);
        self.watched = Some(WatchedFile {
            path: path.to_path_buf(),
            dir,
            last_mtime,
        });
        self.pending_since = None;
        Ok(())
    }

    /// Stop watching and release OS resources. Idempotent.
    pub fn stop_watching(&mut self) {
        if let (Some(mut watcher), Some(watched)) = (self.watcher.take(), self.watched.take()) {
            let _ = watcher.unwatch(&watched.dir);
            log::debug!("stopped watching {:?}", watched.path);
        }
        self.rx = None;
        self.pending_since = None;
    }

    /// Drain pending OS events and return a change notification once one
    /// has settled. Call once per tick from the main loop.
    pub fn poll(&mut self) -> Option<ConfigFileEvent> {
        let mut relevant = false;
        let mut failed = false;

        if let Some(rx) = &self.rx {
            let results: Vec<notify::Result<Event>> = rx.try_iter().collect();
            for result in results {
                match result {
                    Ok(event) => {
                        if self.is_relevant(&event) {
                            relevant = true;
                        }
                    }
                    Err(e) => {
                        log::warn!("file watcher error: {}", e);
                        failed = true;
                    }
                }
            }
        }

        if relevant {
            self.accept_if_advanced();
        }
        if failed {
            self.restart();
        }

        if let Some(since) = self.pending_since {
            if since.elapsed() >= self.settle_delay {
                self.pending_since = None;
                if let Some(watched) = &self.watched {
                    return Some(ConfigFileEvent::FileChanged(watched.path.clone()));
                }
            }
        }
        None
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
        ) {
            return false;
        }
        let Some(watched) = &self.watched else {
            return false;
        };
        event
            .paths
            .iter()
            .any(|p| p.file_name() == watched.path.file_name())
    }

    /// Arm a pending change if the file's mtime strictly advanced since the
    /// previous accepted event.
    fn accept_if_advanced(&mut self) {
        let Some(watched) = &mut self.watched else {
            return;
        };
        let Ok(mtime) = std::fs::metadata(&watched.path).and_then(|m| m.modified()) else {
            return;
        };
        if let Some(last) = watched.last_mtime {
            if mtime <= last {
                return;
            }
        }
        watched.last_mtime = Some(mtime);
        self.pending_since = Some(Instant::now());
        self.restart_attempted = false;
    }

    /// One autonomous restart attempt after a watcher-level error; a second
    /// failure degrades to no hot-reload until re-armed explicitly.
    fn restart(&mut self) {
        if self.restart_attempted {
            log::error!("file watcher failed again; hot-reload disabled until re-armed");
            self.stop_watching();
            return;
        }
        self.restart_attempted = true;
        let Some(path) = self.watched.as_ref().map(|w| w.path.clone()) else {
            return;
        };
        log::warn!("restarting file watcher for {:?}", path);
        if !self.start_watching(&path) {
            log::error!("file watcher restart failed for {:?}", path);
        }
    }

    /// Whether a watch is currently armed
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// The watched file path, if any
    pub fn watched_path(&self) -> Option<&Path> {
        self.watched.as_ref().map(|w| w.path.as_path())
    }

    /// Change the settle delay applied before a change is signaled
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::new()
    }
}
