//! Configuration manager
//!
//! Orchestrates load, validate, apply and hot-reload over one
//! configuration slot. The fallback configuration is injected at
//! construction; the manager guarantees a valid configuration is applied
//! at all times once anything has been requested of it.

use crate::events::EnvironmentEvent;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use warren_config::{loader, validator};
use warren_event::EventQueue;
use warren_rules::prelude::*;
use warren_watch::{ConfigFileEvent, ConfigWatcher};

/// Lifecycle state of the configuration slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    /// Nothing loaded yet
    Unloaded,
    /// A configuration is applied
    Loaded,
    /// A reload is being performed
    Reloading,
    /// A load failed before anything was applied; the fallback is active
    ErrorFallback,
}

/// Owns the authoritative configuration and drives hot-reload.
pub struct ConfigurationManager {
    engine: RulesEngine,
    watcher: ConfigWatcher,
    fallback: EnvironmentConfiguration,
    config_path: Option<PathBuf>,
    state: ConfigState,
    hot_reload_enabled: bool,
    /// Delay between a file-change signal and the actual re-read
    reload_settle: Duration,
    /// Deadline for a scheduled reload; a newer change supersedes it
    pending_reload_at: Option<Instant>,
    has_applied: bool,
    events: EventQueue<EnvironmentEvent>,
}

impl ConfigurationManager {
    /// Create a manager with the built-in default fallback
    pub fn new() -> Self {
        Self::with_fallback(EnvironmentConfiguration::default())
    }

    /// Create a manager with an explicit fallback configuration
    pub fn with_fallback(fallback: EnvironmentConfiguration) -> Self {
        Self {
            engine: RulesEngine::new(),
            watcher: ConfigWatcher::new(),
            fallback,
            config_path: None,
            state: ConfigState::Unloaded,
            hot_reload_enabled: true,
            reload_settle: Duration::from_millis(500),
            pending_reload_at: None,
            has_applied: false,
            events: EventQueue::new(),
        }
    }

    /// Load a configuration from disk and apply it.
    ///
    /// A document that cannot be used is replaced by the fallback; this
    /// never fails.
    pub fn load_configuration(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut config = loader::load(&path);
        if !config.is_valid() {
            log::warn!("loaded configuration is invalid; applying fallback");
            config = self.fallback.clone();
        }
        self.config_path = Some(path);
        self.apply(config, false);
        self.state = ConfigState::Loaded;
        if self.hot_reload_enabled {
            self.arm_watcher();
        }
    }

    /// Drive the watcher and any scheduled reload. Call once per tick.
    pub fn update(&mut self, now: Instant) {
        if let Some(ConfigFileEvent::FileChanged(path)) = self.watcher.poll() {
            if self.hot_reload_enabled {
                log::info!("configuration file changed: {:?}", path);
                // A newer change supersedes a pending reload
                self.pending_reload_at = Some(now + self.reload_settle);
            }
        }
        if let Some(deadline) = self.pending_reload_at {
            if now >= deadline {
                self.pending_reload_at = None;
                self.reload_configuration();
            }
        }
    }

    /// Re-read the configured path and swap the configuration if the
    /// candidate is usable; otherwise keep the previously-applied one.
    pub fn reload_configuration(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.handle_reload_failure("no configuration path set; cannot reload".to_string());
            return;
        };
        self.state = ConfigState::Reloading;

        let candidate = loader::load(&path);
        if !candidate.is_valid() {
            self.handle_reload_failure(format!(
                "reloaded configuration from {:?} is invalid; keeping previous",
                path
            ));
            return;
        }

        self.check_reload_compatibility(&candidate);
        self.apply(candidate, true);
        self.state = ConfigState::Loaded;
    }

    /// Reload immediately, discarding any scheduled reload.
    pub fn force_reload(&mut self) {
        self.pending_reload_at = None;
        self.reload_configuration();
    }

    /// Enable or disable hot-reload. Disabling releases the watch;
    /// re-enabling re-arms it for the configured path.
    pub fn set_hot_reload_enabled(&mut self, enabled: bool) {
        self.hot_reload_enabled = enabled;
        if enabled {
            if self.config_path.is_some() {
                self.arm_watcher();
            }
        } else {
            self.watcher.stop_watching();
            self.pending_reload_at = None;
        }
    }

    /// Change the watched configuration path and re-arm the watcher.
    ///
    /// The new file is not loaded until the next reload.
    pub fn set_config_path(&mut self, path: impl AsRef<Path>) {
        self.config_path = Some(path.as_ref().to_path_buf());
        if self.hot_reload_enabled {
            self.arm_watcher();
        }
    }

    /// Change the settle delay between a file change and the re-read
    pub fn set_reload_settle(&mut self, settle: Duration) {
        self.reload_settle = settle;
    }

    /// Validate the active configuration (tooling entry point)
    pub fn validate_current(&self) -> validator::ValidationResult {
        validator::validate(self.engine.configuration())
    }

    /// Drain pending notifications, in emit order
    pub fn take_events(&mut self) -> Vec<EnvironmentEvent> {
        self.events.drain()
    }

    /// The active configuration
    pub fn current_configuration(&self) -> &EnvironmentConfiguration {
        self.engine.configuration()
    }

    /// The rules engine fed by this manager
    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    /// Mutable access to the rules engine (live rule editing)
    pub fn engine_mut(&mut self) -> &mut RulesEngine {
        &mut self.engine
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConfigState {
        self.state
    }

    /// Whether hot-reload is enabled
    pub fn hot_reload_enabled(&self) -> bool {
        self.hot_reload_enabled
    }

    /// The configured document path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn apply(&mut self, config: EnvironmentConfiguration, reloaded: bool) {
        self.engine.load_configuration(config);
        self.has_applied = true;
        let snapshot = self.engine.configuration().clone();
        if reloaded {
            self.events
                .push(EnvironmentEvent::ConfigurationReloaded(snapshot.clone()));
        } else {
            self.events
                .push(EnvironmentEvent::ConfigurationLoaded(snapshot.clone()));
        }
        self.events.push(EnvironmentEvent::RulesUpdated(snapshot));
    }

    /// Heuristic warnings for configuration swaps that are likely to be
    /// visually jarring; never blocks the reload.
    fn check_reload_compatibility(&self, candidate: &EnvironmentConfiguration) {
        let old = self.engine.configuration().corridors.generation_distance;
        let new = candidate.corridors.generation_distance;
        if old > 0.0 {
            let ratio = new / old;
            if !(0.5..=2.0).contains(&ratio) {
                log::warn!(
                    "generation distance changed {:.1}x across reload ({} -> {}); corridors may pop",
                    ratio,
                    old,
                    new
                );
            }
        }
        if candidate.performance.throttle_threshold < 30.0 {
            log::warn!(
                "reloaded throttle threshold {} is unusually low",
                candidate.performance.throttle_threshold
            );
        }
    }

    fn arm_watcher(&mut self) {
        if let Some(path) = &self.config_path {
            if !self.watcher.start_watching(path) {
                log::warn!("hot-reload unavailable for {:?}", path);
            }
        }
    }

    /// Record a reload failure. The previously-applied configuration stays
    /// active; if nothing was ever applied, the fallback is applied so the
    /// system is never without a valid configuration.
    fn handle_reload_failure(&mut self, message: String) {
        log::warn!("{}", message);
        self.events
            .push(EnvironmentEvent::ConfigurationError(message));
        if self.has_applied {
            self.state = ConfigState::Loaded;
        } else {
            let fallback = self.fallback.clone();
            self.apply(fallback, false);
            self.state = ConfigState::ErrorFallback;
        }
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const VALID_DOC: &str = "\
corridors:
  generation_distance: 40
  cleanup_distance: 90

rules:
  - name: sprint_surge
    priority: 2
    cooldown: 5
    conditions:
      - type: PlayerSpeed operator: GreaterThan value: 6.5
    actions:
      - action: AdjustLighting target: neon
";

    fn event_names(manager: &mut ConfigurationManager) -> Vec<&'static str> {
        manager.take_events().iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_load_applies_and_notifies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("environment.cfg");
        fs::write(&path, VALID_DOC).unwrap();

        let mut manager = ConfigurationManager::new();
        manager.load_configuration(&path);

        assert_eq!(manager.state(), ConfigState::Loaded);
        assert_eq!(
            manager.current_configuration().corridors.generation_distance,
            40.0
        );
        assert_eq!(manager.engine().rule_count(), 1);
        assert_eq!(
            event_names(&mut manager),
            vec!["ConfigurationLoaded", "RulesUpdated"]
        );
    }

    #[test]
    fn test_missing_file_applies_defaults() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigurationManager::new();
        manager.load_configuration(dir.path().join("nope.cfg"));

        assert_eq!(manager.state(), ConfigState::Loaded);
        assert!(manager.current_configuration().is_valid());
        assert_eq!(manager.engine().rule_count(), 0);
    }

    #[test]
    fn test_fallback_applied_when_nothing_ever_loaded() {
        let mut fallback = EnvironmentConfiguration::default();
        fallback.corridors.generation_distance = 25.0;
        fallback.corridors.cleanup_distance = 75.0;

        // A reload failure before anything was applied must install the
        // injected fallback rather than leave the slot empty
        let mut manager = ConfigurationManager::with_fallback(fallback);
        manager.force_reload();

        assert_eq!(manager.state(), ConfigState::ErrorFallback);
        assert_eq!(
            manager.current_configuration().corridors.generation_distance,
            25.0
        );
        assert_eq!(
            event_names(&mut manager),
            vec!["ConfigurationError", "ConfigurationLoaded", "RulesUpdated"]
        );
    }

    #[test]
    fn test_force_reload_picks_up_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("environment.cfg");
        fs::write(&path, VALID_DOC).unwrap();

        let mut manager = ConfigurationManager::new();
        manager.set_hot_reload_enabled(false);
        manager.load_configuration(&path);
        manager.take_events();

        fs::write(
            &path,
            "corridors:\n  generation_distance: 45\n  cleanup_distance: 95\n",
        )
        .unwrap();
        manager.force_reload();

        assert_eq!(
            manager.current_configuration().corridors.generation_distance,
            45.0
        );
        assert_eq!(
            event_names(&mut manager),
            vec!["ConfigurationReloaded", "RulesUpdated"]
        );
    }

    #[test]
    fn test_scheduled_reload_respects_settle_deadline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("environment.cfg");
        fs::write(&path, VALID_DOC).unwrap();

        let mut manager = ConfigurationManager::new();
        manager.set_hot_reload_enabled(false);
        manager.load_configuration(&path);
        manager.take_events();
        manager.set_reload_settle(Duration::from_secs(1));

        fs::write(
            &path,
            "corridors:\n  generation_distance: 55\n  cleanup_distance: 110\n",
        )
        .unwrap();

        // Schedule by hand (no watcher in this test) and step the clock
        let t0 = Instant::now();
        manager.pending_reload_at = Some(t0 + Duration::from_secs(1));
        manager.update(t0);
        assert_eq!(
            manager.current_configuration().corridors.generation_distance,
            40.0
        );

        manager.update(t0 + Duration::from_secs(2));
        assert_eq!(
            manager.current_configuration().corridors.generation_distance,
            55.0
        );
    }

    #[test]
    fn test_validate_current_reports_on_active_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("environment.cfg");
        fs::write(
            &path,
            "corridors:\n  generation_distance: 50\n  cleanup_distance: 60\n",
        )
        .unwrap();

        let mut manager = ConfigurationManager::new();
        manager.set_hot_reload_enabled(false);
        manager.load_configuration(&path);

        let result = manager.validate_current();
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("1.5x generation distance")));
    }
}
