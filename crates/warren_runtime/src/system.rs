//! Environment system facade
//!
//! Ties the configuration manager, triggers manager and event dispatcher
//! into the single object a host game loop drives.

use crate::events::{EnvironmentDispatcher, EnvironmentEvent};
use crate::manager::ConfigurationManager;
use crate::snapshot::WorldSnapshot;
use crate::triggers::{DispatchedAction, TriggersManager};
use std::path::Path;
use std::time::Instant;
use warren_event::SubscriberId;
use warren_rules::prelude::*;

/// The host-facing entry point for the environment control system.
///
/// Call [`EnvironmentSystem::tick`] once per frame with the current game
/// state; subscribers observe configuration and dispatch events in emit
/// order, and the returned actions go to the corridor/lighting/audio
/// consumers.
pub struct EnvironmentSystem {
    manager: ConfigurationManager,
    triggers: TriggersManager,
    dispatcher: EnvironmentDispatcher,
}

impl EnvironmentSystem {
    /// Create a system with the built-in default fallback
    pub fn new() -> Self {
        Self::with_fallback(EnvironmentConfiguration::default())
    }

    /// Create a system with an explicit fallback configuration
    pub fn with_fallback(fallback: EnvironmentConfiguration) -> Self {
        Self {
            manager: ConfigurationManager::with_fallback(fallback),
            triggers: TriggersManager::new(),
            dispatcher: EnvironmentDispatcher::new(),
        }
    }

    /// Subscribe to environment events
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&EnvironmentEvent) + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(handler)
    }

    /// Remove a subscriber
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Load a configuration document and apply it
    pub fn load_configuration(&mut self, path: impl AsRef<Path>) {
        self.manager.load_configuration(path);
        self.flush_events();
    }

    /// Run one frame of the environment system at game time `now`.
    pub fn tick(&mut self, snapshot: &WorldSnapshot, now: f32) -> Vec<DispatchedAction> {
        self.tick_at(snapshot, now, Instant::now())
    }

    /// [`EnvironmentSystem::tick`] with an injected wall clock, for hosts
    /// that own their own timing (and for tests).
    pub fn tick_at(
        &mut self,
        snapshot: &WorldSnapshot,
        now: f32,
        wall_clock: Instant,
    ) -> Vec<DispatchedAction> {
        self.manager.update(wall_clock);
        let dispatched = self.triggers.update(self.manager.engine(), snapshot, now);
        self.flush_events();
        dispatched
    }

    /// Reload the configuration immediately
    pub fn force_reload(&mut self) {
        self.manager.force_reload();
        self.flush_events();
    }

    /// Enable or disable hot-reload
    pub fn set_hot_reload_enabled(&mut self, enabled: bool) {
        self.manager.set_hot_reload_enabled(enabled);
    }

    /// The configuration manager
    pub fn manager(&self) -> &ConfigurationManager {
        &self.manager
    }

    /// Mutable access to the configuration manager
    pub fn manager_mut(&mut self) -> &mut ConfigurationManager {
        &mut self.manager
    }

    /// The triggers manager
    pub fn triggers(&self) -> &TriggersManager {
        &self.triggers
    }

    /// Mutable access to the triggers manager
    pub fn triggers_mut(&mut self) -> &mut TriggersManager {
        &mut self.triggers
    }

    fn flush_events(&mut self) {
        for event in self.manager.take_events() {
            self.dispatcher.emit(&event);
        }
        for event in self.triggers.take_events() {
            self.dispatcher.emit(&event);
        }
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new()
    }
}
