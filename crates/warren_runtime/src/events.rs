//! Runtime event definitions

use warren_event::EventDispatcher;
use warren_rules::prelude::*;

/// Notifications emitted by the environment control system.
///
/// Configuration events originate in the configuration manager; trigger and
/// dispatch events originate in the triggers manager. Both are drained once
/// per tick and delivered through a single dispatcher in emit order.
#[derive(Debug, Clone)]
pub enum EnvironmentEvent {
    /// An initial configuration was loaded and applied
    ConfigurationLoaded(EnvironmentConfiguration),
    /// A hot-reload replaced the active configuration
    ConfigurationReloaded(EnvironmentConfiguration),
    /// A load or reload failed; the previous configuration is still active
    ConfigurationError(String),
    /// The active rule set changed
    RulesUpdated(EnvironmentConfiguration),
    /// A trigger's conditions passed and its actions were queued
    TriggerActivated {
        rule: String,
        context: Context,
    },
    /// An action was dispatched to external consumers
    GenerationCommandDispatched {
        rule: String,
        action: GenerationAction,
        context: Context,
    },
}

impl EnvironmentEvent {
    /// Event name for logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigurationLoaded(_) => "ConfigurationLoaded",
            Self::ConfigurationReloaded(_) => "ConfigurationReloaded",
            Self::ConfigurationError(_) => "ConfigurationError",
            Self::RulesUpdated(_) => "RulesUpdated",
            Self::TriggerActivated { .. } => "TriggerActivated",
            Self::GenerationCommandDispatched { .. } => "GenerationCommandDispatched",
        }
    }
}

/// Dispatcher type used by the environment system
pub type EnvironmentDispatcher = EventDispatcher<EnvironmentEvent>;
