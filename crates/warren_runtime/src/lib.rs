//! Warren Runtime - Environment Control Orchestration
//!
//! The runtime half of the environment control system:
//!
//! - [`manager`]: load, validate, apply and hot-reload the configuration
//! - [`triggers`]: the fixed-cadence evaluation loop with per-tick quotas
//!   and priority-ordered dispatch
//! - [`snapshot`]: per-tick game state capture
//! - [`system`]: the facade a host game loop drives
//!
//! The core is single-threaded cooperative: evaluation, reload and
//! dispatch all run on the host loop's timeline. The only other thread is
//! the file-notification callback, which is confined to a channel inside
//! the watcher.

pub mod events;
pub mod manager;
pub mod snapshot;
pub mod system;
pub mod triggers;

pub mod prelude {
    pub use crate::events::{EnvironmentDispatcher, EnvironmentEvent};
    pub use crate::manager::{ConfigState, ConfigurationManager};
    pub use crate::snapshot::{MovementPattern, WorldSnapshot};
    pub use crate::system::EnvironmentSystem;
    pub use crate::triggers::{
        DispatchedAction, EnvironmentTrigger, TriggerStats, TriggersManager,
    };
}

pub use prelude::*;
