//! Warren Watch - Configuration File Watching
//!
//! Wraps OS file-change notification for a single configuration file:
//! watches the containing directory (so a not-yet-created file works),
//! debounces on last-modified timestamps, applies a settle delay before
//! signaling, and restarts itself once after watcher-level errors.
//!
//! The `notify` callback thread never touches shared state; it only feeds
//! a channel that [`ConfigWatcher::poll`] drains on the main loop.

pub mod watcher;

pub mod prelude {
    pub use crate::watcher::{ConfigFileEvent, ConfigWatcher, WatchError};
}

pub use prelude::*;
