//! Warren Config - Configuration Loading and Validation
//!
//! The configuration lifecycle for the environment control system:
//!
//! - [`loader`]: lenient line-oriented parsing that never fails to the
//!   caller (defaults on missing files, per-field fallback, post-parse
//!   repair)
//! - [`validator`]: an independent semantic checker producing blocking
//!   errors and advisory warnings, with a deterministic report format
//!
//! The loader keeps the runtime alive; the validator tells authors what is
//! actually wrong. They are separate passes.

pub mod loader;
pub mod validator;

pub mod prelude {
    pub use crate::loader::{load, load_from_text};
    pub use crate::validator::{validate, ValidationResult};
}

pub use prelude::*;
