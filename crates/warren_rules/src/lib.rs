//! Warren Rules - Declarative Environment Rule Model
//!
//! Value types for the rule-driven environment control system, plus the
//! engine that matches them against runtime context.
//!
//! # Features
//!
//! - Typed conditions with checked, fail-closed comparisons
//! - Prioritized rules with per-rule cooldowns
//! - An aggregate configuration with a safe built-in fallback
//!
//! # Example
//!
//! ```
//! use warren_rules::prelude::*;
//!
//! let rule = GenerationRule::new("sprint_surge")
//!     .with_priority(2.0)
//!     .with_cooldown(5.0)
//!     .with_condition(TriggerCondition::new(
//!         ConditionType::PlayerSpeed,
//!         ComparisonOp::GreaterThan,
//!         6.5f32,
//!     ))
//!     .with_action(GenerationAction::new(ActionType::AdjustLighting).with_target("neon"));
//!
//! let ctx = Context::new().with("PlayerSpeed", 7.0f32);
//! assert!(rule.matches(&ctx));
//! ```

pub mod action;
pub mod condition;
pub mod config;
pub mod context;
pub mod engine;
pub mod rule;

pub mod prelude {
    pub use crate::action::{ActionType, GenerationAction};
    pub use crate::condition::{ComparisonOp, ConditionType, TriggerCondition};
    pub use crate::config::{
        AtmosphereSettings, CorridorSettings, EnvironmentConfiguration, LightingSettings,
        PerformanceSettings, KNOWN_SEED_FACTORS,
    };
    pub use crate::context::{Context, ContextValue, EvalError, ParseEnumError};
    pub use crate::engine::RulesEngine;
    pub use crate::rule::GenerationRule;
}

pub use prelude::*;
