//! Generation rules

use crate::action::GenerationAction;
use crate::condition::TriggerCondition;
use crate::context::Context;
use serde::{Deserialize, Serialize};

/// A named, prioritized condition-set to action-set mapping with its own
/// cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRule {
    /// Unique rule name
    pub name: String,
    /// Higher priority evaluates and wins first
    pub priority: f32,
    /// Minimum seconds between firings (0 = no cooldown)
    pub cooldown: f32,
    /// AND-combined conditions; must be non-empty to be valid
    pub conditions: Vec<TriggerCondition>,
    /// Actions emitted on match, in list order; must be non-empty
    pub actions: Vec<GenerationAction>,
}

impl GenerationRule {
    /// Create an empty rule with default priority
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 1.0,
            cooldown: 0.0,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the cooldown in seconds
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Add a condition
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an action
    pub fn with_action(mut self, action: GenerationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Validity: non-empty name, at least one valid condition, at least one
    /// action.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.conditions.is_empty()
            && self.conditions.iter().all(|c| c.is_valid())
            && !self.actions.is_empty()
    }

    /// AND over all conditions, fail-closed on missing keys and
    /// incompatible comparisons.
    pub fn matches(&self, ctx: &Context) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.evaluate(ctx))
    }
}
