//! Rules engine
//!
//! Holds the active configuration and its own cooldown state, and matches
//! rules against a runtime context. The triggers manager in the runtime
//! crate keeps its own independent cooldown track; the two are never
//! shared.

use crate::action::GenerationAction;
use crate::config::EnvironmentConfiguration;
use crate::context::Context;
use crate::rule::GenerationRule;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Evaluates generation rules against runtime context.
pub struct RulesEngine {
    config: EnvironmentConfiguration,
    /// Rule name -> game time the rule last fired
    cooldowns: HashMap<String, f32>,
    /// Bumped whenever the rule set changes; consumers rebuild on change
    revision: u64,
}

impl RulesEngine {
    /// Create an engine with the default configuration and no rules
    pub fn new() -> Self {
        Self {
            config: EnvironmentConfiguration::default(),
            cooldowns: HashMap::new(),
            revision: 0,
        }
    }

    /// Replace the active configuration.
    ///
    /// Clears all cooldown state and bumps the rule-set revision.
    pub fn load_configuration(&mut self, config: EnvironmentConfiguration) {
        log::info!(
            "rules engine loaded configuration with {} rule(s)",
            config.rules.len()
        );
        self.config = config;
        self.cooldowns.clear();
        self.revision += 1;
    }

    /// The active configuration
    pub fn configuration(&self) -> &EnvironmentConfiguration {
        &self.config
    }

    /// The active rule list, in authored order
    pub fn rules(&self) -> &[GenerationRule] {
        &self.config.rules
    }

    /// Number of active rules
    pub fn rule_count(&self) -> usize {
        self.config.rules.len()
    }

    /// Rule-set revision counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Evaluate all rules against a context at game time `now`.
    ///
    /// Rules are visited in descending priority (stable on ties). A rule on
    /// cooldown is skipped before its conditions are read. A matching rule
    /// contributes all of its actions in list order and re-arms its
    /// cooldown.
    pub fn evaluate_rules(&mut self, ctx: &Context, now: f32) -> Vec<GenerationAction> {
        let mut order: Vec<usize> = (0..self.config.rules.len()).collect();
        order.sort_by(|&a, &b| {
            self.config.rules[b]
                .priority
                .partial_cmp(&self.config.rules[a].priority)
                .unwrap_or(Ordering::Equal)
        });

        let mut actions = Vec::new();
        for idx in order {
            let rule = &self.config.rules[idx];
            if self.cooldown_active(rule, now) {
                continue;
            }
            if !rule.matches(ctx) {
                continue;
            }
            log::debug!("rule '{}' matched", rule.name);
            actions.extend(rule.actions.iter().cloned());
            self.cooldowns.insert(rule.name.clone(), now);
        }
        actions
    }

    /// Check whether a named rule is currently on cooldown
    pub fn is_on_cooldown(&self, name: &str, now: f32) -> bool {
        match self.config.find_rule(name) {
            Some(rule) => self.cooldown_active(rule, now),
            None => false,
        }
    }

    /// Add a rule to the live configuration.
    ///
    /// A structurally invalid rule is rejected. A rule whose name already
    /// exists replaces the prior one; the rule count does not change.
    pub fn add_rule(&mut self, rule: GenerationRule) -> bool {
        if !rule.is_valid() {
            log::warn!("rejecting invalid rule '{}'", rule.name);
            return false;
        }
        if let Some(existing) = self.config.rules.iter_mut().find(|r| r.name == rule.name) {
            log::warn!("rule '{}' already exists, replacing it", rule.name);
            *existing = rule;
        } else {
            self.config.rules.push(rule);
        }
        self.revision += 1;
        true
    }

    /// Remove a rule by name
    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.config.rules.len();
        self.config.rules.retain(|r| r.name != name);
        if self.config.rules.len() == before {
            return false;
        }
        self.cooldowns.remove(name);
        self.revision += 1;
        true
    }

    /// Clear the cooldown of one rule
    pub fn reset_cooldown(&mut self, name: &str) -> bool {
        self.cooldowns.remove(name).is_some()
    }

    /// Clear every cooldown
    pub fn reset_all_cooldowns(&mut self) {
        self.cooldowns.clear();
    }

    fn cooldown_active(&self, rule: &GenerationRule, now: f32) -> bool {
        match self.cooldowns.get(&rule.name) {
            Some(&last) => now < last + rule.cooldown,
            None => false,
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionType, GenerationAction};
    use crate::condition::{ComparisonOp, ConditionType, TriggerCondition};

    fn speed_rule() -> GenerationRule {
        GenerationRule::new("Speed")
            .with_priority(2.0)
            .with_cooldown(1.0)
            .with_condition(TriggerCondition::new(
                ConditionType::PlayerSpeed,
                ComparisonOp::GreaterThan,
                5.0f32,
            ))
            .with_action(GenerationAction::new(ActionType::AdjustLighting).with_target("neon"))
    }

    fn engine_with(rules: Vec<GenerationRule>) -> RulesEngine {
        let mut config = EnvironmentConfiguration::default();
        config.rules = rules;
        let mut engine = RulesEngine::new();
        engine.load_configuration(config);
        engine
    }

    #[test]
    fn test_cooldown_cycle() {
        let mut engine = engine_with(vec![speed_rule()]);
        let ctx = Context::new().with("PlayerSpeed", 6.0f32);

        // Fires at t=0
        let actions = engine.evaluate_rules(&ctx, 0.0);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::AdjustLighting);
        assert_eq!(actions[0].target.as_deref(), Some("neon"));

        // On cooldown at t=0.5
        assert!(engine.is_on_cooldown("Speed", 0.5));
        assert!(engine.evaluate_rules(&ctx, 0.5).is_empty());

        // Re-enabled at t=1.1
        assert!(!engine.is_on_cooldown("Speed", 1.1));
        assert_eq!(engine.evaluate_rules(&ctx, 1.1).len(), 1);
    }

    #[test]
    fn test_zero_cooldown_fires_every_evaluation() {
        let mut rule = speed_rule();
        rule.cooldown = 0.0;
        let mut engine = engine_with(vec![rule]);
        let ctx = Context::new().with("PlayerSpeed", 6.0f32);

        assert_eq!(engine.evaluate_rules(&ctx, 0.0).len(), 1);
        assert_eq!(engine.evaluate_rules(&ctx, 0.0).len(), 1);
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let low = GenerationRule::new("low")
            .with_priority(1.0)
            .with_condition(TriggerCondition::new(
                ConditionType::PlayerSpeed,
                ComparisonOp::GreaterThan,
                0.0f32,
            ))
            .with_action(GenerationAction::new(ActionType::TriggerEffect).with_target("low"));
        let first_high = GenerationRule::new("first_high")
            .with_priority(5.0)
            .with_condition(TriggerCondition::new(
                ConditionType::PlayerSpeed,
                ComparisonOp::GreaterThan,
                0.0f32,
            ))
            .with_action(GenerationAction::new(ActionType::TriggerEffect).with_target("first"));
        let second_high = GenerationRule::new("second_high")
            .with_priority(5.0)
            .with_condition(TriggerCondition::new(
                ConditionType::PlayerSpeed,
                ComparisonOp::GreaterThan,
                0.0f32,
            ))
            .with_action(GenerationAction::new(ActionType::TriggerEffect).with_target("second"));

        let mut engine = engine_with(vec![low, first_high, second_high]);
        let ctx = Context::new().with("PlayerSpeed", 1.0f32);

        let actions = engine.evaluate_rules(&ctx, 0.0);
        let targets: Vec<_> = actions.iter().filter_map(|a| a.target.as_deref()).collect();
        assert_eq!(targets, vec!["first", "second", "low"]);
    }

    #[test]
    fn test_matching_rule_contributes_all_actions_in_order() {
        let rule = GenerationRule::new("combo")
            .with_condition(TriggerCondition::new(
                ConditionType::DwellTime,
                ComparisonOp::GreaterOrEqual,
                10.0f32,
            ))
            .with_action(GenerationAction::new(ActionType::ChangeFogDensity))
            .with_action(GenerationAction::new(ActionType::ModifyAudio))
            .with_action(GenerationAction::new(ActionType::TriggerEffect));

        let mut engine = engine_with(vec![rule]);
        let ctx = Context::new().with("DwellTime", 12.0f32);

        let kinds: Vec<_> = engine
            .evaluate_rules(&ctx, 0.0)
            .into_iter()
            .map(|a| a.action_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ActionType::ChangeFogDensity,
                ActionType::ModifyAudio,
                ActionType::TriggerEffect
            ]
        );
    }

    #[test]
    fn test_duplicate_name_replaces_prior_rule() {
        let mut engine = engine_with(vec![]);
        assert!(engine.add_rule(speed_rule()));

        let replacement = speed_rule().with_priority(9.0);
        assert!(engine.add_rule(replacement));

        assert_eq!(engine.rule_count(), 1);
        assert_eq!(engine.rules()[0].priority, 9.0);
    }

    #[test]
    fn test_add_rejects_invalid_rule() {
        let mut engine = engine_with(vec![]);
        assert!(!engine.add_rule(GenerationRule::new("hollow")));
        assert_eq!(engine.rule_count(), 0);
    }

    #[test]
    fn test_remove_rule() {
        let mut engine = engine_with(vec![speed_rule()]);
        assert!(engine.remove_rule("Speed"));
        assert!(!engine.remove_rule("Speed"));
        assert_eq!(engine.rule_count(), 0);
    }

    #[test]
    fn test_load_configuration_clears_cooldowns_and_bumps_revision() {
        let mut engine = engine_with(vec![speed_rule()]);
        let ctx = Context::new().with("PlayerSpeed", 6.0f32);
        engine.evaluate_rules(&ctx, 0.0);
        assert!(engine.is_on_cooldown("Speed", 0.5));

        let before = engine.revision();
        let mut config = EnvironmentConfiguration::default();
        config.rules = vec![speed_rule()];
        engine.load_configuration(config);

        assert!(engine.revision() > before);
        assert!(!engine.is_on_cooldown("Speed", 0.5));
    }

    #[test]
    fn test_missing_context_key_skips_rule() {
        let mut engine = engine_with(vec![speed_rule()]);
        assert!(engine.evaluate_rules(&Context::new(), 0.0).is_empty());
    }
}
