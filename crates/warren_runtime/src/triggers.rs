//! Triggers manager
//!
//! The runtime control loop: converts engine rules into stateful triggers,
//! evaluates them at a fixed cadence under a per-tick quota, and dispatches
//! matched actions in rule-priority order.
//!
//! Cooldown state here is independent of the rules engine's own cooldown
//! map, and is discarded wholesale whenever the rule set is rebuilt.

use crate::events::EnvironmentEvent;
use crate::snapshot::WorldSnapshot;
use std::cmp::Ordering;
use warren_event::EventQueue;
use warren_rules::prelude::*;

/// Runtime wrapper around a rule, carrying its cooldown state
#[derive(Debug, Clone)]
pub struct EnvironmentTrigger {
    rule: GenerationRule,
    last_triggered_at: Option<f32>,
}

impl EnvironmentTrigger {
    /// Wrap a rule
    pub fn new(rule: GenerationRule) -> Self {
        Self {
            rule,
            last_triggered_at: None,
        }
    }

    /// The wrapped rule
    pub fn rule(&self) -> &GenerationRule {
        &self.rule
    }

    /// When the trigger last fired, if ever
    pub fn last_triggered_at(&self) -> Option<f32> {
        self.last_triggered_at
    }

    /// Whether the trigger is still cooling down at `now`
    pub fn is_on_cooldown(&self, now: f32) -> bool {
        match self.last_triggered_at {
            Some(last) => now < last + self.rule.cooldown,
            None => false,
        }
    }

    /// Arm the cooldown
    fn fire(&mut self, now: f32) {
        self.last_triggered_at = Some(now);
    }

    /// Clear the cooldown
    pub fn reset_cooldown(&mut self) {
        self.last_triggered_at = None;
    }
}

/// Evaluation statistics since the last rebuild-independent reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    /// Evaluation ticks that ran (cadence permitting)
    pub ticks: u64,
    /// Triggers examined
    pub evaluations: u64,
    /// Triggers whose conditions passed
    pub activations: u64,
    /// Actions handed to consumers
    pub actions_dispatched: u64,
    /// Condition comparisons that failed closed on incompatible types
    pub evaluation_errors: u64,
}

/// An action emitted to external consumers, with its provenance
#[derive(Debug, Clone)]
pub struct DispatchedAction {
    /// Name of the rule that fired
    pub rule_name: String,
    /// Priority of the rule that fired
    pub priority: f32,
    /// The command itself
    pub action: GenerationAction,
    /// Enriched action context (rule metadata, player and behavior data,
    /// environment snapshot)
    pub context: Context,
}

/// Drives trigger evaluation against live game state.
pub struct TriggersManager {
    /// Triggers sorted by descending priority (stable)
    triggers: Vec<EnvironmentTrigger>,
    /// Where the next tick resumes examining triggers
    cursor: usize,
    max_triggers_per_frame: usize,
    evaluation_interval: f32,
    last_eval_at: Option<f32>,
    synced_revision: Option<u64>,
    stats: TriggerStats,
    events: EventQueue<EnvironmentEvent>,
}

impl TriggersManager {
    /// Create an empty manager with default cadence and quota
    pub fn new() -> Self {
        let defaults = PerformanceSettings::default();
        Self {
            triggers: Vec::new(),
            cursor: 0,
            max_triggers_per_frame: defaults.max_triggers_per_frame,
            evaluation_interval: defaults.evaluation_interval,
            last_eval_at: None,
            synced_revision: None,
            stats: TriggerStats::default(),
            events: EventQueue::new(),
        }
    }

    /// Run one evaluation pass at game time `now`.
    ///
    /// Rebuilds the trigger set if the engine's rule set changed, enforces
    /// the evaluation cadence, examines at most the per-tick quota of
    /// triggers (the rest resume next tick), and returns the tick's
    /// dispatched actions sorted by descending rule priority.
    pub fn update(
        &mut self,
        engine: &RulesEngine,
        snapshot: &WorldSnapshot,
        now: f32,
    ) -> Vec<DispatchedAction> {
        if self.synced_revision != Some(engine.revision()) {
            self.rebuild_from(engine);
        }

        if let Some(last) = self.last_eval_at {
            if now - last < self.evaluation_interval {
                return Vec::new();
            }
        }
        self.last_eval_at = Some(now);
        self.stats.ticks += 1;

        if self.triggers.is_empty() {
            return Vec::new();
        }

        let ctx = snapshot.to_context();
        let config = engine.configuration();
        let budget = self.max_triggers_per_frame.min(self.triggers.len());
        let mut queued: Vec<DispatchedAction> = Vec::new();

        for _ in 0..budget {
            let idx = self.cursor;
            self.cursor = (self.cursor + 1) % self.triggers.len();

            self.stats.evaluations += 1;
            let trigger = &mut self.triggers[idx];
            if trigger.is_on_cooldown(now) {
                continue;
            }

            let (matched, faults) = evaluate_conditions(&trigger.rule, &ctx);
            self.stats.evaluation_errors += faults;
            if !matched {
                continue;
            }

            trigger.fire(now);
            self.stats.activations += 1;

            let rule = &self.triggers[idx].rule;
            let action_ctx = build_action_context(rule, &ctx, config);
            log::debug!("trigger '{}' activated", rule.name);
            self.events.push(EnvironmentEvent::TriggerActivated {
                rule: rule.name.clone(),
                context: action_ctx.clone(),
            });
            for action in &rule.actions {
                queued.push(DispatchedAction {
                    rule_name: rule.name.clone(),
                    priority: rule.priority,
                    action: action.clone(),
                    context: action_ctx.clone(),
                });
            }
        }

        // Same-tick actions reach consumers in rule-priority order even
        // when quota truncation changed the evaluation order
        queued.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
        for dispatched in &queued {
            self.stats.actions_dispatched += 1;
            self.events
                .push(EnvironmentEvent::GenerationCommandDispatched {
                    rule: dispatched.rule_name.clone(),
                    action: dispatched.action.clone(),
                    context: dispatched.context.clone(),
                });
        }
        queued
    }

    /// Discard all triggers and recreate them from the engine's rule set.
    ///
    /// Cooldown state does not survive a rebuild.
    fn rebuild_from(&mut self, engine: &RulesEngine) {
        self.triggers = engine
            .rules()
            .iter()
            .cloned()
            .map(EnvironmentTrigger::new)
            .collect();
        self.triggers.sort_by(|a, b| {
            b.rule
                .priority
                .partial_cmp(&a.rule.priority)
                .unwrap_or(Ordering::Equal)
        });
        self.cursor = 0;
        self.synced_revision = Some(engine.revision());

        let performance = &engine.configuration().performance;
        self.max_triggers_per_frame = performance.max_triggers_per_frame.max(1);
        self.evaluation_interval = performance.evaluation_interval;

        log::info!("rebuilt {} environment trigger(s)", self.triggers.len());
    }

    /// Clear one trigger's cooldown
    pub fn reset_cooldown(&mut self, rule_name: &str) -> bool {
        match self
            .triggers
            .iter_mut()
            .find(|t| t.rule.name == rule_name)
        {
            Some(trigger) => {
                trigger.reset_cooldown();
                true
            }
            None => false,
        }
    }

    /// Clear every trigger's cooldown
    pub fn reset_all_cooldowns(&mut self) {
        for trigger in &mut self.triggers {
            trigger.reset_cooldown();
        }
    }

    /// Override the per-tick quota until the next rule-set rebuild
    pub fn set_max_triggers_per_frame(&mut self, quota: usize) {
        self.max_triggers_per_frame = quota.max(1);
    }

    /// Override the evaluation cadence until the next rule-set rebuild
    pub fn set_evaluation_interval(&mut self, interval: f32) {
        self.evaluation_interval = interval.max(0.0);
    }

    /// Evaluation statistics
    pub fn stats(&self) -> TriggerStats {
        self.stats
    }

    /// Active triggers, highest priority first
    pub fn triggers(&self) -> &[EnvironmentTrigger] {
        &self.triggers
    }

    /// Number of active triggers
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Drain pending notifications, in emit order
    pub fn take_events(&mut self) -> Vec<EnvironmentEvent> {
        self.events.drain()
    }
}

impl Default for TriggersManager {
    fn default() -> Self {
        Self::new()
    }
}

/// AND over the rule's conditions, counting fail-closed comparison faults.
fn evaluate_conditions(rule: &GenerationRule, ctx: &Context) -> (bool, u64) {
    if rule.conditions.is_empty() {
        return (false, 0);
    }
    let mut faults = 0;
    for condition in &rule.conditions {
        match condition.try_evaluate(ctx) {
            Ok(true) => {}
            Ok(false) => return (false, faults),
            Err(e) => {
                log::debug!(
                    "rule '{}': condition on '{}' failed closed: {}",
                    rule.name,
                    condition.context_key(),
                    e
                );
                faults += 1;
                return (false, faults);
            }
        }
    }
    (true, faults)
}

/// Layer the action context: rule metadata, then player/behavior data, then
/// the environment snapshot. Later layers never overwrite earlier keys.
fn build_action_context(
    rule: &GenerationRule,
    world_ctx: &Context,
    config: &EnvironmentConfiguration,
) -> Context {
    let mut ctx = Context::new();
    ctx.set("RuleName", rule.name.as_str());
    ctx.set("RulePriority", rule.priority);
    ctx.set("RuleCooldown", rule.cooldown);
    ctx.merge_absent(world_ctx);
    ctx.set_if_absent("GenerationDistance", config.corridors.generation_distance);
    ctx.set_if_absent("CleanupDistance", config.corridors.cleanup_distance);
    ctx.set_if_absent("NeonResponse", config.lighting.neon_response);
    ctx.set_if_absent("FogDensityMax", config.atmosphere.fog_density_max);
    ctx
}
