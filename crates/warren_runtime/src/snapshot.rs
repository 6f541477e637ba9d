//! Per-tick game state snapshot

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use warren_rules::prelude::*;

/// Classified player movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementPattern {
    /// Standing still or barely moving
    Idle,
    /// Unhurried exploration
    Wandering,
    /// Sustained fast movement
    Rushing,
    /// Revisiting recently traversed corridor
    Backtracking,
    /// Looping the same junctions
    Circling,
}

impl MovementPattern {
    /// Canonical name published into the context
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Wandering => "wandering",
            Self::Rushing => "rushing",
            Self::Backtracking => "backtracking",
            Self::Circling => "circling",
        }
    }
}

impl Default for MovementPattern {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of live game state taken once per evaluation tick.
///
/// The host fills this from its player controller and behavior analysis;
/// [`WorldSnapshot::to_context`] turns it into the context map rules are
/// evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Player world position
    pub player_position: [f32; 3],
    /// Player speed in units per second
    pub player_speed: f32,
    /// Elapsed game time in seconds
    pub game_time: f32,
    /// Name of the zone the player is in
    pub zone_type: String,
    /// Seconds spent in the current zone
    pub dwell_time: f32,
    /// Classified movement pattern
    pub movement_pattern: MovementPattern,
    /// Extra behavior-analysis factors; core keys always win on collision
    pub behavior_factors: HashMap<String, ContextValue>,
}

impl WorldSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the player position
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.player_position = position;
        self
    }

    /// Set the player speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.player_speed = speed;
        self
    }

    /// Set the elapsed game time
    pub fn with_game_time(mut self, game_time: f32) -> Self {
        self.game_time = game_time;
        self
    }

    /// Set the zone name
    pub fn with_zone(mut self, zone_type: impl Into<String>) -> Self {
        self.zone_type = zone_type.into();
        self
    }

    /// Set the dwell time
    pub fn with_dwell_time(mut self, dwell_time: f32) -> Self {
        self.dwell_time = dwell_time;
        self
    }

    /// Set the movement pattern
    pub fn with_movement_pattern(mut self, pattern: MovementPattern) -> Self {
        self.movement_pattern = pattern;
        self
    }

    /// Add a behavior-analysis factor
    pub fn with_factor(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.behavior_factors.insert(key.into(), value.into());
        self
    }

    /// Build the evaluation context.
    ///
    /// `PlayerPosition` is published as depth along the corridor axis (the
    /// z coordinate) so ordering comparisons work; the raw vector is
    /// available under `PlayerPositionVec`. Behavior factors never
    /// overwrite the core keys.
    pub fn to_context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.set("PlayerPosition", self.player_position[2]);
        ctx.set("PlayerPositionVec", self.player_position);
        ctx.set("PlayerSpeed", self.player_speed);
        ctx.set("GameTime", self.game_time);
        ctx.set("ZoneType", self.zone_type.as_str());
        ctx.set("DwellTime", self.dwell_time);
        ctx.set("MovementPattern", self.movement_pattern.as_str());
        for (key, value) in &self.behavior_factors {
            ctx.set_if_absent(key.clone(), value.clone());
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keys() {
        let snapshot = WorldSnapshot::new()
            .with_position([2.0, 0.0, 35.0])
            .with_speed(6.5)
            .with_game_time(120.0)
            .with_zone("deep_maintenance")
            .with_dwell_time(14.0)
            .with_movement_pattern(MovementPattern::Rushing);

        let ctx = snapshot.to_context();
        assert_eq!(ctx.get("PlayerPosition"), Some(&ContextValue::Float(35.0)));
        assert_eq!(
            ctx.get("PlayerPositionVec"),
            Some(&ContextValue::Vec3([2.0, 0.0, 35.0]))
        );
        assert_eq!(ctx.get("PlayerSpeed"), Some(&ContextValue::Float(6.5)));
        assert_eq!(ctx.get("GameTime"), Some(&ContextValue::Float(120.0)));
        assert_eq!(
            ctx.get("ZoneType"),
            Some(&ContextValue::Text("deep_maintenance".to_string()))
        );
        assert_eq!(ctx.get("DwellTime"), Some(&ContextValue::Float(14.0)));
        assert_eq!(
            ctx.get("MovementPattern"),
            Some(&ContextValue::Text("rushing".to_string()))
        );
    }

    #[test]
    fn test_behavior_factors_never_shadow_core_keys() {
        let snapshot = WorldSnapshot::new()
            .with_speed(6.0)
            .with_factor("PlayerSpeed", 0.1f32)
            .with_factor("Hesitation", 0.7f32);

        let ctx = snapshot.to_context();
        assert_eq!(ctx.get("PlayerSpeed"), Some(&ContextValue::Float(6.0)));
        assert_eq!(ctx.get("Hesitation"), Some(&ContextValue::Float(0.7)));
    }
}
