//! Environment configuration aggregate

use crate::rule::GenerationRule;
use serde::{Deserialize, Serialize};

/// Seed factors the corridor generator understands for layout variation
pub const KNOWN_SEED_FACTORS: [&str; 4] = ["player_position", "zone", "time", "random"];

/// Corridor generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorSettings {
    /// Distance ahead of the player at which segments are generated
    pub generation_distance: f32,
    /// Distance behind the player at which segments are reclaimed
    pub cleanup_distance: f32,
    /// Upper bound on live corridor segments
    pub max_active_segments: u32,
    /// What seeds layout variation (see [`KNOWN_SEED_FACTORS`])
    pub variation_seed_factor: String,
}

impl Default for CorridorSettings {
    fn default() -> Self {
        Self {
            generation_distance: 50.0,
            cleanup_distance: 100.0,
            max_active_segments: 12,
            variation_seed_factor: "player_position".to_string(),
        }
    }
}

/// Lighting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSettings {
    /// How strongly neon fixtures react to player behavior
    pub neon_response: f32,
    /// Seconds a lighting transition takes
    pub transition_duration: f32,
    /// Lower bound of the ambient intensity range
    pub intensity_min: f32,
    /// Upper bound of the ambient intensity range
    pub intensity_max: f32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            neon_response: 5.0,
            transition_duration: 2.0,
            intensity_min: 0.1,
            intensity_max: 1.0,
        }
    }
}

/// Fog and ambient audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    /// Units per second the atmosphere drifts toward its target
    pub transition_speed: f32,
    /// Fog density range
    pub fog_density_min: f32,
    pub fog_density_max: f32,
    /// Ambient volume range
    pub volume_min: f32,
    pub volume_max: f32,
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            transition_speed: 0.1,
            fog_density_min: 0.01,
            fog_density_max: 0.35,
            volume_min: 0.0,
            volume_max: 1.0,
        }
    }
}

/// Performance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSettings {
    /// Frame rate below which generation work is throttled
    pub throttle_threshold: f32,
    /// Triggers examined per evaluation tick; the rest defer to the next
    pub max_triggers_per_frame: usize,
    /// Seconds between evaluation ticks
    pub evaluation_interval: f32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            throttle_threshold: 60.0,
            max_triggers_per_frame: 3,
            evaluation_interval: 0.1,
        }
    }
}

/// Aggregate configuration for the environment control system.
///
/// The `Default` value is the hard-coded fallback the loader and the
/// configuration manager substitute when a document cannot be used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfiguration {
    pub corridors: CorridorSettings,
    pub lighting: LightingSettings,
    pub atmosphere: AtmosphereSettings,
    pub performance: PerformanceSettings,
    /// Ordered rule list; names are unique
    pub rules: Vec<GenerationRule>,
}

impl EnvironmentConfiguration {
    /// Core sanity check: distances, durations and rates must be positive
    /// and the cleanup distance must exceed the generation distance.
    ///
    /// Deeper semantic checks (ranges, rule contents) live in the
    /// validator.
    pub fn is_valid(&self) -> bool {
        self.corridors.generation_distance > 0.0
            && self.corridors.cleanup_distance > self.corridors.generation_distance
            && self.lighting.neon_response > 0.0
            && self.lighting.transition_duration > 0.0
            && self.atmosphere.transition_speed > 0.0
            && self.performance.throttle_threshold > 0.0
            && self.performance.evaluation_interval > 0.0
    }

    /// Look up a rule by name
    pub fn find_rule(&self, name: &str) -> Option<&GenerationRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Number of rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionType, GenerationAction};
    use crate::condition::{ComparisonOp, ConditionType, TriggerCondition};

    #[test]
    fn test_default_is_valid() {
        let config = EnvironmentConfiguration::default();
        assert!(config.is_valid());
        assert_eq!(config.corridors.generation_distance, 50.0);
        assert_eq!(config.corridors.cleanup_distance, 100.0);
        assert_eq!(config.lighting.neon_response, 5.0);
        assert_eq!(config.lighting.transition_duration, 2.0);
        assert_eq!(config.atmosphere.transition_speed, 0.1);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_positive_distances_with_cleanup_beyond_generation_are_valid() {
        let mut config = EnvironmentConfiguration::default();
        config.corridors.generation_distance = 30.0;
        config.corridors.cleanup_distance = 31.0;
        assert!(config.is_valid());
    }

    #[test]
    fn test_invalid_distances() {
        let mut config = EnvironmentConfiguration::default();
        config.corridors.generation_distance = 0.0;
        assert!(!config.is_valid());

        let mut config = EnvironmentConfiguration::default();
        config.corridors.cleanup_distance = config.corridors.generation_distance;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = EnvironmentConfiguration::default();
        config.rules.push(
            GenerationRule::new("fog_wall")
                .with_priority(3.0)
                .with_condition(TriggerCondition::new(
                    ConditionType::DwellTime,
                    ComparisonOp::GreaterThan,
                    20.0f32,
                ))
                .with_action(
                    GenerationAction::new(ActionType::ChangeFogDensity).with_intensity(0.9),
                ),
        );

        let json = serde_json::to_string(&config).unwrap();
        let back: EnvironmentConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
