//! Generation actions

use crate::context::{ContextValue, ParseEnumError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// What kind of command an action emits to the external generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Rebuild or extend corridor layout ahead of the player
    GenerateLayout,
    /// Retune neon/ambient lighting
    AdjustLighting,
    /// Shift fog density toward a new value
    ChangeFogDensity,
    /// Change ambient audio parameters
    ModifyAudio,
    /// Crossfade into another audio zone
    TransitionAudioZone,
    /// Fire a one-shot effect
    TriggerEffect,
    /// Place a positional audio emitter
    CreateSpatialAudio,
}

impl ActionType {
    /// Action name as written in configuration documents
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenerateLayout => "GenerateLayout",
            Self::AdjustLighting => "AdjustLighting",
            Self::ChangeFogDensity => "ChangeFogDensity",
            Self::ModifyAudio => "ModifyAudio",
            Self::TransitionAudioZone => "TransitionAudioZone",
            Self::TriggerEffect => "TriggerEffect",
            Self::CreateSpatialAudio => "CreateSpatialAudio",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GenerateLayout" => Ok(Self::GenerateLayout),
            "AdjustLighting" => Ok(Self::AdjustLighting),
            "ChangeFogDensity" => Ok(Self::ChangeFogDensity),
            "ModifyAudio" => Ok(Self::ModifyAudio),
            "TransitionAudioZone" => Ok(Self::TransitionAudioZone),
            "TriggerEffect" => Ok(Self::TriggerEffect),
            "CreateSpatialAudio" => Ok(Self::CreateSpatialAudio),
            _ => Err(ParseEnumError {
                kind: "action type",
                value: s.to_string(),
            }),
        }
    }
}

/// A typed command for an external renderer or generator to execute.
///
/// Always structurally valid; an empty parameter map is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAction {
    /// Command kind
    pub action_type: ActionType,
    /// Optional target (a light group, audio zone, effect name)
    pub target: Option<String>,
    /// Strength of the effect
    pub intensity: f32,
    /// How long the effect should take, in seconds (0 = instant)
    pub duration: f32,
    /// Free-form parameters for the consumer
    pub parameters: HashMap<String, ContextValue>,
}

impl GenerationAction {
    /// Create an action with default intensity and duration
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            target: None,
            intensity: 1.0,
            duration: 0.0,
            parameters: HashMap::new(),
        }
    }

    /// Set the target
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the intensity
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Add a free-form parameter
    pub fn with_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}
