//! Semantic configuration validator
//!
//! Independent of the loader's repair pass: the loader keeps the runtime
//! alive, the validator tells authors and tooling what is actually wrong.
//! Errors block an explicit apply; warnings are advisory.

use std::collections::HashSet;
use warren_rules::prelude::*;

/// Outcome of validating a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// True when no errors were found (warnings do not block)
    pub is_valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Advisory findings
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Render the deterministic human-readable report used by tooling.
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        if self.is_valid {
            out.push_str("✓ Configuration validation passed\n");
        } else {
            out.push_str("✗ Configuration validation failed\n");
        }
        if !self.errors.is_empty() {
            out.push_str("\nErrors:\n");
            for error in &self.errors {
                out.push_str("  • ");
                out.push_str(error);
                out.push('\n');
            }
        }
        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &self.warnings {
                out.push_str("  • ");
                out.push_str(warning);
                out.push('\n');
            }
        }
        out
    }
}

/// Validate a configuration. Pure: the input is never mutated.
pub fn validate(config: &EnvironmentConfiguration) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_corridors(&config.corridors, &mut errors, &mut warnings);
    check_lighting(&config.lighting, &mut errors, &mut warnings);
    check_atmosphere(&config.atmosphere, &mut errors, &mut warnings);
    check_performance(&config.performance, &mut errors, &mut warnings);
    check_rules(&config.rules, &mut errors, &mut warnings);

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_corridors(c: &CorridorSettings, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if c.generation_distance <= 0.0 {
        errors.push(format!(
            "generation distance must be positive (got {})",
            c.generation_distance
        ));
    }
    if c.cleanup_distance <= 0.0 {
        errors.push(format!(
            "cleanup distance must be positive (got {})",
            c.cleanup_distance
        ));
    } else if c.cleanup_distance <= c.generation_distance {
        errors.push(format!(
            "cleanup distance ({}) must exceed generation distance ({})",
            c.cleanup_distance, c.generation_distance
        ));
    } else if c.cleanup_distance < 1.5 * c.generation_distance {
        warnings.push(format!(
            "cleanup distance ({}) is less than 1.5x generation distance ({}); segments may be reclaimed while still visible",
            c.cleanup_distance, c.generation_distance
        ));
    }
    if !KNOWN_SEED_FACTORS.contains(&c.variation_seed_factor.as_str()) {
        warnings.push(format!(
            "unknown variation seed factor '{}'",
            c.variation_seed_factor
        ));
    }
    if c.max_active_segments > 20 {
        warnings.push(format!(
            "{} active segments may strain generation",
            c.max_active_segments
        ));
    }
}

fn check_lighting(l: &LightingSettings, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if l.neon_response <= 0.0 {
        errors.push(format!(
            "neon response must be positive (got {})",
            l.neon_response
        ));
    }
    if l.transition_duration <= 0.0 {
        errors.push(format!(
            "lighting transition duration must be positive (got {})",
            l.transition_duration
        ));
    }
    check_range(
        "lighting intensity",
        l.intensity_min,
        l.intensity_max,
        errors,
    );
    if l.intensity_max > 10.0 {
        warnings.push(format!(
            "lighting intensity max {} is extreme",
            l.intensity_max
        ));
    }
}

fn check_atmosphere(a: &AtmosphereSettings, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if a.transition_speed <= 0.0 {
        errors.push(format!(
            "atmosphere transition speed must be positive (got {})",
            a.transition_speed
        ));
    }
    check_range("fog density", a.fog_density_min, a.fog_density_max, errors);
    check_range("volume", a.volume_min, a.volume_max, errors);
    if a.fog_density_max > 1.0 {
        warnings.push(format!("fog density max {} is extreme", a.fog_density_max));
    }
    if a.volume_max > 1.0 {
        warnings.push(format!("volume max {} is extreme", a.volume_max));
    }
}

fn check_performance(p: &PerformanceSettings, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if p.evaluation_interval <= 0.0 {
        errors.push(format!(
            "evaluation interval must be positive (got {})",
            p.evaluation_interval
        ));
    }
    if p.throttle_threshold <= 0.0 {
        errors.push(format!(
            "throttle threshold must be positive (got {})",
            p.throttle_threshold
        ));
    } else if p.throttle_threshold < 30.0 {
        warnings.push(format!(
            "throttle threshold {} is below 30 fps; generation may never throttle",
            p.throttle_threshold
        ));
    }
    if p.max_triggers_per_frame == 0 {
        errors.push("max triggers per frame must be at least 1".to_string());
    }
}

fn check_rules(rules: &[GenerationRule], errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for rule in rules {
        let label = if rule.name.is_empty() {
            "<unnamed>"
        } else {
            rule.name.as_str()
        };
        if rule.name.is_empty() {
            errors.push("rule with an empty name".to_string());
        } else if !seen.insert(rule.name.as_str()) {
            errors.push(format!("duplicate rule name '{}'", rule.name));
        }
        if rule.conditions.is_empty() {
            errors.push(format!("rule '{}' has no conditions", label));
        }
        if rule.actions.is_empty() {
            errors.push(format!("rule '{}' has no actions", label));
        }
        if rule.priority < 0.0 {
            errors.push(format!(
                "rule '{}' has negative priority {}",
                label, rule.priority
            ));
        }
        if rule.cooldown < 0.0 {
            errors.push(format!(
                "rule '{}' has negative cooldown {}",
                label, rule.cooldown
            ));
        }
        for condition in &rule.conditions {
            match &condition.value {
                None => errors.push(format!(
                    "rule '{}': {} condition has no value",
                    label, condition.condition_type
                )),
                Some(value) => {
                    // Elapsed-time thresholds cannot be negative
                    if matches!(
                        condition.condition_type,
                        ConditionType::GameTime | ConditionType::DwellTime
                    ) {
                        if let Some(threshold) = value.as_number() {
                            if threshold < 0.0 {
                                errors.push(format!(
                                    "rule '{}': {} threshold cannot be negative (got {})",
                                    label, condition.condition_type, threshold
                                ));
                            }
                        }
                    }
                }
            }
        }
        for action in &rule.actions {
            if action.intensity > 10.0 {
                warnings.push(format!(
                    "rule '{}': {} intensity {} is extreme",
                    label, action.action_type, action.intensity
                ));
            }
        }
    }
}

fn check_range(name: &str, min: f32, max: f32, errors: &mut Vec<String>) {
    if min < 0.0 || max < 0.0 {
        errors.push(format!("{} range must be non-negative ({}..{})", name, min, max));
    } else if min > max {
        errors.push(format!("{} range is inverted ({}..{})", name, min, max));
    }
}
