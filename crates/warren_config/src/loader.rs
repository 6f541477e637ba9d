//! Lenient line-oriented configuration loader
//!
//! Parses the restricted environment-configuration grammar: `#` comments,
//! section headers ending in `:`, `key: value` scalars, and a `rules:`
//! section of rule blocks whose condition/action lines use an inline
//! `key: value key: value` microsyntax.
//!
//! Loading never fails. A missing or unreadable file yields the default
//! configuration; a field that fails to parse keeps its default; a rule
//! that is structurally broken is dropped. After parsing, a repair pass
//! clamps non-positive core values back to their defaults so the returned
//! configuration always passes `is_valid()`.

use std::path::Path;
use warren_rules::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Corridors,
    Lighting,
    Atmosphere,
    Performance,
    Rules,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleSub {
    None,
    Conditions,
    Actions,
}

/// Load a configuration document from disk.
///
/// On any I/O failure this logs and returns the default configuration.
pub fn load(path: impl AsRef<Path>) -> EnvironmentConfiguration {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => load_from_text(&text),
        Err(e) => {
            log::warn!("failed to read config {:?}: {}; using defaults", path, e);
            EnvironmentConfiguration::default()
        }
    }
}

/// Parse a configuration document from text. Never fails.
pub fn load_from_text(text: &str) -> EnvironmentConfiguration {
    let mut config = EnvironmentConfiguration::default();
    let mut section = Section::None;
    let mut sub = RuleSub::None;
    let mut current: Option<GenerationRule> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(next) = section_header(line) {
            flush_rule(&mut config.rules, &mut current);
            section = next;
            sub = RuleSub::None;
            continue;
        }

        if section == Section::Rules {
            handle_rule_line(line, &mut config.rules, &mut current, &mut sub);
            continue;
        }

        match split_key_value(line) {
            Some((key, value)) => apply_scalar(&mut config, section, key, value),
            None => {
                // A bare header we don't recognize; skip its body
                log::debug!("skipping unknown section '{}'", line.trim_end_matches(':'));
                section = Section::Unknown;
            }
        }
    }
    flush_rule(&mut config.rules, &mut current);

    repair(&mut config);
    config
}

fn section_header(line: &str) -> Option<Section> {
    match line {
        "corridors:" => Some(Section::Corridors),
        "lighting:" => Some(Section::Lighting),
        "atmosphere:" => Some(Section::Atmosphere),
        "performance:" => Some(Section::Performance),
        "rules:" => Some(Section::Rules),
        _ => None,
    }
}

/// Split `key: value`; returns None when there is no value (bare headers).
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key.trim(), value))
}

fn apply_scalar(config: &mut EnvironmentConfiguration, section: Section, key: &str, value: &str) {
    match section {
        Section::Corridors => match key {
            "generation_distance" => {
                set_f32(&mut config.corridors.generation_distance, key, value)
            }
            "cleanup_distance" => set_f32(&mut config.corridors.cleanup_distance, key, value),
            "max_active_segments" => {
                set_u32(&mut config.corridors.max_active_segments, key, value)
            }
            "variation_seed_factor" => {
                config.corridors.variation_seed_factor = unquote(value).to_string()
            }
            _ => log::debug!("skipping unknown corridors key '{}'", key),
        },
        Section::Lighting => match key {
            "neon_response" => set_f32(&mut config.lighting.neon_response, key, value),
            "transition_duration" => {
                set_f32(&mut config.lighting.transition_duration, key, value)
            }
            "intensity_min" => set_f32(&mut config.lighting.intensity_min, key, value),
            "intensity_max" => set_f32(&mut config.lighting.intensity_max, key, value),
            _ => log::debug!("skipping unknown lighting key '{}'", key),
        },
        Section::Atmosphere => match key {
            "transition_speed" => set_f32(&mut config.atmosphere.transition_speed, key, value),
            "fog_density_min" => set_f32(&mut config.atmosphere.fog_density_min, key, value),
            "fog_density_max" => set_f32(&mut config.atmosphere.fog_density_max, key, value),
            "volume_min" => set_f32(&mut config.atmosphere.volume_min, key, value),
            "volume_max" => set_f32(&mut config.atmosphere.volume_max, key, value),
            _ => log::debug!("skipping unknown atmosphere key '{}'", key),
        },
        Section::Performance => match key {
            "throttle_threshold" => {
                set_f32(&mut config.performance.throttle_threshold, key, value)
            }
            "max_triggers_per_frame" => {
                set_usize(&mut config.performance.max_triggers_per_frame, key, value)
            }
            "evaluation_interval" => {
                set_f32(&mut config.performance.evaluation_interval, key, value)
            }
            _ => log::debug!("skipping unknown performance key '{}'", key),
        },
        Section::None | Section::Unknown | Section::Rules => {
            log::debug!("skipping stray key '{}'", key)
        }
    }
}

fn handle_rule_line(
    line: &str,
    rules: &mut Vec<GenerationRule>,
    current: &mut Option<GenerationRule>,
    sub: &mut RuleSub,
) {
    if let Some(name) = line.strip_prefix("- name:") {
        flush_rule(rules, current);
        *current = Some(GenerationRule::new(unquote(name.trim())));
        *sub = RuleSub::None;
        return;
    }

    let Some(rule) = current.as_mut() else {
        log::debug!("skipping rule line outside a rule block: '{}'", line);
        return;
    };

    match line {
        "conditions:" => {
            *sub = RuleSub::Conditions;
            return;
        }
        "actions:" => {
            *sub = RuleSub::Actions;
            return;
        }
        _ => {}
    }

    if line.starts_with('-') {
        match sub {
            RuleSub::Conditions => {
                if let Some(condition) = parse_condition(line) {
                    rule.conditions.push(condition);
                }
            }
            RuleSub::Actions => {
                if let Some(action) = parse_action(line) {
                    rule.actions.push(action);
                }
            }
            RuleSub::None => log::debug!("skipping stray list item '{}'", line),
        }
        return;
    }

    match split_key_value(line) {
        Some(("priority", value)) => set_f32(&mut rule.priority, "priority", value),
        Some(("cooldown", value)) => set_f32(&mut rule.cooldown, "cooldown", value),
        Some((key, _)) => log::debug!("skipping unknown rule key '{}'", key),
        None => log::debug!("skipping unrecognized rule line '{}'", line),
    }
}

/// Parse `- type: <T> operator: <Op> value: <V> [parameter: <key>]`
fn parse_condition(line: &str) -> Option<TriggerCondition> {
    let mut condition_type = None;
    let mut operator = None;
    let mut value = None;
    let mut parameter = None;

    for (key, raw) in inline_pairs(line) {
        match key.as_str() {
            "type" => match raw.parse::<ConditionType>() {
                Ok(t) => condition_type = Some(t),
                Err(e) => {
                    log::warn!("skipping condition: {}", e);
                    return None;
                }
            },
            "operator" => match raw.parse::<ComparisonOp>() {
                Ok(op) => operator = Some(op),
                Err(e) => {
                    log::warn!("skipping condition: {}", e);
                    return None;
                }
            },
            "value" => value = Some(ContextValue::parse_scalar(&raw)),
            "parameter" => parameter = Some(unquote(&raw).to_string()),
            _ => log::debug!("skipping unknown condition key '{}'", key),
        }
    }

    let (Some(condition_type), Some(operator)) = (condition_type, operator) else {
        log::warn!("skipping condition without type/operator: '{}'", line);
        return None;
    };
    Some(TriggerCondition {
        condition_type,
        operator,
        value,
        parameter,
    })
}

/// Parse `- action: <A> [target: <t>] [intensity: <f>] [duration: <f>]`
fn parse_action(line: &str) -> Option<GenerationAction> {
    let mut action = None;
    let mut target = None;
    let mut intensity = 1.0f32;
    let mut duration = 0.0f32;

    for (key, raw) in inline_pairs(line) {
        match key.as_str() {
            "action" => match raw.parse::<ActionType>() {
                Ok(a) => action = Some(a),
                Err(e) => {
                    log::warn!("skipping action: {}", e);
                    return None;
                }
            },
            "target" => target = Some(unquote(&raw).to_string()),
            "intensity" => set_f32(&mut intensity, "intensity", &raw),
            "duration" => set_f32(&mut duration, "duration", &raw),
            _ => log::debug!("skipping unknown action key '{}'", key),
        }
    }

    let Some(action_type) = action else {
        log::warn!("skipping action without a type: '{}'", line);
        return None;
    };
    let mut action = GenerationAction::new(action_type)
        .with_intensity(intensity)
        .with_duration(duration);
    action.target = target;
    Some(action)
}

/// Tokenize the inline microsyntax: every `<word>:` token starts a key, the
/// following tokens up to the next key form its value.
fn inline_pairs(line: &str) -> Vec<(String, String)> {
    let body = line.trim_start_matches('-').trim();
    let mut pairs = Vec::new();
    let mut key: Option<String> = None;
    let mut buf: Vec<&str> = Vec::new();

    for token in body.split_whitespace() {
        match token.strip_suffix(':') {
            Some(k) if !k.is_empty() => {
                if let Some(prev) = key.take() {
                    pairs.push((prev, buf.join(" ")));
                }
                buf.clear();
                key = Some(k.to_string());
            }
            _ => buf.push(token),
        }
    }
    if let Some(prev) = key {
        pairs.push((prev, buf.join(" ")));
    }
    pairs
}

fn flush_rule(rules: &mut Vec<GenerationRule>, current: &mut Option<GenerationRule>) {
    let Some(rule) = current.take() else { return };
    if !rule.is_valid() {
        log::warn!("dropping invalid rule '{}'", rule.name);
        return;
    }
    if let Some(existing) = rules.iter_mut().find(|r| r.name == rule.name) {
        log::warn!("duplicate rule '{}', replacing earlier definition", rule.name);
        *existing = rule;
    } else {
        rules.push(rule);
    }
}

fn set_f32(slot: &mut f32, key: &str, raw: &str) {
    match raw.parse::<f32>() {
        Ok(v) => *slot = v,
        Err(_) => log::warn!("invalid value '{}' for {}; keeping {}", raw, key, slot),
    }
}

fn set_u32(slot: &mut u32, key: &str, raw: &str) {
    match raw.parse::<u32>() {
        Ok(v) => *slot = v,
        Err(_) => log::warn!("invalid value '{}' for {}; keeping {}", raw, key, slot),
    }
}

fn set_usize(slot: &mut usize, key: &str, raw: &str) {
    match raw.parse::<usize>() {
        Ok(v) => *slot = v,
        Err(_) => log::warn!("invalid value '{}' for {}; keeping {}", raw, key, slot),
    }
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Clamp known-invalid numeric fields back to their defaults so a single
/// bad field never invalidates the whole document.
fn repair(config: &mut EnvironmentConfiguration) {
    let defaults = EnvironmentConfiguration::default();
    repair_positive(
        &mut config.corridors.generation_distance,
        defaults.corridors.generation_distance,
        "generation_distance",
    );
    repair_positive(
        &mut config.corridors.cleanup_distance,
        defaults.corridors.cleanup_distance,
        "cleanup_distance",
    );
    repair_positive(
        &mut config.lighting.neon_response,
        defaults.lighting.neon_response,
        "neon_response",
    );
    repair_positive(
        &mut config.lighting.transition_duration,
        defaults.lighting.transition_duration,
        "transition_duration",
    );
    repair_positive(
        &mut config.atmosphere.transition_speed,
        defaults.atmosphere.transition_speed,
        "transition_speed",
    );
    repair_positive(
        &mut config.performance.throttle_threshold,
        defaults.performance.throttle_threshold,
        "throttle_threshold",
    );
    repair_positive(
        &mut config.performance.evaluation_interval,
        defaults.performance.evaluation_interval,
        "evaluation_interval",
    );

    if config.corridors.cleanup_distance <= config.corridors.generation_distance {
        log::warn!(
            "cleanup distance {} does not exceed generation distance {}; restoring default distances",
            config.corridors.cleanup_distance,
            config.corridors.generation_distance
        );
        config.corridors.generation_distance = defaults.corridors.generation_distance;
        config.corridors.cleanup_distance = defaults.corridors.cleanup_distance;
    }
}

fn repair_positive(slot: &mut f32, default: f32, name: &str) {
    if *slot <= 0.0 {
        log::warn!(
            "{} must be positive (got {}); restoring default {}",
            name,
            slot,
            default
        );
        *slot = default;
    }
}
