//! Engine entry points
//!
//! This module provides the public API for the lighting engine. Every function
//! here is pure: same profile in, same settings out, no I/O and no shared
//! state, so callers may invoke them concurrently without coordination.

use crate::composer::SettingsComposer;
use crate::encoder::SettingsEncoder;
use crate::error::LightingError;
use crate::policy::{NotificationPolicy, StressResponsePolicy};
use crate::profile::UserProfile;
use crate::sensitivity::{SensitivityLevel, SensitivityResolver};
use crate::types::{
    ComfortSettings, LightingSettings, NotificationSettings, SettingsPayload,
    StressResponseSettings,
};

/// Derive lighting settings from a profile.
///
/// Fails with [`LightingError::InvalidProfile`] when `lightSensitivity` is
/// missing, non-numeric, or outside 1-5. No other field can cause a failure.
pub fn calculate_lighting_settings(
    profile: &UserProfile,
) -> Result<LightingSettings, LightingError> {
    let level = SensitivityResolver::resolve(profile)?;
    Ok(SettingsComposer::compose(profile, level))
}

/// Derive notification cadence. Never fails.
pub fn calculate_notification_settings(profile: &UserProfile) -> NotificationSettings {
    NotificationPolicy::derive(profile)
}

/// Derive stress-response policy. Never fails.
pub fn calculate_stress_response_settings(profile: &UserProfile) -> StressResponseSettings {
    StressResponsePolicy::derive(profile)
}

/// Derive all three outputs
pub fn calculate_comfort_settings(profile: &UserProfile) -> Result<ComfortSettings, LightingError> {
    let level = SensitivityResolver::resolve(profile)?;
    Ok(compose_all(profile, level))
}

/// Convert a profile document to a settings payload JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let payload_json = profile_to_settings(r#"{"lightSensitivity": 4}"#.to_string())?;
/// ```
pub fn profile_to_settings(profile_json: String) -> Result<String, LightingError> {
    LightingEngine::new().evaluate_json(&profile_json)
}

/// Convert a profile document to bare lighting settings JSON
pub fn profile_to_lighting(profile_json: String) -> Result<String, LightingError> {
    let profile = UserProfile::from_json(&profile_json)?;
    let lighting = calculate_lighting_settings(&profile)?;
    serde_json::to_string_pretty(&lighting).map_err(|e| LightingError::EncodingError(e.to_string()))
}

/// Engine holding an encoder, for hosts that want a stable instance id
/// across many evaluations.
pub struct LightingEngine {
    encoder: SettingsEncoder,
}

impl Default for LightingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingEngine {
    pub fn new() -> Self {
        Self {
            encoder: SettingsEncoder::new(),
        }
    }

    pub fn with_encoder(encoder: SettingsEncoder) -> Self {
        Self { encoder }
    }

    /// Evaluate a decoded profile into a settings payload
    pub fn evaluate(&self, profile: &UserProfile) -> Result<SettingsPayload, LightingError> {
        let level = SensitivityResolver::resolve(profile)?;
        let settings = compose_all(profile, level);
        Ok(self.encoder.encode(profile, level, settings))
    }

    /// Evaluate a profile document into payload JSON
    pub fn evaluate_json(&self, profile_json: &str) -> Result<String, LightingError> {
        let profile = UserProfile::from_json(profile_json)?;
        let level = SensitivityResolver::resolve(&profile)?;
        let settings = compose_all(&profile, level);
        self.encoder.encode_to_json(&profile, level, settings)
    }
}

fn compose_all(profile: &UserProfile, level: SensitivityLevel) -> ComfortSettings {
    ComfortSettings {
        lighting: SettingsComposer::compose(profile, level),
        notifications: NotificationPolicy::derive(profile),
        stress_response: StressResponsePolicy::derive(profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        AdjustmentComfort, LightReaction, LightType, Location, NotificationPreference,
        SensitivityAnswer, StressAwareness, YesNo,
    };
    use crate::types::{Bounds, TransitionSpeed};
    use pretty_assertions::assert_eq;

    fn full_profile() -> UserProfile {
        UserProfile {
            light_sensitivity: SensitivityAnswer::Score(4),
            overwhelmed_by_light: YesNo::Yes,
            primary_usage: [Location::Home, Location::School].into_iter().collect(),
            light_needs_change: YesNo::Yes,
            uncomfortable_light_types: [LightType::FlickeringLights].into_iter().collect(),
            light_reactions: [LightReaction::Headaches].into_iter().collect(),
            notification_preference: NotificationPreference::Always,
            stress_awareness: StressAwareness::Never,
            manual_override: YesNo::Yes,
            track_effectiveness: YesNo::Yes,
            stress_coping_methods: Default::default(),
            comfort_with_adjustments: AdjustmentComfort::OnlyIfICanUndoIt,
        }
    }

    #[test]
    fn test_deterministic() {
        let profile = full_profile();
        let first = calculate_comfort_settings(&profile).unwrap();
        let second = calculate_comfort_settings(&profile).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_sensitivity() {
        for answer in [
            SensitivityAnswer::Score(0),
            SensitivityAnswer::Score(6),
            SensitivityAnswer::Missing,
            SensitivityAnswer::Malformed("abc".to_string()),
        ] {
            let profile = UserProfile {
                light_sensitivity: answer,
                ..full_profile()
            };
            assert!(matches!(
                calculate_lighting_settings(&profile),
                Err(LightingError::InvalidProfile(_))
            ));
            assert!(calculate_comfort_settings(&profile).is_err());
            // The policies ignore sensitivity entirely
            assert!(calculate_notification_settings(&profile).notify_on_adjustment);
            assert_eq!(calculate_stress_response_settings(&profile).undo_timeout_seconds, 30);
        }
    }

    #[test]
    fn test_full_profile() {
        let settings = calculate_comfort_settings(&full_profile()).unwrap();
        let lighting = &settings.lighting;

        assert_eq!(lighting.default.brightness, Bounds::new(60, 100));
        assert_eq!(lighting.default.color_temp, Bounds::new(2700, 2700));
        assert_eq!(lighting.default.transition_speed, Some(TransitionSpeed::Slow));
        assert!(lighting.default.flicker_free);
        assert!(lighting.calm_mode.is_some());
        assert!(lighting.task_mode.is_some());
        assert!(lighting.time_based.is_some());
        assert_eq!(lighting.location_based.len(), 2);

        assert!(settings.notifications.notify_on_adjustment);
        assert!(!settings.notifications.notify_on_significant_change);
        assert_eq!(settings.notifications.check_in_interval_minutes, 60);
        assert!(settings.stress_response.enable_calm_mode);
        assert!(!settings.stress_response.gradual_dimming);
        assert_eq!(settings.stress_response.undo_timeout_seconds, 30);
        assert!(!settings.stress_response.automatic_adjustments);
    }

    #[test]
    fn test_sensitivity_only_profile() {
        let profile = UserProfile::from_json(r#"{"lightSensitivity": 3}"#).unwrap();
        let lighting = calculate_lighting_settings(&profile).unwrap();
        assert!(lighting.has_no_overrides());
    }

    #[test]
    fn test_profile_to_settings_json() {
        let json = profile_to_settings(
            r#"{
                "lightSensitivity": "5",
                "primaryUsage": ["Home", "Workplace"],
                "overwhelmedByLight": "yes"
            }"#
            .to_string(),
        )
        .unwrap();

        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(payload["sensitivityLevel"], "high");

        let lighting = &payload["settings"]["lighting"];
        assert_eq!(lighting["calmMode"]["transitionSpeed"], "very_slow");
        assert_eq!(lighting["taskMode"]["brightness"]["max"], 300);
        assert!(lighting["locationBased"]["home"]["evening"].is_object());
        assert!(lighting["locationBased"]["workplace"]["evening"].is_null());
        assert!(lighting.get("timeBased").is_none());
    }

    #[test]
    fn test_profile_to_settings_rejects_invalid() {
        let result = profile_to_settings(r#"{"lightSensitivity": 0}"#.to_string());
        assert!(matches!(result, Err(LightingError::InvalidProfile(_))));

        let result = profile_to_settings("not valid json".to_string());
        assert!(matches!(result, Err(LightingError::JsonError(_))));
    }

    #[test]
    fn test_profile_to_lighting() {
        let json = profile_to_lighting(r#"{"lightSensitivity": 1}"#.to_string()).unwrap();
        let lighting: LightingSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(lighting.default.color_temp, Bounds::new(2700, 4000));
    }

    #[test]
    fn test_engine_keeps_instance_id() {
        let engine = LightingEngine::with_encoder(SettingsEncoder::with_instance_id(
            "device-7".to_string(),
        ));
        let first = engine.evaluate(&UserProfile::with_sensitivity(2)).unwrap();
        let second = engine.evaluate(&UserProfile::with_sensitivity(4)).unwrap();
        assert_eq!(first.producer.instance_id, "device-7");
        assert_eq!(second.producer.instance_id, "device-7");
        assert_eq!(first.sensitivity_level, "moderate");
        assert_eq!(second.sensitivity_level, "high");
    }

    #[test]
    fn test_payload_level_matches_settings() {
        let engine = LightingEngine::new();
        for (score, level) in [
            (1, SensitivityLevel::Low),
            (3, SensitivityLevel::Moderate),
            (5, SensitivityLevel::High),
        ] {
            let payload = engine.evaluate(&UserProfile::with_sensitivity(score)).unwrap();
            assert_eq!(payload.sensitivity_level, level.as_str());
            assert_eq!(payload.settings.lighting.default, level.band());
        }
    }
}
