//! Settings payload encoding
//!
//! Wraps engine output in an `auxa.settings.v1` envelope carrying producer
//! metadata and non-fatal warnings. The settings themselves are deterministic;
//! only `computedAtUtc` and `instanceId` vary between runs.

use crate::error::LightingError;
use crate::profile::UserProfile;
use crate::sensitivity::SensitivityLevel;
use crate::types::{ComfortSettings, SettingsPayload, SettingsProducer};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current settings payload schema
pub const SETTINGS_SCHEMA_VERSION: &str = "auxa.settings.v1";

/// Encoder for settings payloads
pub struct SettingsEncoder {
    instance_id: String,
}

impl Default for SettingsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// `level` must be the level `settings` were composed with; only the
    /// engine calls this.
    pub(crate) fn encode(
        &self,
        profile: &UserProfile,
        level: SensitivityLevel,
        settings: ComfortSettings,
    ) -> SettingsPayload {
        self.encode_at(profile, level, settings, Utc::now())
    }

    /// Encode with an explicit computation time
    pub(crate) fn encode_at(
        &self,
        profile: &UserProfile,
        level: SensitivityLevel,
        settings: ComfortSettings,
        computed_at: DateTime<Utc>,
    ) -> SettingsPayload {
        let warnings = collect_warnings(profile, &settings);

        SettingsPayload {
            schema_version: SETTINGS_SCHEMA_VERSION.to_string(),
            producer: SettingsProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: computed_at.to_rfc3339(),
            sensitivity_level: level.as_str().to_string(),
            settings,
            warnings,
        }
    }

    /// Encode to JSON string
    pub(crate) fn encode_to_json(
        &self,
        profile: &UserProfile,
        level: SensitivityLevel,
        settings: ComfortSettings,
    ) -> Result<String, LightingError> {
        let payload = self.encode(profile, level, settings);
        serde_json::to_string_pretty(&payload)
            .map_err(|e| LightingError::EncodingError(e.to_string()))
    }
}

fn collect_warnings(profile: &UserProfile, settings: &ComfortSettings) -> Vec<String> {
    let mut warnings: Vec<String> = profile
        .unrecognized_tags()
        .into_iter()
        .map(|tag| format!("unrecognized {} tag: {}", tag.field, tag.value))
        .collect();

    let default = &settings.lighting.default;
    if default.color_temp.is_inverted() {
        warnings.push(format!(
            "default color temperature range is inverted ({}K > {}K)",
            default.color_temp.min, default.color_temp.max
        ));
    }
    if default.brightness.is_inverted() {
        warnings.push(format!(
            "default brightness range is inverted ({} lux > {} lux)",
            default.brightness.min, default.brightness.max
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calculate_comfort_settings;
    use crate::profile::{LightReaction, LightType, Location};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_envelope_fields() {
        let profile = UserProfile::with_sensitivity(4);
        let settings = calculate_comfort_settings(&profile).unwrap();
        let encoder = SettingsEncoder::with_instance_id("test-instance".to_string());

        let payload = encoder.encode_at(&profile, SensitivityLevel::High, settings, fixed_time());

        assert_eq!(payload.schema_version, "auxa.settings.v1");
        assert_eq!(payload.producer.name, "auxa-lighting");
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.computed_at_utc, "2024-03-01T12:00:00+00:00");
        assert_eq!(payload.sensitivity_level, "high");
        assert!(payload.warnings.is_empty());
    }

    #[test]
    fn test_reproducible_with_fixed_time() {
        let profile = UserProfile::with_sensitivity(2);
        let encoder = SettingsEncoder::with_instance_id("a".to_string());
        let encode = || {
            let settings = calculate_comfort_settings(&profile).unwrap();
            let payload =
                encoder.encode_at(&profile, SensitivityLevel::Moderate, settings, fixed_time());
            serde_json::to_string(&payload).unwrap()
        };
        assert_eq!(encode(), encode());
    }

    #[test]
    fn test_warnings() {
        let profile = UserProfile {
            primary_usage: [Location::Other("Mars".to_string())].into_iter().collect(),
            uncomfortable_light_types: [LightType::BrightWhite].into_iter().collect(),
            light_reactions: [LightReaction::Headaches, LightReaction::Anxiety]
                .into_iter()
                .collect(),
            ..UserProfile::with_sensitivity(1)
        };
        let settings = calculate_comfort_settings(&profile).unwrap();
        let payload = SettingsEncoder::new().encode(&profile, SensitivityLevel::Low, settings);

        assert_eq!(
            payload.warnings,
            vec![
                "unrecognized primaryUsage tag: Mars".to_string(),
                "default color temperature range is inverted (3000K > 2700K)".to_string(),
                "default brightness range is inverted (150 lux > 100 lux)".to_string(),
            ]
        );
    }

    #[test]
    fn test_listed_locations_without_bands_not_warned() {
        let profile = UserProfile::from_json(
            r#"{"lightSensitivity": 3, "primaryUsage": ["Other", "Outdoors"]}"#,
        )
        .unwrap();
        let settings = calculate_comfort_settings(&profile).unwrap();
        let payload = SettingsEncoder::new().encode(&profile, SensitivityLevel::Moderate, settings);
        assert!(payload.warnings.is_empty());
    }

    #[test]
    fn test_encode_to_json() {
        let profile = UserProfile::with_sensitivity(3);
        let settings = calculate_comfort_settings(&profile).unwrap();
        let json = SettingsEncoder::new()
            .encode_to_json(&profile, SensitivityLevel::Moderate, settings)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schemaVersion"], "auxa.settings.v1");
        assert_eq!(value["settings"]["lighting"]["default"]["transitionSpeed"], "medium");
        assert_eq!(value["settings"]["notifications"]["checkInIntervalMinutes"], 30);
        assert_eq!(value["settings"]["stressResponse"]["undoTimeoutSeconds"], 0);
    }
}
