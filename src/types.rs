//! Core output types for the Auxa lighting engine
//!
//! These records are what the engine hands back to the host application:
//! lighting bands per mode, notification cadence, and stress-response policy.
//! Field names serialize in camelCase to match the host's settings documents.

use crate::profile::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive min/max pair (lux for brightness, kelvin for color temperature)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A single fixed value
    pub const fn fixed(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Lower the upper bound to `ceiling` if it is above it. Never raises it.
    pub fn cap_max(self, ceiling: u32) -> Self {
        Self {
            min: self.min,
            max: self.max.min(ceiling),
        }
    }

    /// Raise the lower bound to `floor` if it is below it. Never lowers it.
    ///
    /// The result may be inverted (`min > max`); callers surface it as-is.
    pub fn raise_min(self, floor: u32) -> Self {
        Self {
            min: self.min.max(floor),
            max: self.max,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

/// How quickly lights move between levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSpeed {
    VerySlow,
    Slow,
    Medium,
    Fast,
}

impl TransitionSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionSpeed::VerySlow => "very_slow",
            TransitionSpeed::Slow => "slow",
            TransitionSpeed::Medium => "medium",
            TransitionSpeed::Fast => "fast",
        }
    }
}

/// A brightness/color-temperature band, optionally with a transition speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightBand {
    /// Brightness range (lux)
    pub brightness: Bounds,
    /// Color temperature range (kelvin)
    pub color_temp: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_speed: Option<TransitionSpeed>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flicker_free: bool,
}

impl LightBand {
    /// Band without a transition speed (time-of-day and location bands)
    pub const fn new(brightness: Bounds, color_temp: Bounds) -> Self {
        Self {
            brightness,
            color_temp,
            transition_speed: None,
            flicker_free: false,
        }
    }

    pub const fn with_transition(
        brightness: Bounds,
        color_temp: Bounds,
        transition_speed: TransitionSpeed,
    ) -> Self {
        Self {
            brightness,
            color_temp,
            transition_speed: Some(transition_speed),
            flicker_free: false,
        }
    }
}

/// Time-of-day bands, present when the user reports changing needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBasedSettings {
    pub morning: LightBand,
    pub afternoon: LightBand,
    pub evening: LightBand,
}

/// Bands attached to one usage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSettings {
    pub default: LightBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening: Option<LightBand>,
}

/// Complete lighting configuration derived from a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingSettings {
    /// Sensitivity band after discomfort and reaction clamps
    pub default: LightBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calm_mode: Option<LightBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_mode: Option<LightBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_based: Option<TimeBasedSettings>,
    /// Keyed by lowercase location name; empty when no usage location is recognized
    #[serde(default)]
    pub location_based: BTreeMap<Location, LocationSettings>,
}

impl LightingSettings {
    /// Settings holding only a default band, every override empty
    pub fn from_default(default: LightBand) -> Self {
        Self {
            default,
            calm_mode: None,
            task_mode: None,
            time_based: None,
            location_based: BTreeMap::new(),
        }
    }

    /// True when every optional section is empty
    pub fn has_no_overrides(&self) -> bool {
        self.calm_mode.is_none()
            && self.task_mode.is_none()
            && self.time_based.is_none()
            && self.location_based.is_empty()
    }
}

/// Notification cadence derived from questionnaire answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub notify_on_adjustment: bool,
    pub notify_on_significant_change: bool,
    pub check_in_interval_minutes: u32,
    pub allow_manual_override: bool,
    pub track_effectiveness: bool,
}

/// Automatic adjustment and undo policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressResponseSettings {
    pub enable_calm_mode: bool,
    pub gradual_dimming: bool,
    pub undo_timeout_seconds: u32,
    pub automatic_adjustments: bool,
}

/// All three engine outputs for one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComfortSettings {
    pub lighting: LightingSettings,
    pub notifications: NotificationSettings,
    pub stress_response: StressResponseSettings,
}

/// Payload producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Settings envelope handed to storage or display collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub schema_version: String,
    pub producer: SettingsProducer,
    pub computed_at_utc: String,
    /// Resolved sensitivity level (high, moderate, low)
    pub sensitivity_level: String,
    pub settings: ComfortSettings,
    /// Non-fatal observations (unrecognized tags, inverted ranges)
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_max_never_raises() {
        let bounds = Bounds::new(100, 150);
        assert_eq!(bounds.cap_max(120), Bounds::new(100, 120));
        assert_eq!(bounds.cap_max(200), bounds);
    }

    #[test]
    fn test_raise_min_can_invert() {
        let bounds = Bounds::new(2700, 2700).raise_min(3000);
        assert_eq!(bounds, Bounds::new(3000, 2700));
        assert!(bounds.is_inverted());
    }

    #[test]
    fn test_light_band_serialization() {
        let band = LightBand::with_transition(
            Bounds::fixed(60),
            Bounds::fixed(2700),
            TransitionSpeed::VerySlow,
        );
        let json = serde_json::to_value(band).unwrap();
        assert_eq!(json["brightness"]["min"], 60);
        assert_eq!(json["colorTemp"]["max"], 2700);
        assert_eq!(json["transitionSpeed"], "very_slow");
        assert!(json.get("flickerFree").is_none());

        let plain = serde_json::to_value(LightBand::new(Bounds::new(1, 2), Bounds::new(3, 4))).unwrap();
        assert!(plain.get("transitionSpeed").is_none());
    }

    #[test]
    fn test_empty_sections_omitted() {
        let settings = LightingSettings::from_default(LightBand::new(
            Bounds::new(100, 150),
            Bounds::new(2700, 3500),
        ));
        assert!(settings.has_no_overrides());

        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("calmMode").is_none());
        assert!(json.get("taskMode").is_none());
        assert!(json.get("timeBased").is_none());
        assert_eq!(json["locationBased"], serde_json::json!({}));
    }
}
