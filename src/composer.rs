//! Settings composition
//!
//! Layers mode, time and location overrides onto the sensitivity band, then
//! tightens the default band for discomforts and reactions. Each stage takes
//! the previous snapshot by value and returns the next one; stage order is
//! fixed and clamps read the already-clamped values of earlier stages.
//!
//! Clamps only ever tighten a bound. An inverted range (`min > max`) produced
//! by stacked reaction clamps is returned unchanged.

use crate::presets::{self, CALM_MODE, TASK_MODE, TIME_BASED};
use crate::profile::{LightReaction, LightType, Location, UserProfile, YesNo};
use crate::sensitivity::SensitivityLevel;
use crate::types::{LightBand, LightingSettings};

/// One step of the composition pipeline
pub type Stage = fn(LightingSettings, &UserProfile) -> LightingSettings;

/// Pipeline stages in application order
pub const STAGES: [(&str, Stage); 6] = [
    ("calm_mode", apply_calm_mode),
    ("task_mode", apply_task_mode),
    ("time_based", apply_time_based),
    ("location_based", apply_location_based),
    ("discomfort_clamp", apply_discomfort_clamp),
    ("reaction_clamp", apply_reaction_clamp),
];

/// Color temperature ceiling when bright white light is uncomfortable (K)
pub const BRIGHT_WHITE_MAX_KELVIN: u32 = 3000;
/// Ceilings for headache or nausea reactions
pub const SOMATIC_MAX_KELVIN: u32 = 2700;
pub const SOMATIC_MAX_LUX: u32 = 100;
/// Floor and ceiling for anxiety or focus reactions
pub const FOCUS_MIN_KELVIN: u32 = 3000;
pub const FOCUS_MAX_LUX: u32 = 150;

/// Composes lighting settings from a resolved sensitivity level
pub struct SettingsComposer;

impl SettingsComposer {
    pub fn compose(profile: &UserProfile, level: SensitivityLevel) -> LightingSettings {
        let base = LightingSettings::from_default(level.band());

        let settings = STAGES
            .iter()
            .fold(base, |settings, (_, stage)| stage(settings, profile));

        if settings.default.color_temp.is_inverted() {
            tracing::debug!(
                min = settings.default.color_temp.min,
                max = settings.default.color_temp.max,
                "default color temperature range is inverted"
            );
        }
        settings
    }
}

pub fn apply_calm_mode(settings: LightingSettings, profile: &UserProfile) -> LightingSettings {
    if profile.overwhelmed_by_light != YesNo::Yes {
        return settings;
    }
    tracing::debug!("calm mode enabled");
    LightingSettings {
        calm_mode: Some(CALM_MODE),
        ..settings
    }
}

pub fn apply_task_mode(settings: LightingSettings, profile: &UserProfile) -> LightingSettings {
    let needs_task_light = profile.primary_usage.contains(&Location::Workplace)
        || profile.primary_usage.contains(&Location::School);
    if !needs_task_light {
        return settings;
    }
    tracing::debug!("task mode enabled");
    LightingSettings {
        task_mode: Some(TASK_MODE),
        ..settings
    }
}

pub fn apply_time_based(settings: LightingSettings, profile: &UserProfile) -> LightingSettings {
    if profile.light_needs_change != YesNo::Yes {
        return settings;
    }
    tracing::debug!("time-based bands enabled");
    LightingSettings {
        time_based: Some(TIME_BASED),
        ..settings
    }
}

/// Unrecognized locations are skipped
pub fn apply_location_based(
    settings: LightingSettings,
    profile: &UserProfile,
) -> LightingSettings {
    let mut location_based = settings.location_based;
    for location in &profile.primary_usage {
        if let Some(bands) = presets::location_settings(location) {
            tracing::debug!(location = location.key(), "location bands attached");
            location_based.insert(location.clone(), bands);
        }
    }
    LightingSettings {
        location_based,
        ..settings
    }
}

pub fn apply_discomfort_clamp(
    settings: LightingSettings,
    profile: &UserProfile,
) -> LightingSettings {
    let types = &profile.uncomfortable_light_types;
    let mut default = settings.default;

    if types.contains(&LightType::FlickeringLights) {
        default = LightBand {
            flicker_free: true,
            ..default
        };
    }
    if types.contains(&LightType::BrightWhite) {
        default = LightBand {
            color_temp: default.color_temp.cap_max(BRIGHT_WHITE_MAX_KELVIN),
            ..default
        };
    }

    LightingSettings { default, ..settings }
}

pub fn apply_reaction_clamp(
    settings: LightingSettings,
    profile: &UserProfile,
) -> LightingSettings {
    let reactions = &profile.light_reactions;
    let mut default = settings.default;

    if reactions.contains(&LightReaction::Headaches) || reactions.contains(&LightReaction::Nausea)
    {
        default = LightBand {
            color_temp: default.color_temp.cap_max(SOMATIC_MAX_KELVIN),
            brightness: default.brightness.cap_max(SOMATIC_MAX_LUX),
            ..default
        };
    }
    if reactions.contains(&LightReaction::Anxiety)
        || reactions.contains(&LightReaction::TroubleFocusing)
    {
        default = LightBand {
            color_temp: default.color_temp.raise_min(FOCUS_MIN_KELVIN),
            brightness: default.brightness.cap_max(FOCUS_MAX_LUX),
            ..default
        };
    }

    LightingSettings { default, ..settings }
}
