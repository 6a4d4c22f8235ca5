//! Fixed lighting bands
//!
//! Brightness in lux, color temperature in kelvin.

use crate::profile::Location;
use crate::types::{Bounds, LightBand, LocationSettings, TimeBasedSettings, TransitionSpeed};

pub const SENSITIVITY_HIGH: LightBand = LightBand::with_transition(
    Bounds::new(60, 100),
    Bounds::new(2700, 3000),
    TransitionSpeed::Slow,
);

pub const SENSITIVITY_MODERATE: LightBand = LightBand::with_transition(
    Bounds::new(100, 150),
    Bounds::new(2700, 3500),
    TransitionSpeed::Medium,
);

pub const SENSITIVITY_LOW: LightBand = LightBand::with_transition(
    Bounds::new(150, 300),
    Bounds::new(2700, 4000),
    TransitionSpeed::Fast,
);

/// Maximally dim and warm
pub const CALM_MODE: LightBand = LightBand::with_transition(
    Bounds::fixed(60),
    Bounds::fixed(2700),
    TransitionSpeed::VerySlow,
);

pub const TASK_MODE: LightBand = LightBand::with_transition(
    Bounds::new(150, 300),
    Bounds::new(3000, 4000),
    TransitionSpeed::Medium,
);

pub const TIME_BASED: TimeBasedSettings = TimeBasedSettings {
    morning: LightBand::new(Bounds::new(150, 300), Bounds::new(3500, 4000)),
    afternoon: LightBand::new(Bounds::new(100, 200), Bounds::new(3000, 3500)),
    evening: LightBand::new(Bounds::new(60, 100), Bounds::new(2700, 3000)),
};

pub const HOME: LocationSettings = LocationSettings {
    default: LightBand::new(Bounds::new(100, 200), Bounds::new(2700, 3500)),
    evening: Some(LightBand::new(Bounds::new(60, 100), Bounds::new(2700, 3000))),
};

pub const SCHOOL: LocationSettings = LocationSettings {
    default: LightBand::new(Bounds::new(150, 300), Bounds::new(3000, 4000)),
    evening: None,
};

pub const WORKPLACE: LocationSettings = LocationSettings {
    default: LightBand::new(Bounds::new(150, 300), Bounds::new(3000, 4000)),
    evening: None,
};

pub const CLINIC: LocationSettings = LocationSettings {
    default: LightBand::new(Bounds::new(100, 150), Bounds::new(2700, 3000)),
    evening: None,
};

/// Bands for a usage location, if it has any
pub fn location_settings(location: &Location) -> Option<LocationSettings> {
    match location {
        Location::Home => Some(HOME),
        Location::School => Some(SCHOOL),
        Location::Workplace => Some(WORKPLACE),
        Location::Clinic => Some(CLINIC),
        Location::Outdoors | Location::Unlisted | Location::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_home_has_evening_band() {
        assert!(HOME.evening.is_some());
        for location in [Location::School, Location::Workplace, Location::Clinic] {
            let settings = location_settings(&location).unwrap();
            assert!(settings.evening.is_none());
        }
    }

    #[test]
    fn test_outdoors_has_no_preset() {
        assert!(location_settings(&Location::Outdoors).is_none());
        assert!(location_settings(&Location::Unlisted).is_none());
        assert!(location_settings(&Location::Other("Mars".to_string())).is_none());
    }
}
