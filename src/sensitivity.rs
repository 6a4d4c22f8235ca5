//! Sensitivity resolution
//!
//! Maps the 1-5 self-reported light sensitivity onto one of three base bands.
//! This is the only check in the engine that can reject a profile.

use crate::error::LightingError;
use crate::presets::{SENSITIVITY_HIGH, SENSITIVITY_LOW, SENSITIVITY_MODERATE};
use crate::profile::{SensitivityAnswer, UserProfile};
use crate::types::LightBand;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// A validated sensitivity score in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SensitivityScore(u8);

impl SensitivityScore {
    pub fn new(score: i64) -> Result<Self, LightingError> {
        if (MIN_SCORE..=MAX_SCORE).contains(&score) {
            Ok(Self(score as u8))
        } else {
            Err(LightingError::InvalidProfile(format!(
                "lightSensitivity must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn level(&self) -> SensitivityLevel {
        match self.0 {
            4..=u8::MAX => SensitivityLevel::High,
            2..=3 => SensitivityLevel::Moderate,
            _ => SensitivityLevel::Low,
        }
    }
}

impl TryFrom<&SensitivityAnswer> for SensitivityScore {
    type Error = LightingError;

    fn try_from(answer: &SensitivityAnswer) -> Result<Self, Self::Error> {
        match answer {
            SensitivityAnswer::Score(score) => SensitivityScore::new(*score),
            SensitivityAnswer::Malformed(raw) => Err(LightingError::InvalidProfile(format!(
                "lightSensitivity must be an integer, got {raw}"
            ))),
            SensitivityAnswer::Missing => Err(LightingError::InvalidProfile(
                "lightSensitivity is required".to_string(),
            )),
        }
    }
}

/// Base band selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    /// Score 4-5
    High,
    /// Score 2-3
    Moderate,
    /// Score 1
    Low,
}

impl SensitivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::High => "high",
            SensitivityLevel::Moderate => "moderate",
            SensitivityLevel::Low => "low",
        }
    }

    pub fn band(&self) -> LightBand {
        match self {
            SensitivityLevel::High => SENSITIVITY_HIGH,
            SensitivityLevel::Moderate => SENSITIVITY_MODERATE,
            SensitivityLevel::Low => SENSITIVITY_LOW,
        }
    }
}

/// Resolves a profile's sensitivity answer to a level
pub struct SensitivityResolver;

impl SensitivityResolver {
    pub fn resolve(profile: &UserProfile) -> Result<SensitivityLevel, LightingError> {
        let score = SensitivityScore::try_from(&profile.light_sensitivity).map_err(|e| {
            tracing::warn!(error = %e, "rejecting profile");
            e
        })?;
        let level = score.level();
        tracing::debug!(score = score.value(), level = level.as_str(), "resolved sensitivity");
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bounds, TransitionSpeed};

    fn resolve(score: i64) -> Result<SensitivityLevel, LightingError> {
        SensitivityResolver::resolve(&UserProfile::with_sensitivity(score))
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(resolve(5).unwrap(), SensitivityLevel::High);
        assert_eq!(resolve(4).unwrap(), SensitivityLevel::High);
        assert_eq!(resolve(3).unwrap(), SensitivityLevel::Moderate);
        assert_eq!(resolve(2).unwrap(), SensitivityLevel::Moderate);
        assert_eq!(resolve(1).unwrap(), SensitivityLevel::Low);
    }

    #[test]
    fn test_out_of_range_rejected() {
        for score in [0, 6, -1, i64::MAX] {
            assert!(matches!(
                resolve(score),
                Err(LightingError::InvalidProfile(_))
            ));
        }
    }

    #[test]
    fn test_missing_and_malformed_rejected() {
        let missing = UserProfile::default();
        assert!(matches!(
            SensitivityResolver::resolve(&missing),
            Err(LightingError::InvalidProfile(_))
        ));

        let malformed = UserProfile {
            light_sensitivity: SensitivityAnswer::Malformed("high".to_string()),
            ..Default::default()
        };
        let err = SensitivityResolver::resolve(&malformed).unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_level_bands() {
        let high = SensitivityLevel::High.band();
        assert_eq!(high.brightness, Bounds::new(60, 100));
        assert_eq!(high.color_temp, Bounds::new(2700, 3000));
        assert_eq!(high.transition_speed, Some(TransitionSpeed::Slow));

        let moderate = SensitivityLevel::Moderate.band();
        assert_eq!(moderate.brightness, Bounds::new(100, 150));
        assert_eq!(moderate.color_temp, Bounds::new(2700, 3500));
        assert_eq!(moderate.transition_speed, Some(TransitionSpeed::Medium));

        let low = SensitivityLevel::Low.band();
        assert_eq!(low.brightness, Bounds::new(150, 300));
        assert_eq!(low.color_temp, Bounds::new(2700, 4000));
        assert_eq!(low.transition_speed, Some(TransitionSpeed::Fast));
    }
}
