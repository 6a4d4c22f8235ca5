//! Notification and stress-response policy
//!
//! Both derivations read the profile independently of lighting composition
//! and never fail: unanswered questions take the `Unspecified` branch.

use crate::profile::{
    AdjustmentComfort, CopingMethod, NotificationPreference, StressAwareness, UserProfile, YesNo,
};
use crate::types::{NotificationSettings, StressResponseSettings};

/// Check-in cadence for users who usually notice their own stress
pub const DEFAULT_CHECK_IN_MINUTES: u32 = 30;
/// Check-in cadence for users who rarely or never notice it
pub const RELAXED_CHECK_IN_MINUTES: u32 = 60;
/// Undo window offered to users who only accept reversible adjustments
pub const UNDO_TIMEOUT_SECONDS: u32 = 30;

pub struct NotificationPolicy;

impl NotificationPolicy {
    pub fn derive(profile: &UserProfile) -> NotificationSettings {
        let check_in_interval_minutes = match profile.stress_awareness {
            StressAwareness::Rarely | StressAwareness::Never => RELAXED_CHECK_IN_MINUTES,
            _ => DEFAULT_CHECK_IN_MINUTES,
        };

        NotificationSettings {
            notify_on_adjustment: profile.notification_preference
                == NotificationPreference::Always,
            notify_on_significant_change: profile.notification_preference
                == NotificationPreference::OnlySometimes,
            check_in_interval_minutes,
            allow_manual_override: profile.manual_override == YesNo::Yes,
            track_effectiveness: profile.track_effectiveness == YesNo::Yes,
        }
    }
}

pub struct StressResponsePolicy;

impl StressResponsePolicy {
    pub fn derive(profile: &UserProfile) -> StressResponseSettings {
        let coping = &profile.stress_coping_methods;
        let undo_timeout_seconds = match profile.comfort_with_adjustments {
            AdjustmentComfort::OnlyIfICanUndoIt => UNDO_TIMEOUT_SECONDS,
            _ => 0,
        };

        StressResponseSettings {
            enable_calm_mode: profile.overwhelmed_by_light == YesNo::Yes,
            gradual_dimming: coping.contains(&CopingMethod::TurnOffLights)
                || coping.contains(&CopingMethod::LeaveTheRoom),
            undo_timeout_seconds,
            automatic_adjustments: profile.comfort_with_adjustments == AdjustmentComfort::Yes,
        }
    }
}
