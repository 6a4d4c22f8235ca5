//! Auxa Lighting - Deterministic lighting policy engine
//!
//! Turns a user's sensory-profile questionnaire answers into concrete lighting,
//! notification and stress-response settings through a pure pipeline:
//! sensitivity resolution → settings composition (overrides, then clamps),
//! with notification and stress policy derived independently from the same
//! profile.
//!
//! The engine performs no I/O. Profile storage, device control and display are
//! left to the host application.

pub mod composer;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod policy;
pub mod presets;
pub mod profile;
pub mod sensitivity;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use encoder::{SettingsEncoder, SETTINGS_SCHEMA_VERSION};
pub use engine::{
    calculate_comfort_settings, calculate_lighting_settings, calculate_notification_settings,
    calculate_stress_response_settings, profile_to_lighting, profile_to_settings, LightingEngine,
};
pub use error::LightingError;
pub use profile::{ProfileReport, UserProfile};
pub use sensitivity::{SensitivityLevel, SensitivityScore};
pub use types::{
    ComfortSettings, LightingSettings, NotificationSettings, SettingsPayload,
    StressResponseSettings,
};

/// Engine version embedded in all settings payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for settings payloads
pub const PRODUCER_NAME: &str = "auxa-lighting";
