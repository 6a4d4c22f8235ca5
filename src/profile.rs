//! Sensory-profile questionnaire input
//!
//! The host application stores questionnaire answers as a loosely typed
//! document: slider values may arrive as strings, unanswered radio groups as
//! `""`, and unrelated account fields sit alongside the answers. Decoding here
//! is lenient by construction. Every field except `lightSensitivity` falls back
//! to `Unspecified` or an empty set, and unknown tags are kept as `Other` so
//! validation can report them while the rules ignore them.
//!
//! Answers and tags match the questionnaire's values exactly. Only
//! `primaryUsage` locations match case-insensitively.

use crate::error::LightingError;
use crate::sensitivity::SensitivityScore;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

// ============================================================================
// Light sensitivity
// ============================================================================

/// Raw `lightSensitivity` answer, kept as supplied until the resolver checks it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum SensitivityAnswer {
    /// An integer score (range is checked later)
    Score(i64),
    /// Present but not integral, e.g. `"very"`, `3.5` or `"3.5"`
    Malformed(String),
    #[default]
    Missing,
}

impl SensitivityAnswer {
    fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => SensitivityAnswer::Missing,
            Some(Value::Number(n)) => match n.as_i64().or_else(|| n.as_f64().and_then(integral)) {
                Some(score) => SensitivityAnswer::Score(score),
                None => SensitivityAnswer::Malformed(n.to_string()),
            },
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return SensitivityAnswer::Missing;
                }
                let score = trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(integral));
                match score {
                    Some(score) => SensitivityAnswer::Score(score),
                    None => SensitivityAnswer::Malformed(s),
                }
            }
            Some(other) => SensitivityAnswer::Malformed(other.to_string()),
        }
    }
}

/// Whole-valued floats count as integers: `4.0` and `"4.0"` both score 4
fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

impl<'de> Deserialize<'de> for SensitivityAnswer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(SensitivityAnswer::from_value(value))
    }
}

// ============================================================================
// Single-choice answers
// ============================================================================

/// A single-choice questionnaire answer with an `Unspecified` fallback
pub trait Answer: Sized + Default {
    /// Match one of the questionnaire's exact answer values
    fn from_value(answer: &str) -> Option<Self>;

    /// Unknown, empty or differently spelled answers become the default
    fn parse(text: &str) -> Self {
        Self::from_value(text).unwrap_or_default()
    }
}

fn deserialize_answer<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Answer,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => T::parse(&s),
        _ => T::default(),
    })
}

/// yes / no question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
    #[default]
    Unspecified,
}

impl Answer for YesNo {
    fn from_value(answer: &str) -> Option<Self> {
        match answer {
            "yes" => Some(YesNo::Yes),
            "no" => Some(YesNo::No),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for YesNo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_answer(deserializer)
    }
}

/// How often the user wants to hear about adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPreference {
    Always,
    OnlySometimes,
    Never,
    #[default]
    Unspecified,
}

impl Answer for NotificationPreference {
    fn from_value(answer: &str) -> Option<Self> {
        match answer {
            "always" => Some(NotificationPreference::Always),
            "only_sometimes" => Some(NotificationPreference::OnlySometimes),
            "never" => Some(NotificationPreference::Never),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for NotificationPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_answer(deserializer)
    }
}

/// How often the user notices their own stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StressAwareness {
    Always,
    Sometimes,
    Rarely,
    Never,
    #[default]
    Unspecified,
}

impl Answer for StressAwareness {
    fn from_value(answer: &str) -> Option<Self> {
        match answer {
            "always" => Some(StressAwareness::Always),
            "sometimes" => Some(StressAwareness::Sometimes),
            "rarely" => Some(StressAwareness::Rarely),
            "never" => Some(StressAwareness::Never),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for StressAwareness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_answer(deserializer)
    }
}

/// Comfort with the app adjusting lights on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentComfort {
    Yes,
    No,
    #[serde(rename = "only_if_i_can_undo_it")]
    OnlyIfICanUndoIt,
    #[default]
    Unspecified,
}

impl Answer for AdjustmentComfort {
    fn from_value(answer: &str) -> Option<Self> {
        match answer {
            "yes" => Some(AdjustmentComfort::Yes),
            "no" => Some(AdjustmentComfort::No),
            "only_if_i_can_undo_it" => Some(AdjustmentComfort::OnlyIfICanUndoIt),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for AdjustmentComfort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_answer(deserializer)
    }
}

// ============================================================================
// Multi-choice tags
// ============================================================================

fn tag_strings(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    }
}

fn tag_set<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Ord,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(tag_strings(value).into_iter().map(T::from).collect())
}

/// Where the user mainly uses their lights
///
/// Serializes as the lowercase key used in `locationBased`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Location {
    Home,
    School,
    Workplace,
    Clinic,
    Outdoors,
    /// The questionnaire's own "Other" choice
    Unlisted,
    /// Text that matches no questionnaire choice
    Other(String),
}

impl Location {
    /// Lowercase key
    pub fn key(&self) -> &str {
        match self {
            Location::Home => "home",
            Location::School => "school",
            Location::Workplace => "workplace",
            Location::Clinic => "clinic",
            Location::Outdoors => "outdoors",
            Location::Unlisted => "other",
            Location::Other(name) => name.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Location::Other(_))
    }
}

impl From<String> for Location {
    fn from(label: String) -> Self {
        match label.to_lowercase().as_str() {
            "home" => Location::Home,
            "school" => Location::School,
            "workplace" => Location::Workplace,
            "clinic" => Location::Clinic,
            "outdoors" => Location::Outdoors,
            "other" => Location::Unlisted,
            _ => Location::Other(label),
        }
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.key().to_string()
    }
}

/// Light sources the user finds uncomfortable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum LightType {
    FlickeringLights,
    BrightWhite,
    Other(String),
}

impl LightType {
    pub fn label(&self) -> &str {
        match self {
            LightType::FlickeringLights => "Flickering lights",
            LightType::BrightWhite => "Bright white",
            LightType::Other(label) => label.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, LightType::Other(_))
    }
}

impl From<String> for LightType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Flickering lights" => LightType::FlickeringLights,
            "Bright white" => LightType::BrightWhite,
            _ => LightType::Other(label),
        }
    }
}

impl From<LightType> for String {
    fn from(light_type: LightType) -> Self {
        light_type.label().to_string()
    }
}

/// Physical or emotional reactions to light
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum LightReaction {
    Headaches,
    Nausea,
    Anxiety,
    TroubleFocusing,
    Other(String),
}

impl LightReaction {
    pub fn label(&self) -> &str {
        match self {
            LightReaction::Headaches => "Headaches",
            LightReaction::Nausea => "Nausea",
            LightReaction::Anxiety => "Anxiety",
            LightReaction::TroubleFocusing => "Trouble focusing",
            LightReaction::Other(label) => label.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, LightReaction::Other(_))
    }
}

impl From<String> for LightReaction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Headaches" => LightReaction::Headaches,
            "Nausea" => LightReaction::Nausea,
            "Anxiety" => LightReaction::Anxiety,
            "Trouble focusing" => LightReaction::TroubleFocusing,
            _ => LightReaction::Other(label),
        }
    }
}

impl From<LightReaction> for String {
    fn from(reaction: LightReaction) -> Self {
        reaction.label().to_string()
    }
}

/// What the user does when light becomes stressful
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CopingMethod {
    TurnOffLights,
    LeaveTheRoom,
    Other(String),
}

impl CopingMethod {
    pub fn label(&self) -> &str {
        match self {
            CopingMethod::TurnOffLights => "Turn off lights",
            CopingMethod::LeaveTheRoom => "Leave the room",
            CopingMethod::Other(label) => label.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, CopingMethod::Other(_))
    }
}

impl From<String> for CopingMethod {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Turn off lights" => CopingMethod::TurnOffLights,
            "Leave the room" => CopingMethod::LeaveTheRoom,
            _ => CopingMethod::Other(label),
        }
    }
}

impl From<CopingMethod> for String {
    fn from(method: CopingMethod) -> Self {
        method.label().to_string()
    }
}

// ============================================================================
// Profile
// ============================================================================

/// One user's questionnaire answers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// 1 (not sensitive) to 5 (extremely sensitive)
    #[serde(default)]
    pub light_sensitivity: SensitivityAnswer,
    #[serde(default)]
    pub overwhelmed_by_light: YesNo,
    #[serde(default, deserialize_with = "tag_set")]
    pub primary_usage: BTreeSet<Location>,
    #[serde(default)]
    pub light_needs_change: YesNo,
    #[serde(default, deserialize_with = "tag_set")]
    pub uncomfortable_light_types: BTreeSet<LightType>,
    #[serde(default, deserialize_with = "tag_set")]
    pub light_reactions: BTreeSet<LightReaction>,
    #[serde(default)]
    pub notification_preference: NotificationPreference,
    #[serde(default)]
    pub stress_awareness: StressAwareness,
    #[serde(default)]
    pub manual_override: YesNo,
    #[serde(default)]
    pub track_effectiveness: YesNo,
    #[serde(default, deserialize_with = "tag_set")]
    pub stress_coping_methods: BTreeSet<CopingMethod>,
    #[serde(default)]
    pub comfort_with_adjustments: AdjustmentComfort,
}

impl UserProfile {
    /// Profile with only a sensitivity score answered
    pub fn with_sensitivity(score: i64) -> Self {
        Self {
            light_sensitivity: SensitivityAnswer::Score(score),
            ..Default::default()
        }
    }

    /// Decode a profile document. Only malformed JSON or a non-object fails.
    pub fn from_json(json: &str) -> Result<Self, LightingError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, LightingError> {
        if !value.is_object() {
            return Err(LightingError::ParseError(
                "profile document must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Tags that no rule recognizes, as `(field, value)` pairs
    pub fn unrecognized_tags(&self) -> Vec<UnrecognizedTag> {
        let mut tags = Vec::new();
        for location in self.primary_usage.iter().filter(|l| !l.is_recognized()) {
            tags.push(UnrecognizedTag::new("primaryUsage", location.key()));
        }
        for light_type in self
            .uncomfortable_light_types
            .iter()
            .filter(|t| !t.is_recognized())
        {
            tags.push(UnrecognizedTag::new(
                "uncomfortableLightTypes",
                light_type.label(),
            ));
        }
        for reaction in self.light_reactions.iter().filter(|r| !r.is_recognized()) {
            tags.push(UnrecognizedTag::new("lightReactions", reaction.label()));
        }
        for method in self
            .stress_coping_methods
            .iter()
            .filter(|m| !m.is_recognized())
        {
            tags.push(UnrecognizedTag::new("stressCopingMethods", method.label()));
        }
        tags
    }

    /// Check the profile without computing settings
    pub fn validate(&self) -> ProfileReport {
        let (sensitivity_level, sensitivity_error) =
            match SensitivityScore::try_from(&self.light_sensitivity) {
                Ok(score) => (Some(score.level().as_str().to_string()), None),
                Err(e) => (None, Some(e.to_string())),
            };

        ProfileReport {
            valid: sensitivity_error.is_none(),
            sensitivity_level,
            sensitivity_error,
            unrecognized_tags: self.unrecognized_tags(),
        }
    }
}

/// Parse a JSON array of profile documents
pub fn parse_profiles_array(json: &str) -> Result<Vec<UserProfile>, LightingError> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    values.into_iter().map(UserProfile::from_value).collect()
}

/// Parse NDJSON, one profile document per line
pub fn parse_profiles_ndjson(ndjson: &str) -> Result<Vec<UserProfile>, LightingError> {
    let mut profiles = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match UserProfile::from_json(trimmed) {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                return Err(LightingError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(profiles)
}

/// A tag the rules do not act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrecognizedTag {
    pub field: String,
    pub value: String,
}

impl UnrecognizedTag {
    fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result of [`UserProfile::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// False only when the sensitivity score cannot be resolved
    pub valid: bool,
    pub sensitivity_level: Option<String>,
    pub sensitivity_error: Option<String>,
    pub unrecognized_tags: Vec<UnrecognizedTag>,
}
