//! Step domain model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Configuration keys understood by each step kind
pub const LENGTH_KEY: &str = "length";
pub const STYLE_KEY: &str = "style";
pub const TARGET_LANGUAGE_KEY: &str = "targetLanguage";
pub const TONE_KEY: &str = "tone";
pub const EXTRACT_TYPE_KEY: &str = "extractType";

pub const LANGUAGE_OPTIONS: &[&str] = &[
    "french",
    "spanish",
    "german",
    "italian",
    "portuguese",
    "dutch",
    "chinese",
    "japanese",
];
pub const TONE_OPTIONS: &[&str] = &["casual", "formal", "professional", "friendly"];
pub const LENGTH_OPTIONS: &[&str] = &["short", "medium", "long"];
pub const STYLE_OPTIONS: &[&str] = &["bullet-points", "paragraph"];
pub const EXTRACT_OPTIONS: &[&str] = &["keywords", "entities", "both"];

/// The closed set of transformations a step can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Summarize,
    Translate,
    Rewrite,
    Extract,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::Summarize,
        StepKind::Translate,
        StepKind::Rewrite,
        StepKind::Extract,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Summarize => "Summarize",
            StepKind::Translate => "Translate",
            StepKind::Rewrite => "Rewrite",
            StepKind::Extract => "Extract",
        }
    }

    /// One-line description of what the step does
    pub fn description(self) -> &'static str {
        match self {
            StepKind::Summarize => "Create a concise summary of the text",
            StepKind::Translate => "Translate text to another language",
            StepKind::Rewrite => "Rewrite text with a different tone",
            StepKind::Extract => "Extract keywords or entities from text",
        }
    }

    /// Config keys this kind reads, with their known values
    pub fn config_keys(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            StepKind::Summarize => &[(LENGTH_KEY, LENGTH_OPTIONS), (STYLE_KEY, STYLE_OPTIONS)],
            StepKind::Translate => &[(TARGET_LANGUAGE_KEY, LANGUAGE_OPTIONS)],
            StepKind::Rewrite => &[(TONE_KEY, TONE_OPTIONS)],
            StepKind::Extract => &[(EXTRACT_TYPE_KEY, EXTRACT_OPTIONS)],
        }
    }

    /// Configuration a freshly added step starts with.
    ///
    /// Only summarize comes pre-filled; the other kinds start with an empty
    /// required field that `validate` reports until the user picks a value.
    pub fn default_config(self) -> HashMap<String, String> {
        let pairs: &[(&str, &str)] = match self {
            StepKind::Summarize => &[(LENGTH_KEY, "medium"), (STYLE_KEY, "paragraph")],
            StepKind::Translate => &[(TARGET_LANGUAGE_KEY, "")],
            StepKind::Rewrite => &[(TONE_KEY, "")],
            StepKind::Extract => &[(EXTRACT_TYPE_KEY, "")],
        };
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Summarize => "summarize",
            StepKind::Translate => "translate",
            StepKind::Rewrite => "rewrite",
            StepKind::Extract => "extract",
        };
        f.write_str(name)
    }
}

/// A single stage in a pipeline. Never mutated by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique step identifier within a pipeline
    pub id: String,

    /// Transformation performed by this step
    pub kind: StepKind,

    /// Kind-specific settings (e.g. `targetLanguage` for translate)
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl Step {
    /// Create a step with an explicit configuration
    pub fn new(id: impl Into<String>, kind: StepKind, config: HashMap<String, String>) -> Self {
        Self {
            id: id.into(),
            kind,
            config,
        }
    }

    /// Create a step with the kind's default configuration
    pub fn with_defaults(id: impl Into<String>, kind: StepKind) -> Self {
        Self::new(id, kind, kind.default_config())
    }

    /// Set a single config value
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Config value, treating an empty string the same as a missing key
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// A configuration problem found on a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub step_id: String,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.step_id, self.field, self.message)
    }
}

/// Check that a step has the fields its kind requires.
///
/// Advisory only: the prompt resolver falls back to defaults, so a step with
/// errors here still runs.
pub fn validate(step: &Step) -> Vec<ValidationError> {
    let required = match step.kind {
        StepKind::Summarize => None,
        StepKind::Translate => Some((TARGET_LANGUAGE_KEY, "Target language is required")),
        StepKind::Rewrite => Some((TONE_KEY, "Tone is required")),
        StepKind::Extract => Some((EXTRACT_TYPE_KEY, "Extract type is required")),
    };

    match required {
        Some((field, message)) if step.config_value(field).is_none() => vec![ValidationError {
            step_id: step.id.clone(),
            field: field.to_string(),
            message: message.to_string(),
        }],
        _ => Vec::new(),
    }
}

/// Validate every step in order
pub fn validate_steps(steps: &[Step]) -> Vec<ValidationError> {
    steps.iter().flat_map(validate).collect()
}
