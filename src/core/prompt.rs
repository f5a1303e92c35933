//! Prompt templates for each step kind

use crate::core::step::{
    StepKind, EXTRACT_TYPE_KEY, LENGTH_KEY, STYLE_KEY, TARGET_LANGUAGE_KEY, TONE_KEY,
};
use std::collections::HashMap;

/// Placeholder shown where the step input goes
pub const INPUT_PLACEHOLDER: &str = "{input}";

pub const DEFAULT_LENGTH: &str = "medium";
pub const DEFAULT_STYLE: &str = "paragraph";
pub const DEFAULT_TARGET_LANGUAGE: &str = "spanish";
pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_EXTRACT_TYPE: &str = "keywords";

fn lookup<'a>(config: &'a HashMap<String, String>, key: &str, default: &'a str) -> &'a str {
    config
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Instruction text that precedes the input
fn preamble(kind: StepKind, config: &HashMap<String, String>) -> String {
    match kind {
        StepKind::Summarize => format!(
            "Create a {} summary in {} format of the following text:\n\n",
            lookup(config, LENGTH_KEY, DEFAULT_LENGTH),
            lookup(config, STYLE_KEY, DEFAULT_STYLE),
        ),
        StepKind::Translate => format!(
            "Translate the following text to {}:\n\n",
            lookup(config, TARGET_LANGUAGE_KEY, DEFAULT_TARGET_LANGUAGE),
        ),
        StepKind::Rewrite => format!(
            "Rewrite the following text to sound more {}:\n\n",
            lookup(config, TONE_KEY, DEFAULT_TONE),
        ),
        StepKind::Extract => format!(
            "Extract {} from the following text:\n\n",
            lookup(config, EXTRACT_TYPE_KEY, DEFAULT_EXTRACT_TYPE),
        ),
    }
}

/// The parameterized instruction for a step, with `{input}` left in place.
///
/// Missing or empty config keys fall back to the per-kind default.
pub fn template(kind: StepKind, config: &HashMap<String, String>) -> String {
    format!("{}{}", preamble(kind, config), INPUT_PLACEHOLDER)
}

/// Build the full prompt for a step.
///
/// The input is inserted verbatim, exactly once. Config values are never
/// scanned for placeholders, so a value containing `{input}` stays literal.
pub fn resolve(kind: StepKind, config: &HashMap<String, String>, input: &str) -> String {
    let mut prompt = preamble(kind, config);
    prompt.push_str(input);
    prompt
}
