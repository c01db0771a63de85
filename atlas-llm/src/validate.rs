//! Structural gate for generated content.
//!
//! A model response is accepted only when it parses as the documented wire
//! shape AND carries a non-empty scenario with 2–4 non-empty choices.
//! Everything else is a retryable [`GenError`] — validation failures and
//! transport failures are indistinguishable to the retry loop.

use atlas_core::config::ScenarioConfig;
use atlas_core::types::EmotionVector;

use crate::error::GenError;
use crate::sanitize::sanitize;
use crate::types::{RawScenario, ScenarioChoice, ScenarioResult};

/// Positional choice ids, in display order.
pub const CHOICE_IDS: [&str; 4] = ["a", "b", "c", "d"];

/// Tone label used when the model omits one.
const DEFAULT_TONE: &str = "reflective";

/// Max characters for a tone label.
const TONE_MAX: usize = 40;

/// Parse raw model text into the loose wire shape.
///
/// Code fences are stripped first; models wrap JSON in ```` ```json ````
/// blocks often enough that rejecting them would waste attempts.
///
/// # Errors
/// `GenError::ParseError` if the text is not valid JSON of the expected
/// shape.
pub fn parse_raw(text: &str) -> Result<RawScenario, GenError> {
    let stripped = strip_code_fences(text);
    serde_json::from_str(stripped).map_err(|e| {
        GenError::ParseError(format!("{e} — raw text: '{}'", truncate_for_log(text)))
    })
}

/// Run the structural gate and assemble a sanitized, normalized
/// [`ScenarioResult`] marked as generated content.
///
/// # Errors
/// `GenError::InvalidContent` when the scenario text is empty (before or
/// after sanitization), the choice count is outside the configured bounds,
/// or any choice has empty text.
pub fn accept(raw: &RawScenario, bounds: &ScenarioConfig) -> Result<ScenarioResult, GenError> {
    let scenario = sanitize(&raw.scenario, bounds.max_text_length);
    if scenario.is_empty() {
        return Err(GenError::InvalidContent("empty scenario text".into()));
    }

    let count = raw.choices.len();
    if count < bounds.min_choices || count > bounds.max_choices {
        return Err(GenError::InvalidContent(format!(
            "expected {}..={} choices, got {count}",
            bounds.min_choices, bounds.max_choices
        )));
    }

    let mut choices = Vec::with_capacity(count);
    for (choice, id) in raw.choices.iter().zip(CHOICE_IDS) {
        let text = sanitize(&choice.text, bounds.max_text_length);
        if text.is_empty() {
            return Err(GenError::InvalidContent(format!(
                "choice '{id}' has empty text"
            )));
        }
        choices.push(ScenarioChoice {
            id: id.to_string(),
            text,
            emotions: EmotionVector::from_loose(&choice.emotions),
        });
    }

    let tone = match raw.tone.as_deref() {
        Some(t) if !sanitize(t, TONE_MAX).is_empty() => sanitize(t, TONE_MAX),
        _ => DEFAULT_TONE.to_string(),
    };

    Ok(ScenarioResult {
        scenario,
        choices,
        tone,
        generated: true,
    })
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Shorten raw model text for error messages.
fn truncate_for_log(text: &str) -> String {
    text.chars().take(120).collect()
}
