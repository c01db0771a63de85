//! Prompt templates for scenario generation.
//!
//! Every prompt is a versioned, testable artifact. The built-in constants
//! below are the defaults; deployments can override them with TOML files
//! loaded through [`PromptEngine::from_directory`].

/// System prompt for a place the players have already shaped.
pub const SCENARIO_SYSTEM: &str = r#"You are the narrator of a quiet travel game about how places feel.
Write in second person, present tense.

RULES:
- The scene is 2 to 4 sentences. No markup, no emoji, no lists.
- Offer between 2 and 4 choices a visitor could make in that moment.
- Each choice carries emotion scores between 0.0 and 1.0 for exactly these
  dimensions: warmth, loneliness, tension, nostalgia, belonging.
- Respond with a single JSON object and nothing else."#;

/// User prompt for a place the players have already shaped.
pub const SCENARIO_USER: &str = r#"Place: {place}{region_clause}
Collective mood so far: {profile_summary}
Dominant feeling: {dominant}
Recorded visits: {visit_count}

Write a scene that fits this place's accumulated mood, then the choices.
Return JSON:
{"scenario": "the scene", "choices": [{"text": "what the visitor does", "emotions": {"warmth": 0.0, "loneliness": 0.0, "tension": 0.0, "nostalgia": 0.0, "belonging": 0.0}}], "tone": "one word"}"#;

/// User prompt for a first visit — no accumulated mood to honor yet.
pub const SCENARIO_FIRST_VISIT_USER: &str = r#"Place: {place}{region_clause}
Nobody has visited this place in the game before. You set its first impression.

Write an arrival scene, then the choices.
Return JSON:
{"scenario": "the scene", "choices": [{"text": "what the visitor does", "emotions": {"warmth": 0.0, "loneliness": 0.0, "tension": 0.0, "nostalgia": 0.0, "belonging": 0.0}}], "tone": "one word"}"#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders are
/// left in place.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

// ---------------------------------------------------------------------------
// PromptEngine — versioned TOML template loader
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::GenError;

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Scenario for a place with an accumulated profile.
    Scenario,
    /// Scenario for a first visit.
    ScenarioFirstVisit,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Scenario => "scenario.toml",
            Self::ScenarioFirstVisit => "scenario_first_visit.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::Scenario, Self::ScenarioFirstVisit]
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scenario => "scenario",
            Self::ScenarioFirstVisit => "scenario_first_visit",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scenario" => Ok(Self::Scenario),
            "scenario_first_visit" => Ok(Self::ScenarioFirstVisit),
            _ => Err(format!("unknown prompt id: '{s}'")),
        }
    }
}

/// Metadata and templates parsed from a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    user: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0").
    pub version: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// System prompt template (contains `{key}` placeholders).
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Engine that loads versioned TOML prompt templates and renders them.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptEngine {
    /// Create a `PromptEngine` pre-loaded with the built-in constant
    /// templates. No files required.
    #[must_use]
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            PromptId::Scenario,
            PromptTemplate {
                version: "builtin".into(),
                max_tokens: 400,
                temperature: 0.8,
                system: SCENARIO_SYSTEM.into(),
                user: SCENARIO_USER.into(),
            },
        );

        templates.insert(
            PromptId::ScenarioFirstVisit,
            PromptTemplate {
                version: "builtin".into(),
                max_tokens: 400,
                temperature: 0.9,
                system: SCENARIO_SYSTEM.into(),
                user: SCENARIO_FIRST_VISIT_USER.into(),
            },
        );

        Self { templates }
    }

    /// Load prompt templates from a directory of TOML files.
    ///
    /// Each TOML file must match a known [`PromptId`] filename. Unknown
    /// files are ignored; missing files fall back to the built-in template.
    ///
    /// # Errors
    ///
    /// Returns an error if no known file exists in the directory, or a
    /// TOML file exists but cannot be parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, GenError> {
        let dir = dir.as_ref();
        let mut engine = Self::builtin();
        let mut loaded = 0usize;

        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    GenError::Config(format!("failed to read {}: {e}", path.display()))
                })?;
                let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                    GenError::Config(format!("failed to parse {}: {e}", path.display()))
                })?;

                let d = parsed.prompt;
                engine.templates.insert(
                    *id,
                    PromptTemplate {
                        version: d.version,
                        max_tokens: d.max_tokens,
                        temperature: d.temperature,
                        system: d.system,
                        user: d.user,
                    },
                );
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(GenError::Config(format!(
                "no prompt templates found in directory: {}",
                dir.display()
            )));
        }

        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render both system and user prompts for a given ID.
    ///
    /// Returns `(system_prompt, user_prompt)` with all `{key}` placeholders
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt ID is not loaded.
    pub fn render(
        &self,
        id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<(String, String), GenError> {
        let tpl = self
            .get(id)
            .ok_or_else(|| GenError::Config(format!("prompt template '{id}' not loaded")))?;

        let system = render_template(&tpl.system, vars);
        let user = render_template(&tpl.user, vars);
        Ok((system, user))
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
