//! Internship recommendations.
//!
//! Two flavors share this module:
//! - [`RecommendationCatalog::matches`] is a keyword filter over a fixed list
//!   of openings. A skill matches an opening when the lowercased role
//!   contains the lowercased, trimmed skill. Empty skill tokens are ignored.
//! - [`suggest`] asks the text-generation oracle for free-form suggestions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};

pub const NO_MATCH: &str = "No match found";

const SYSTEM_PROMPT: &str = "You are an internship recommendation assistant.";
const MAX_TOKENS: u32 = 400;

// =============================================================================
// SKILLS INPUT
// =============================================================================

/// Skills as sent by clients: a comma-separated string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    Text(String),
    List(Vec<String>),
}

impl Skills {
    /// Comma-joined form used in prompts.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(", "),
        }
    }

    /// Lowercased, trimmed, non-empty tokens.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.joined()
            .to_lowercase()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.tokens().is_empty()
    }
}

// =============================================================================
// STATIC CATALOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub company: String,
    pub role: String,
}

impl Opening {
    fn new(company: &str, role: &str) -> Self {
        Self { company: company.to_string(), role: role.to_string() }
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.company, self.role)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse catalog {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// Immutable list of openings used by the keyword recommender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationCatalog {
    openings: Vec<Opening>,
}

impl Default for RecommendationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecommendationCatalog {
    #[must_use]
    pub fn new(openings: Vec<Opening>) -> Self {
        Self { openings }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Opening::new("Google", "ML Intern"),
            Opening::new("Microsoft", "Cloud Intern"),
            Opening::new("Amazon", "Web Dev Intern"),
            Opening::new("Facebook", "Data Science Intern"),
            Opening::new("Tesla", "AI Intern"),
        ])
    }

    /// Load a JSON array of `{company, role}` objects.
    ///
    /// # Errors
    ///
    /// [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
        let openings: Vec<Opening> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })?;
        info!(path = %path.display(), openings = openings.len(), "loaded recommendation catalog");
        Ok(Self::new(openings))
    }

    /// Labels of every opening matching any skill, in catalog order, or
    /// `["No match found"]`.
    #[must_use]
    pub fn matches(&self, skills: &Skills) -> Vec<String> {
        let tokens = skills.tokens();
        let found: Vec<String> = self
            .openings
            .iter()
            .filter(|opening| {
                let role = opening.role.to_lowercase();
                tokens.iter().any(|skill| role.contains(skill.as_str()))
            })
            .map(Opening::label)
            .collect();
        if found.is_empty() { vec![NO_MATCH.to_string()] } else { found }
    }
}

// =============================================================================
// LLM SUGGESTIONS
// =============================================================================

#[must_use]
pub fn prompt(student_name: &str, skills: &str) -> String {
    format!("Suggest 3 internships for student {student_name} with skills: {skills}")
}

/// Free-text suggestions from the oracle; `None` if it returned no content.
///
/// # Errors
///
/// Any [`LlmError`] from the chat call.
pub async fn suggest(llm: &dyn LlmChat, student_name: &str, skills: &str) -> Result<Option<String>, LlmError> {
    let messages = [Message::user(prompt(student_name, skills))];
    let response = llm.chat(MAX_TOKENS, SYSTEM_PROMPT, &messages).await?;
    info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        stop_reason = %response.stop_reason,
        "recommendation generated"
    );
    Ok(response.text)
}

#[cfg(test)]
#[path = "recommend_test.rs"]
mod tests;
