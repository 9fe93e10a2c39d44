use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Content, GenerationConfig};

/// Body of a `models/{model}:generateContent` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation so far; the chat client always sends a single user turn.
    pub contents: Vec<Content>,

    /// Generation parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Creates a single-turn request for `prompt` with the default
    /// generation parameters.
    pub fn from_prompt<S: Into<String>>(prompt: S) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            generation_config: Some(GenerationConfig::default()),
        }
    }

    /// Replaces the generation parameters.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content; absent when the candidate was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped, e.g. `STOP`, `MAX_TOKENS`, `SAFETY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Position of this candidate in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Token accounting reported with a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u32,

    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u32,

    /// Total tokens billed for the call.
    #[serde(default)]
    pub total_token_count: u32,
}

/// Feedback about the prompt itself; set when the prompt was blocked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Body of a successful `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; the chat client reads the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Prompt feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Returns the text of the first candidate, or `None` when there is no
    /// text to show.
    pub fn text(&self) -> Option<String> {
        let text = self.candidates.first()?.content.as_ref()?.joined_text();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Normalizes the response into the answer text.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyResponse` when no candidate carries text, with
    /// the block or finish reason when the API gave one.
    pub fn into_text(self) -> Result<String> {
        if let Some(text) = self.text() {
            return Ok(text);
        }
        let reason = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|candidate| candidate.finish_reason.clone())
            });
        Err(Error::empty_response(
            "the model returned no text",
            reason,
        ))
    }
}
