use serde::{Deserialize, Serialize};

/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Nucleus-sampling threshold sent with every request.
pub const DEFAULT_TOP_P: f32 = 0.95;

/// Top-k sampling limit sent with every request.
pub const DEFAULT_TOP_K: u32 = 40;

/// Maximum output length in tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Response MIME type requested from the model.
pub const DEFAULT_RESPONSE_MIME_TYPE: &str = "text/plain";

/// Generation parameters attached to a `generateContent` request.
///
/// The chat client always sends the defaults; the fields stay public so the
/// client library can be reused with other settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus-sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Maximum number of output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// MIME type of the generated candidate text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

impl GenerationConfig {
    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the top-k value.
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the maximum output tokens.
    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            top_k: Some(DEFAULT_TOP_K),
            max_output_tokens: Some(DEFAULT_MAX_OUTPUT_TOKENS),
            response_mime_type: Some(DEFAULT_RESPONSE_MIME_TYPE.to_string()),
        }
    }
}
