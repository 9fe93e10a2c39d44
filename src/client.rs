use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_EMPTY_RESPONSES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Anything that can turn a prompt into a text completion.
///
/// The chat store is generic over this trait so that it can be driven by
/// the real [`Gemini`] client or by a scripted completer in tests.
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// Returns the completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty prompt and an upstream error
    /// (see [`Error::is_upstream`]) when the remote call fails or yields no
    /// text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    model: Model,
    generation_config: GenerationConfig,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when no key is available.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, env::var(API_KEY_ENV).ok())?;
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            model: Model::default(),
            generation_config: GenerationConfig::default(),
            logger: None,
        })
    }

    /// Sets the model used for completions.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the generation parameters sent with each completion.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// Attaches a logger that observes every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the model used for completions.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the generation parameters sent with each completion.
    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    fn endpoint(&self, model: &Model) -> Result<Url> {
        let model = model.to_string();
        let path = if model.contains('/') {
            format!("{model}:generateContent")
        } else {
            format!("models/{model}:generateContent")
        };
        Ok(self.base_url.join(&path)?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::configuration("API key contains invalid header characters"))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let status = detail.as_ref().and_then(|d| d.status.clone());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.clone());
        Error::api(status_code, status, message)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send a request for `model` and return the parsed response.
    pub async fn generate(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model)?;
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        tracing::debug!(%url, "sending generateContent request");

        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }
}

#[async_trait::async_trait]
impl Completer for Gemini {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::validation(
                "prompt must be a non-empty string",
                Some("prompt".to_string()),
            ));
        }

        let request = GenerateContentRequest::from_prompt(prompt)
            .with_generation_config(self.generation_config.clone());

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self
            .generate(&self.model, &request)
            .await
            .and_then(|response| {
                if let Some(logger) = &self.logger {
                    logger.log_response(&response);
                }
                response.into_text()
            });
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(text) => {
                tracing::debug!(chars = text.len(), "completion received");
            }
            Err(err) => {
                if matches!(err, Error::EmptyResponse { .. }) {
                    CLIENT_EMPTY_RESPONSES.click();
                }
                CLIENT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
                tracing::warn!(error = %err, "completion failed");
            }
        }
        result
    }
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("model", &self.model)
            .field("generation_config", &self.generation_config)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

/// Picks the explicit key over the environment value.  Blank keys count as
/// missing.
pub fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            Error::configuration(format!(
                "API key not provided and {API_KEY_ENV} environment variable not set"
            ))
        })
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last segment unless the base ends in a slash.
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}
