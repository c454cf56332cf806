//! GLM chat-completions client struct and builder.

use std::future::Future;

use futures::StreamExt;
use gist_stream::{TokenHandle, TokenStream, TransportError, with_fallback};

use crate::error::{ConfigError, map_http_status, map_reqwest_error};
use crate::mapping::to_api_request;

/// Default model used when none is configured.
const DEFAULT_MODEL: &str = "glm-4.5-flash";

/// Default BigModel API base URL.
const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn";

/// Instruction sent ahead of the article.
pub const DEFAULT_PROMPT: &str = "Extract a summary of the following text. Return only the \
     summary, as plain text, and wrap important words in <code></code>.";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GLM_API_KEY";
/// Environment variable overriding the model.
pub const MODEL_VAR: &str = "GLM_MODEL";
/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "GLM_BASE_URL";

/// Client that streams article summaries from the GLM chat-completions API.
///
/// # Example
///
/// ```no_run
/// use gist_provider_glm::Glm;
///
/// let client = Glm::new("your-api-key")
///     .model("glm-4.5-flash")
///     .base_url("https://open.bigmodel.cn");
/// ```
pub struct Glm {
    /// API key, sent as a bearer token.
    pub(crate) api_key: String,
    /// Model identifier.
    pub(crate) model: String,
    /// API base URL (override for testing or proxies).
    pub(crate) base_url: String,
    /// Summarization instruction.
    pub(crate) prompt: String,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl Glm {
    /// Create a new client with the given API key and sensible defaults.
    ///
    /// Default model: `glm-4.5-flash`.
    /// Default base URL: `https://open.bigmodel.cn`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            prompt: DEFAULT_PROMPT.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from `GLM_API_KEY`, `GLM_MODEL` and `GLM_BASE_URL`.
    ///
    /// Only the API key is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        let mut client = Self::new(api_key);
        if let Some(model) = var(MODEL_VAR) {
            client = client.model(model);
        }
        if let Some(url) = var(BASE_URL_VAR) {
            client = client.base_url(url);
        }
        Ok(client)
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or an API proxy.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the summarization instruction.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Build the chat completions endpoint URL.
    pub(crate) fn completions_url(&self) -> String {
        format!(
            "{}/api/paas/v4/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Send the streaming request and return the undecorated token stream.
    ///
    /// Fails if the request cannot be sent or the status is not a success.
    /// Read errors after that surface through the stream itself.
    pub fn open_stream(
        &self,
        article: &str,
    ) -> impl Future<Output = Result<TokenStream, TransportError>> + Send {
        let url = self.completions_url();
        let api_key = self.api_key.clone();
        let http_client = self.client.clone();
        let body = to_api_request(&self.model, &self.prompt, article);
        let body = serde_json::to_value(&body);

        async move {
            let body = body.map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            tracing::debug!(url = %url, model = %body["model"], "sending streaming summary request");

            let response = http_client
                .post(&url)
                .bearer_auth(&api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let headers = response.headers().clone();
                let body_text = response.text().await.map_err(map_reqwest_error)?;
                return Err(map_http_status(status, &headers, &body_text));
            }

            let bytes = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(map_reqwest_error));
            Ok(TokenStream::new(bytes))
        }
    }

    /// Stream a summary of `article`.
    ///
    /// Never fails: a transport failure shows up as a final
    /// [`Token::Diagnostic`](gist_stream::Token::Diagnostic).
    pub async fn summarize(&self, article: &str) -> TokenHandle {
        with_fallback(self.open_stream(article).await)
    }
}
