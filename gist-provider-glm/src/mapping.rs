//! Request body construction for the chat-completions API.

use serde::Serialize;

/// Chat-completions request body.
#[derive(Debug, Serialize)]
pub(crate) struct SummaryRequest<'a> {
    /// Model identifier (e.g. "glm-4.5-flash").
    pub model: &'a str,
    /// Always `true`: the response is decoded as an event stream.
    pub stream: bool,
    /// Instruction followed by the content to summarize.
    pub messages: [ChatMessage; 2],
}

/// A message in the chat-completions format.
#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Build the streaming request for one article.
///
/// The article is sent as a JSON string literal, quotes and escapes included,
/// so that markup survives verbatim.
pub(crate) fn to_api_request<'a>(model: &'a str, prompt: &str, article: &str) -> SummaryRequest<'a> {
    let quoted = serde_json::Value::from(article).to_string();
    SummaryRequest {
        model,
        stream: true,
        messages: [
            ChatMessage {
                role: "user",
                content: prompt.to_string(),
            },
            ChatMessage {
                role: "user",
                content: quoted,
            },
        ],
    }
}
