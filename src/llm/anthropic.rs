//! Anthropic Claude adapter — Messages API, key in `x-api-key` header.

use super::client::send_json;
use super::provider::Provider;
use crate::error::AiError;

pub const MODEL: &str = "claude-sonnet-4-20250514";
pub const MAX_TOKENS: u32 = 2000;
const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub(crate) fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": MODEL,
        "max_tokens": MAX_TOKENS,
        "messages": [{"role": "user", "content": prompt}]
    })
}

/// First `text` block of the `content` array.
pub(crate) fn extract_text(body: &serde_json::Value) -> Option<String> {
    let content = body.get("content")?.as_array()?;
    content
        .iter()
        .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .and_then(|block| block.get("text")?.as_str())
        .map(|s| s.to_string())
}

pub async fn complete(
    client: &reqwest::Client,
    api_key: &str,
    prompt: &str,
) -> Result<String, AiError> {
    let request = client
        .post(ENDPOINT)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .header("content-type", "application/json")
        .json(&request_body(prompt));
    let body = send_json(Provider::Claude, request).await?;
    extract_text(&body).ok_or(AiError::MalformedResponse(Provider::Claude))
}
