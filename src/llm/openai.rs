//! OpenAI adapter — Chat Completions API with a bearer token.

use super::client::send_json;
use super::provider::Provider;
use crate::error::AiError;

pub const MODEL: &str = "gpt-4o";
const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub(crate) fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": MODEL,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": 0
    })
}

/// `choices[0].message.content`
pub(crate) fn extract_text(body: &serde_json::Value) -> Option<String> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}

pub async fn complete(
    client: &reqwest::Client,
    api_key: &str,
    prompt: &str,
) -> Result<String, AiError> {
    let request = client
        .post(ENDPOINT)
        .bearer_auth(api_key)
        .header("content-type", "application/json")
        .json(&request_body(prompt));
    let body = send_json(Provider::OpenAi, request).await?;
    extract_text(&body).ok_or(AiError::MalformedResponse(Provider::OpenAi))
}
