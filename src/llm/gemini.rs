//! Google Gemini adapter — generateContent, API key in the URL query.

use super::client::send_json;
use super::provider::Provider;
use crate::error::AiError;

pub const MODEL: &str = "gemini-2.0-flash";

fn endpoint(api_key: &str) -> String {
    format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        MODEL, api_key
    )
}

pub(crate) fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": {"temperature": 0}
    })
}

/// `candidates[0].content.parts[0].text`
pub(crate) fn extract_text(body: &serde_json::Value) -> Option<String> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

pub async fn complete(
    client: &reqwest::Client,
    api_key: &str,
    prompt: &str,
) -> Result<String, AiError> {
    let request = client
        .post(endpoint(api_key))
        .header("content-type", "application/json")
        .json(&request_body(prompt));
    let body = send_json(Provider::Gemini, request).await?;
    extract_text(&body).ok_or(AiError::MalformedResponse(Provider::Gemini))
}
