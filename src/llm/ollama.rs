//! Ollama adapter — local `/api/generate`, no credential.

use super::client::send_json;
use super::provider::Provider;
use crate::error::AiError;

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

pub(crate) fn request_body(model: &str, prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "prompt": prompt,
        "stream": false,
        "options": {"temperature": 0}
    })
}

pub(crate) fn extract_text(body: &serde_json::Value) -> Option<String> {
    body.get("response")?.as_str().map(|s| s.to_string())
}

pub async fn complete(
    client: &reqwest::Client,
    host: &str,
    model: &str,
    prompt: &str,
) -> Result<String, AiError> {
    let url = format!("{}/api/generate", host.trim_end_matches('/'));
    let request = client
        .post(url)
        .header("content-type", "application/json")
        .json(&request_body(model, prompt));
    let body = send_json(Provider::Ollama, request).await?;
    extract_text(&body).ok_or(AiError::MalformedResponse(Provider::Ollama))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disables_streaming() {
        let body = request_body("llama3.1", "p");
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "llama3.1");
    }

    #[test]
    fn reads_response_field() {
        let body = serde_json::json!({"model": "x", "response": "tell", "done": true});
        assert_eq!(extract_text(&body).as_deref(), Some("tell"));
        assert!(extract_text(&serde_json::json!({"error": "model not found"})).is_none());
    }
}
