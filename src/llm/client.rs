//! AI client — one call signature over every provider.
//!
//! The provider and its credential come from `Settings` at construction;
//! nothing here reads the environment. A missing key fails before any
//! request is built.

use async_trait::async_trait;

use super::provider::Provider;
use super::{anthropic, gemini, ollama, openai};
use crate::error::AiError;
use crate::settings::Settings;

/// Anything that can turn a prompt into raw completion text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

pub struct AiClient {
    http: reqwest::Client,
    provider: Provider,
    api_key: Option<String>,
    ollama_host: String,
    ollama_model: String,
}

impl AiClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider: settings.provider,
            api_key: settings.api_key(settings.provider).map(|k| k.to_string()),
            ollama_host: settings.ollama_host.clone(),
            ollama_model: settings.ollama_model.clone(),
        }
    }

    fn require_key(&self) -> Result<&str, AiError> {
        match self.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => Ok(k),
            _ => {
                log::warn!("[LLM] No API key for {} — not calling", self.provider);
                Err(AiError::CredentialMissing(self.provider))
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for AiClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        log::info!("[LLM] Provider: {}", self.provider);
        let start = std::time::Instant::now();

        let text = match self.provider {
            Provider::OpenAi => openai::complete(&self.http, self.require_key()?, prompt).await,
            Provider::Gemini => gemini::complete(&self.http, self.require_key()?, prompt).await,
            Provider::Claude => anthropic::complete(&self.http, self.require_key()?, prompt).await,
            Provider::Ollama => {
                ollama::complete(&self.http, &self.ollama_host, &self.ollama_model, prompt).await
            }
        }?;

        log::info!(
            "[LLM] {} responded in {}ms ({} chars)",
            self.provider,
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }
}

/// Send a prepared request and parse the JSON body.
///
/// Non-2xx statuses become `AiError::Http` with the status embedded; an
/// unparseable body is a malformed response.
pub(crate) async fn send_json(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, AiError> {
    let resp = request.send().await.map_err(|e| {
        log::error!("[LLM] {} request failed: {}", provider, e);
        AiError::Request {
            provider,
            reason: e.to_string(),
        }
    })?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| AiError::Request {
        provider,
        reason: format!("Failed to read response: {}", e),
    })?;

    if !status.is_success() {
        log::error!(
            "[LLM] {} returned {}: {}",
            provider,
            status,
            body.chars().take(200).collect::<String>()
        );
        return Err(AiError::Http {
            provider,
            status: status.as_u16(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        log::error!("[LLM] {} body is not JSON: {}", provider, e);
        AiError::MalformedResponse(provider)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: Provider) -> Settings {
        Settings {
            provider,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        for provider in [Provider::OpenAi, Provider::Gemini, Provider::Claude] {
            let client = AiClient::new(&settings(provider));
            let err = client.complete("prompt").await.unwrap_err();
            assert!(
                matches!(err, AiError::CredentialMissing(p) if p == provider),
                "{provider}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let mut s = settings(Provider::Claude);
        s.claude_api_key = Some("   ".to_string());
        let err = AiClient::new(&s).complete("prompt").await.unwrap_err();
        assert!(matches!(err, AiError::CredentialMissing(Provider::Claude)));
    }

    /// Serve one canned HTTP response on a local port; returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            // Drain the request (headers + content-length body) before answering.
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
        });
        format!("http://{}", addr)
    }

    fn local_http() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    async fn ollama_against(status: &'static str, body: &'static str) -> Result<String, AiError> {
        let host = serve_once(status, body).await;
        ollama::complete(&local_http(), &host, "llama3.1", "prompt").await
    }

    #[tokio::test]
    async fn non_success_status_becomes_http_error() {
        let err = ollama_against("503 Service Unavailable", r#"{"error":"loading model"}"#)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AiError::Http { provider: Provider::Ollama, status: 503 }),
            "{err:?}"
        );
        assert_eq!(err.to_string(), "Ollama error: 503");
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let err = ollama_against("200 OK", "not json").await.unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(Provider::Ollama)), "{err:?}");
    }

    #[tokio::test]
    async fn json_without_text_is_malformed() {
        let err = ollama_against("200 OK", r#"{"model":"llama3.1","done":true}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(Provider::Ollama)), "{err:?}");
    }

    #[tokio::test]
    async fn success_returns_completion_text() {
        let text = ollama_against(
            "200 OK",
            r#"{"response":"tell application \"Microsoft Excel\"\nend tell","done":true}"#,
        )
        .await
        .unwrap();
        assert_eq!(text, "tell application \"Microsoft Excel\"\nend tell");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let err = ollama::complete(&local_http(), &host, "llama3.1", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Request { provider: Provider::Ollama, .. }), "{err:?}");
    }

    #[test]
    fn picks_key_of_selected_provider_only() {
        let mut s = settings(Provider::Gemini);
        s.openai_api_key = Some("sk-openai".to_string());
        let client = AiClient::new(&s);
        assert!(client.require_key().is_err());
        assert_eq!(client.provider(), Provider::Gemini);
    }
}
